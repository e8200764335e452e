// Domain layer: feed records, the watch set and the ports the core depends on.

pub mod model;
pub mod ports;
