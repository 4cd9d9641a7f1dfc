// Domain layer: recipe types and the ports the core consumes.

pub mod model;
pub mod ports;
