// Domain layer: provider resource models and the ports the cleaner drives.

pub mod model;
pub mod ports;
