// Domain layer: core models and ports. Storage and identity live behind the ports.

pub mod model;
pub mod ports;
