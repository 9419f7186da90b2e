// Domain layer: transient request models and the ports the webhook flow talks through.

pub mod model;
pub mod ports;
