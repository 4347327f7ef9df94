// Domain layer: core models and ports (interfaces). No external dependencies
// beyond std/serde and the async-trait shim.

pub mod model;
pub mod ports;
