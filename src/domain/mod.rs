// Domain layer: run outcome models and ports. No HTTP or filesystem code here.

pub mod model;
pub mod ports;
