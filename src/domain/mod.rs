// Domain layer: the report contract plus the pipeline's models and ports.

pub mod model;
pub mod ports;
pub mod report;
