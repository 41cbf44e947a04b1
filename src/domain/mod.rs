// Domain layer: plain data types and ports. Nothing here takes a lock or does I/O.

pub mod model;
pub mod ports;
