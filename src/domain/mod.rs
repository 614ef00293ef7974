// Domain layer: value types crossing the native boundary and the traits the
// core is written against.

pub mod model;
pub mod ports;
