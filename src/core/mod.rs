pub mod binder;
pub mod harness;
#[cfg(target_os = "linux")]
pub mod secretmem;
pub mod syscall;
pub mod upcall;

pub use crate::domain::model::{
    BindMode, BindScope, Coordinate2D, LoadOptions, SyscallArgs, SyscallNumber,
};
pub use crate::domain::ports::{CoordinateTransform, HarnessSettings, NativeSignature, NativeValue};
pub use crate::utils::error::Result;
