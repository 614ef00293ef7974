pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use core::{
    binder::{BoundSymbol, DynamicSymbolBinder, ModuleHandle},
    harness::{Harness, HarnessReport},
    syscall::DirectSystemCallInvoker,
};
pub use domain::model::{BindMode, BindScope, Coordinate2D, LoadOptions, SyscallArgs, SyscallNumber};
pub use utils::error::{BridgeError, LoadError, ResolveError, Result, SyscallError};
