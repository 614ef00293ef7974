use serde::{Deserialize, Serialize};

/// Two-field numeric pair passed by value across the C ABI.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate2D {
    pub x: f64,
    pub y: f64,
}

impl Coordinate2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn swapped(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }
}

/// Symbol visibility of a loaded module.
///
/// `Global` makes the module's symbols available to modules loaded later,
/// which is also what allows collisions between modules exporting the same
/// name. Ignored on Windows, where the loader has no such distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum BindScope {
    #[default]
    Global,
    Local,
}

/// When the loader resolves the module's own undefined references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    #[default]
    Now,
    Lazy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadOptions {
    #[serde(default)]
    pub scope: BindScope,
    #[serde(default)]
    pub mode: BindMode,
}

impl LoadOptions {
    pub fn global() -> Self {
        Self {
            scope: BindScope::Global,
            mode: BindMode::Now,
        }
    }

    pub fn local() -> Self {
        Self {
            scope: BindScope::Local,
            mode: BindMode::Now,
        }
    }

    pub fn with_mode(mut self, mode: BindMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Host-specific system call identifier.
///
/// The value is part of the kernel ABI for one OS and architecture; nothing
/// here translates between platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyscallNumber(i64);

impl SyscallNumber {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    pub const GETPID: SyscallNumber = SyscallNumber(libc::SYS_getpid as i64);

    #[cfg(any(target_os = "linux", target_os = "android"))]
    pub const CLOSE: SyscallNumber = SyscallNumber(libc::SYS_close as i64);

    // <sys/syscall.h>
    #[cfg(target_os = "macos")]
    pub const GETPID: SyscallNumber = SyscallNumber(20);

    #[cfg(target_os = "macos")]
    pub const CLOSE: SyscallNumber = SyscallNumber(6);

    pub const fn new(number: i64) -> Self {
        Self(number)
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    /// Process-identifier call for the compilation target, if it has one.
    pub fn process_id() -> Option<SyscallNumber> {
        #[cfg(any(target_os = "linux", target_os = "android", target_os = "macos"))]
        {
            Some(Self::GETPID)
        }
        #[cfg(not(any(target_os = "linux", target_os = "android", target_os = "macos")))]
        {
            None
        }
    }
}

impl std::fmt::Display for SyscallNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const MAX_SYSCALL_ARGS: usize = 6;

/// Up to six register-sized arguments for one system call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyscallArgs {
    values: [i64; MAX_SYSCALL_ARGS],
    len: usize,
}

impl SyscallArgs {
    pub const fn none() -> Self {
        Self {
            values: [0; MAX_SYSCALL_ARGS],
            len: 0,
        }
    }

    pub fn new<const N: usize>(args: [i64; N]) -> Self {
        const { assert!(N <= MAX_SYSCALL_ARGS, "system calls take at most six arguments") };
        let mut values = [0; MAX_SYSCALL_ARGS];
        values[..N].copy_from_slice(&args);
        Self { values, len: N }
    }

    /// Runtime counterpart of [`SyscallArgs::new`]; `None` above six arguments.
    pub fn from_slice(args: &[i64]) -> Option<Self> {
        if args.len() > MAX_SYSCALL_ARGS {
            return None;
        }
        let mut values = [0; MAX_SYSCALL_ARGS];
        values[..args.len()].copy_from_slice(args);
        Some(Self {
            values,
            len: args.len(),
        })
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.values[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All six slots; unused ones are zero.
    pub(crate) fn padded(&self) -> [i64; MAX_SYSCALL_ARGS] {
        self.values
    }
}
