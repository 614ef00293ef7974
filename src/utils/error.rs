use thiserror::Error;

/// A module could not be opened by the platform loader.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to load module '{path}': {reason}")]
pub struct LoadError {
    pub path: String,
    pub reason: String,
}

/// A symbol name was absent from an otherwise loaded module.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("symbol '{symbol_name}' could not be resolved: {reason}")]
pub struct ResolveError {
    pub symbol_name: String,
    pub reason: String,
}

/// A system call reported failure through the `-1` / `errno` convention.
///
/// `number` is `None` when the call has no number on this target at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} failed with errno {code}: {message}", call_label(.number))]
pub struct SyscallError {
    pub number: Option<i64>,
    pub code: i32,
    pub message: String,
}

impl SyscallError {
    pub fn from_errno(number: i64, code: i32) -> Self {
        Self {
            number: Some(number),
            code,
            message: describe_errno(code),
        }
    }

    /// `name` has no syscall number on this target.
    pub fn unavailable(name: &str) -> Self {
        Self {
            number: None,
            code: libc::ENOSYS,
            message: format!("{} has no system call number on this target", name),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        self.code == libc::ENOSYS
    }
}

fn call_label(number: &Option<i64>) -> String {
    match number {
        Some(number) => format!("syscall {}", number),
        None => "syscall".to_string(),
    }
}

#[cfg(unix)]
fn describe_errno(code: i32) -> String {
    nix::errno::Errno::from_i32(code).desc().to_string()
}

#[cfg(not(unix))]
fn describe_errno(code: i32) -> String {
    std::io::Error::from_raw_os_error(code).to_string()
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Syscall(#[from] SyscallError),

    #[error("{function} failed: {source}")]
    NativeCall {
        function: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Loading,
    Binding,
    SystemCall,
    Configuration,
    Io,
}

impl BridgeError {
    /// Wraps the calling thread's last OS error for a named libc function.
    pub fn native_call(function: &'static str) -> Self {
        BridgeError::NativeCall {
            function,
            source: std::io::Error::last_os_error(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            BridgeError::Load(_) => ErrorCategory::Loading,
            BridgeError::Resolve(_) => ErrorCategory::Binding,
            BridgeError::Syscall(_) | BridgeError::NativeCall { .. } => ErrorCategory::SystemCall,
            BridgeError::ConfigValidationError { .. }
            | BridgeError::InvalidConfigValueError { .. }
            | BridgeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            BridgeError::IoError(_) | BridgeError::SerializationError(_) => ErrorCategory::Io,
        }
    }

    /// Process exit status used by the binaries.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Loading | ErrorCategory::Binding | ErrorCategory::Io => 1,
            ErrorCategory::Configuration => 2,
            ErrorCategory::SystemCall => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            BridgeError::Load(_) => {
                "Check that the module path exists and was built for this platform and architecture"
                    .to_string()
            }
            BridgeError::Resolve(err) => format!(
                "Check that '{}' is exported unmangled (e.g. `nm -D` on the module)",
                err.symbol_name
            ),
            BridgeError::Syscall(err) if err.number.is_none() => {
                "This target has no direct system call entry point".to_string()
            }
            BridgeError::Syscall(err) if err.is_unsupported() => {
                "The kernel does not implement this call; memfd_secret needs the 'secretmem.enable=1' boot option"
                    .to_string()
            }
            BridgeError::Syscall(_) => {
                "Check the syscall number against the host's unistd header".to_string()
            }
            BridgeError::NativeCall { .. } => {
                "Check process resource limits (e.g. `ulimit -l`)".to_string()
            }
            BridgeError::MissingConfigError { field } => {
                format!("Provide '{}' in the config file or on the command line", field)
            }
            BridgeError::ConfigValidationError { .. }
            | BridgeError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again".to_string()
            }
            BridgeError::IoError(_) | BridgeError::SerializationError(_) => {
                "Check file permissions and available disk space".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Loading => format!("Could not load native module: {}", self),
            ErrorCategory::Binding => format!("Could not bind native symbol: {}", self),
            ErrorCategory::SystemCall => format!("System call failed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Io => format!("I/O failure: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
