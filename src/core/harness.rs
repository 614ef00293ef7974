use crate::core::binder::DynamicSymbolBinder;
use crate::core::syscall::DirectSystemCallInvoker;
use crate::domain::model::{BindMode, BindScope, Coordinate2D, SyscallArgs, SyscallNumber};
use crate::domain::ports::{CoordinateTransform, HarnessSettings};
use crate::utils::error::{BridgeError, Result};
use crate::utils::monitor::ProcessIdentity;
use crate::utils::validation::validate_required_field;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingReport {
    pub module: String,
    pub symbol: String,
    pub scope: BindScope,
    pub mode: BindMode,
    pub input: Coordinate2D,
    pub output: Coordinate2D,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyscallReport {
    pub number: SyscallNumber,
    pub args: Vec<i64>,
    pub result: i64,
    /// Only filled in for the process-identifier call.
    pub process: Option<ProcessIdentity>,
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HarnessReport {
    pub binding: Option<BindingReport>,
    pub syscall: Option<SyscallReport>,
}

impl HarnessReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl std::fmt::Display for HarnessReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(binding) = &self.binding {
            writeln!(
                f,
                "{}({}, {}) from {} = ({}, {})",
                binding.symbol,
                binding.input.x,
                binding.input.y,
                binding.module,
                binding.output.x,
                binding.output.y
            )?;
        }
        if let Some(syscall) = &self.syscall {
            write!(f, "syscall {}{:?} = {}", syscall.number, syscall.args, syscall.result)?;
            match syscall.verified {
                Some(true) => write!(f, " (matches process id)")?,
                Some(false) => write!(f, " (DOES NOT match process id)")?,
                None => {}
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub struct Harness<S: HarnessSettings> {
    settings: S,
    binder: DynamicSymbolBinder,
    invoker: DirectSystemCallInvoker,
}

impl<S: HarnessSettings> Harness<S> {
    pub fn new(settings: S) -> Self {
        let binder = DynamicSymbolBinder::new(settings.load_options());
        Self {
            settings,
            binder,
            invoker: DirectSystemCallInvoker::new(),
        }
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    /// Loads the configured module and pushes the configured input through
    /// its coordinate transform.
    ///
    /// # Safety
    ///
    /// The configured symbol must be a C function taking and returning a
    /// `Coordinate2D` by value; see [`crate::core::binder::ModuleHandle::resolve`].
    pub unsafe fn run_binding(&self) -> Result<BindingReport> {
        let configured = self.settings.module_path();
        let path = validate_required_field("module.path", &configured)?;
        let module = self.binder.load(path)?;

        let symbol = self.settings.symbol();
        // SAFETY: the signature is the caller's obligation.
        let transform = unsafe { module.resolve::<CoordinateTransform>(symbol)? };

        let input = self.settings.input();
        let output = transform.invoke((input,));
        tracing::info!("✅ {}({:?}) = {:?}", symbol, input, output);

        let options = self.binder.options();
        Ok(BindingReport {
            module: module.origin().to_string(),
            symbol: symbol.to_string(),
            scope: options.scope,
            mode: options.mode,
            input,
            output,
        })
    }

    /// Issues the configured system call, the process-identifier call when
    /// none is configured.
    ///
    /// # Safety
    ///
    /// Configured arguments are handed to the kernel verbatim; see
    /// [`DirectSystemCallInvoker::call`].
    pub unsafe fn run_syscall(&self) -> Result<SyscallReport> {
        let number = self
            .settings
            .syscall_number()
            .or_else(SyscallNumber::process_id)
            .ok_or_else(|| BridgeError::MissingConfigError {
                field: "syscall.number".to_string(),
            })?;

        let raw_args = self.settings.syscall_args();
        let args = SyscallArgs::from_slice(raw_args).ok_or_else(|| {
            BridgeError::InvalidConfigValueError {
                field: "syscall.args".to_string(),
                value: format!("{:?}", raw_args),
                reason: "at most six arguments".to_string(),
            }
        })?;

        let result = unsafe { self.invoker.call(number, args)? };

        let (process, verified) = if Some(number) == SyscallNumber::process_id() {
            let identity = ProcessIdentity::current();
            let verified = identity.as_ref().map(|id| id.matches(result));
            if verified == Some(false) {
                tracing::warn!("⚠️ Syscall pid {} disagrees with the process table", result);
            }
            (identity, verified)
        } else {
            (None, None)
        };

        Ok(SyscallReport {
            number,
            args: args.as_slice().to_vec(),
            result,
            process,
            verified,
        })
    }
}
