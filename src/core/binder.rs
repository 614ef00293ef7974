//! Loading dynamic modules and binding their exports to typed function pointers.
//!
//! The only unchecked step is [`ModuleHandle::resolve`]: the loader hands back
//! an untyped address and the caller states what function lives there. Nothing
//! at runtime can confirm that statement. A wrong signature is undefined
//! behaviour, not an error this module can report.

use crate::domain::model::{BindMode, BindScope, LoadOptions};
use crate::domain::ports::NativeSignature;
use crate::utils::error::{LoadError, ResolveError};
use libloading::{Library, Symbol};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct DynamicSymbolBinder {
    options: LoadOptions,
}

impl DynamicSymbolBinder {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> LoadOptions {
        self.options
    }

    /// Opens the module at `path`.
    ///
    /// On success the module's initialisers have run and its exports are
    /// visible according to the configured [`BindScope`].
    pub fn load(&self, path: impl AsRef<Path>) -> Result<ModuleHandle, LoadError> {
        let path = path.as_ref();
        let origin = path.display().to_string();

        if origin.is_empty() {
            return Err(LoadError {
                path: origin,
                reason: "module path is empty".to_string(),
            });
        }

        tracing::debug!(
            "Loading module {} (scope: {:?}, mode: {:?})",
            origin,
            self.options.scope,
            self.options.mode
        );

        // SAFETY: running a module's initialisers is the point of loading it;
        // the caller chose the path.
        let library = unsafe { open_library(path, self.options) }.map_err(|e| {
            tracing::debug!("Loader rejected {}: {}", origin, e);
            LoadError {
                path: origin.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(ModuleHandle { library, origin })
    }

    /// Handle over the symbols already linked into the running process.
    pub fn this_process(&self) -> Result<ModuleHandle, LoadError> {
        let library = this_library().map_err(|e| LoadError {
            path: PROCESS_ORIGIN.to_string(),
            reason: e.to_string(),
        })?;
        Ok(ModuleHandle {
            library,
            origin: PROCESS_ORIGIN.to_string(),
        })
    }
}

const PROCESS_ORIGIN: &str = "<process>";

#[cfg(unix)]
unsafe fn open_library(path: &Path, options: LoadOptions) -> Result<Library, libloading::Error> {
    use libloading::os::unix::{Library as UnixLibrary, RTLD_GLOBAL, RTLD_LAZY, RTLD_LOCAL, RTLD_NOW};

    let scope = match options.scope {
        BindScope::Global => RTLD_GLOBAL,
        BindScope::Local => RTLD_LOCAL,
    };
    let mode = match options.mode {
        BindMode::Now => RTLD_NOW,
        BindMode::Lazy => RTLD_LAZY,
    };

    unsafe { UnixLibrary::open(Some(path), scope | mode) }.map(Library::from)
}

#[cfg(windows)]
unsafe fn open_library(path: &Path, options: LoadOptions) -> Result<Library, libloading::Error> {
    if options.scope == BindScope::Local || options.mode == BindMode::Lazy {
        tracing::debug!("Scope and mode flags have no effect on Windows");
    }
    unsafe { Library::new(path) }
}

#[cfg(unix)]
fn this_library() -> Result<Library, libloading::Error> {
    Ok(libloading::os::unix::Library::this().into())
}

#[cfg(windows)]
fn this_library() -> Result<Library, libloading::Error> {
    libloading::os::windows::Library::this().map(Library::from)
}

/// A loaded module. Dropping it releases the platform handle.
pub struct ModuleHandle {
    library: Library,
    origin: String,
}

impl ModuleHandle {
    /// Path the module was loaded from, or `<process>`.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Looks up `symbol_name` and reinterprets it as a function of type `F`.
    ///
    /// # Safety
    ///
    /// `F` must be exactly the symbol's real signature: calling convention,
    /// argument count, argument layouts and return type. For signatures used
    /// through [`BoundSymbol::invoke`] the function must also be sound to call
    /// with any values of its parameter types. None of this can be checked;
    /// a mismatch is undefined behaviour at the first call.
    pub unsafe fn resolve<F: Copy>(&self, symbol_name: &str) -> Result<BoundSymbol<'_, F>, ResolveError> {
        if symbol_name.is_empty() || symbol_name.contains('\0') {
            return Err(ResolveError {
                symbol_name: symbol_name.to_string(),
                reason: "symbol names must be non-empty and free of NUL bytes".to_string(),
            });
        }

        let symbol = unsafe { self.library.get::<F>(symbol_name.as_bytes()) }.map_err(|e| {
            ResolveError {
                symbol_name: symbol_name.to_string(),
                reason: e.to_string(),
            }
        })?;

        tracing::debug!("Bound {} from {}", symbol_name, self.origin);

        Ok(BoundSymbol {
            symbol,
            name: symbol_name.to_string(),
        })
    }

    /// Keeps the module loaded until the process exits.
    pub fn leak(self) -> &'static ModuleHandle {
        Box::leak(Box::new(self))
    }
}

impl std::fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleHandle")
            .field("origin", &self.origin)
            .finish()
    }
}

/// A typed export borrowed from a [`ModuleHandle`].
pub struct BoundSymbol<'m, F> {
    symbol: Symbol<'m, F>,
    name: String,
}

impl<F: Copy> BoundSymbol<'_, F> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Copy of the raw function pointer, for signatures outside
    /// [`NativeSignature`] such as pointer or callback parameters.
    pub fn as_raw(&self) -> F {
        *self.symbol
    }
}

impl<F: NativeSignature> BoundSymbol<'_, F> {
    /// Calls the native function with by-value arguments.
    ///
    /// Faults inside the callee are not caught.
    pub fn invoke(&self, args: F::Args) -> F::Output {
        // SAFETY: `resolve` made the caller vouch that `F` is the symbol's
        // real signature and that any argument values are acceptable.
        unsafe { self.as_raw().call_with(args) }
    }
}

impl<F> std::fmt::Debug for BoundSymbol<'_, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundSymbol")
            .field("name", &self.name)
            .field("signature", &std::any::type_name::<F>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_is_a_load_error() {
        let err = DynamicSymbolBinder::default().load("").unwrap_err();
        assert_eq!(err.reason, "module path is empty");
    }

    #[test]
    fn test_missing_file_is_a_load_error() {
        let binder = DynamicSymbolBinder::new(LoadOptions::local());
        let err = binder
            .load("/definitely/not/here/libnothing.so")
            .unwrap_err();
        assert_eq!(err.path, "/definitely/not/here/libnothing.so");
        assert!(!err.reason.is_empty());
    }

    #[test]
    fn test_process_handle_rejects_bad_names() {
        let module = DynamicSymbolBinder::default().this_process().unwrap();
        assert_eq!(module.origin(), "<process>");

        let empty = unsafe { module.resolve::<extern "C" fn()>("") }.unwrap_err();
        assert!(empty.reason.contains("non-empty"));

        let nul = unsafe { module.resolve::<extern "C" fn()>("get\0pid") }.unwrap_err();
        assert_eq!(nul.symbol_name, "get\0pid");
    }

    #[cfg(unix)]
    #[test]
    fn test_process_handle_binds_libc() {
        let module = DynamicSymbolBinder::default().this_process().unwrap();
        let getpid = unsafe { module.resolve::<unsafe extern "C" fn() -> i32>("getpid") }.unwrap();
        assert_eq!(getpid.name(), "getpid");
        assert_eq!(getpid.invoke(()) as u32, std::process::id());

        let missing =
            unsafe { module.resolve::<unsafe extern "C" fn()>("native_bridge_no_such_export") };
        assert!(missing.is_err());
    }
}
