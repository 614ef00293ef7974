//! Issuing system calls by number through the C library's generic `syscall`
//! entry point, bypassing the per-call wrappers.

use crate::domain::model::{SyscallArgs, SyscallNumber};
use crate::utils::error::SyscallError;

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectSystemCallInvoker;

impl DirectSystemCallInvoker {
    pub fn new() -> Self {
        Self
    }

    /// Issues exactly one system call and returns the kernel's raw result.
    ///
    /// A result of `-1` with `errno` set is reported as [`SyscallError`]; any
    /// other value is returned unmodified. There is no retry on `EINTR`.
    ///
    /// # Safety
    ///
    /// The kernel interprets `args` according to `number`. Arguments that it
    /// treats as addresses must be valid for the access the call performs, and
    /// the call must not invalidate memory or descriptors Rust code still owns.
    pub unsafe fn call(&self, number: SyscallNumber, args: SyscallArgs) -> Result<i64, SyscallError> {
        tracing::debug!("Issuing syscall {} with args {:?}", number, args.as_slice());

        let result = unsafe { platform::raw_syscall(number, args) };
        match result {
            Ok(value) => {
                tracing::debug!("Syscall {} returned {}", number, value);
                Ok(value)
            }
            Err(code) => {
                let err = SyscallError::from_errno(number.get(), code);
                if err.is_unsupported() {
                    tracing::warn!("⚠️ Syscall {} is not implemented by this kernel", number);
                }
                Err(err)
            }
        }
    }

    /// Process identifier, straight from the kernel.
    pub fn getpid(&self) -> Result<i64, SyscallError> {
        let number = SyscallNumber::process_id()
            .ok_or_else(|| SyscallError::unavailable("getpid"))?;
        // SAFETY: getpid takes no arguments and touches no memory.
        unsafe { self.call(number, SyscallArgs::none()) }
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
mod platform {
    use super::*;
    use libc::c_long;
    use nix::errno::Errno;

    pub(super) unsafe fn raw_syscall(number: SyscallNumber, args: SyscallArgs) -> Result<i64, i32> {
        let [a0, a1, a2, a3, a4, a5] = args.padded();
        Errno::clear();
        let result = unsafe {
            libc::syscall(
                number.get() as c_long,
                a0 as c_long,
                a1 as c_long,
                a2 as c_long,
                a3 as c_long,
                a4 as c_long,
                a5 as c_long,
            )
        } as i64;
        sentinel_check(result)
    }

    fn sentinel_check(result: i64) -> Result<i64, i32> {
        // getpriority and friends can legitimately return -1
        match (result, Errno::last() as i32) {
            (-1, code) if code != 0 => Err(code),
            (value, _) => Ok(value),
        }
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use super::*;
    use libc::c_int;
    use nix::errno::Errno;

    extern "C" {
        fn syscall(number: c_int, ...) -> c_int;
    }

    pub(super) unsafe fn raw_syscall(number: SyscallNumber, args: SyscallArgs) -> Result<i64, i32> {
        let [a0, a1, a2, a3, a4, a5] = args.padded();
        Errno::clear();
        let result = unsafe { syscall(number.get() as c_int, a0, a1, a2, a3, a4, a5) } as i64;
        match (result, Errno::last() as i32) {
            (-1, code) if code != 0 => Err(code),
            (value, _) => Ok(value),
        }
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "macos")))]
mod platform {
    use super::*;

    pub(super) unsafe fn raw_syscall(_number: SyscallNumber, _args: SyscallArgs) -> Result<i64, i32> {
        Err(libc::ENOSYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(any(target_os = "linux", target_os = "android", target_os = "macos"))]
    #[test]
    fn test_getpid_matches_std() {
        let invoker = DirectSystemCallInvoker::new();
        assert_eq!(invoker.getpid().unwrap(), std::process::id() as i64);
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    #[test]
    fn test_bad_descriptor_reports_errno() {
        let invoker = DirectSystemCallInvoker::new();
        let err = unsafe { invoker.call(SyscallNumber::CLOSE, SyscallArgs::new([-1])) }.unwrap_err();
        assert_eq!(err.code, libc::EBADF);
        assert_eq!(err.number, Some(SyscallNumber::CLOSE.get()));
        assert!(!err.message.is_empty());
    }
}
