//! Memory hidden from the kernel's direct map via `memfd_secret(2)`.
//!
//! glibc has no wrapper for this call, so the descriptor is obtained through
//! [`DirectSystemCallInvoker`].

use crate::core::syscall::DirectSystemCallInvoker;
use crate::domain::model::{SyscallArgs, SyscallNumber};
use crate::utils::error::{BridgeError, Result};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::ptr::NonNull;

/// `SYS_memfd_secret`. Numbers from 424 up are the same on every Linux architecture.
pub const MEMFD_SECRET: SyscallNumber = SyscallNumber::new(447);

#[derive(Debug)]
pub struct SecretRegion {
    ptr: NonNull<u8>,
    len: usize,
    fd: OwnedFd,
}

impl SecretRegion {
    /// Creates, sizes and maps a secret memory file of `len` bytes.
    pub fn create(invoker: &DirectSystemCallInvoker, len: usize) -> Result<Self> {
        // SAFETY: MEMFD_SECRET is memfd_secret on every Linux target.
        unsafe { Self::create_with_number(invoker, MEMFD_SECRET, len) }
    }

    /// Like [`SecretRegion::create`], for hosts where memfd_secret lives under
    /// another number.
    ///
    /// # Safety
    ///
    /// `number` must be memfd_secret on the running kernel. Any other call may
    /// act on descriptors or memory Rust already owns, and its result is taken
    /// over as a freshly opened descriptor.
    pub unsafe fn create_with_number(
        invoker: &DirectSystemCallInvoker,
        number: SyscallNumber,
        len: usize,
    ) -> Result<Self> {
        if len == 0 {
            return Err(BridgeError::InvalidConfigValueError {
                field: "len".to_string(),
                value: len.to_string(),
                reason: "secret region must not be empty".to_string(),
            });
        }

        let raw_fd = unsafe { invoker.call(number, SyscallArgs::new([0])) }?;
        let raw_fd = libc::c_int::try_from(raw_fd).map_err(|_| BridgeError::InvalidConfigValueError {
            field: "fd".to_string(),
            value: raw_fd.to_string(),
            reason: format!("syscall {} did not return a file descriptor", number),
        })?;
        // an fd the call did not open (e.g. one it just closed) must not be adopted
        if raw_fd < 0 || unsafe { libc::fcntl(raw_fd, libc::F_GETFD) } == -1 {
            return Err(BridgeError::native_call("fcntl"));
        }
        // SAFETY: per the contract above the kernel just opened this descriptor for us.
        let fd = unsafe { OwnedFd::from_raw_fd(raw_fd) };
        tracing::debug!("Secret memory fd: {}", fd.as_raw_fd());

        if unsafe { libc::ftruncate(fd.as_raw_fd(), len as libc::off_t) } == -1 {
            return Err(BridgeError::native_call("ftruncate"));
        }

        let addr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd.as_raw_fd(),
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(BridgeError::native_call("mmap"));
        }
        let ptr = NonNull::new(addr.cast::<u8>()).ok_or_else(|| BridgeError::native_call("mmap"))?;

        tracing::debug!("Mapped {} secret bytes at {:p}", len, ptr);
        Ok(Self { ptr, len, fd })
    }

    /// Always nonzero; empty regions are rejected at creation.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: the mapping is `len` bytes, readable, and lives as long as `self`.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` makes the access exclusive.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Copies `data` to the start of the region.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.len {
            return Err(BridgeError::InvalidConfigValueError {
                field: "data".to_string(),
                value: data.len().to_string(),
                reason: format!("region holds only {} bytes", self.len),
            });
        }
        self.as_bytes_mut()[..data.len()].copy_from_slice(data);
        Ok(())
    }
}

impl Drop for SecretRegion {
    fn drop(&mut self) {
        if unsafe { libc::munmap(self.ptr.as_ptr().cast(), self.len) } == -1 {
            tracing::warn!(
                "munmap of secret region failed: {}",
                std::io::Error::last_os_error()
            );
        }
        tracing::debug!("Released secret memory fd {}", self.fd.as_raw_fd());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_region_is_rejected() {
        let err = SecretRegion::create(&DirectSystemCallInvoker::new(), 0).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_unimplemented_number_adopts_no_descriptor() {
        let err = unsafe { SecretRegion::create_with_number(&DirectSystemCallInvoker::new(), SyscallNumber::new(100_000), 8) }
            .unwrap_err();
        match err {
            BridgeError::Syscall(err) => assert!(err.is_unsupported()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_descriptor_result_is_not_adopted() {
        let pid = std::process::id() as libc::c_int;
        if unsafe { libc::fcntl(pid, libc::F_GETFD) } != -1 {
            // the pid happens to be an open fd number here
            return;
        }
        let getpid = SyscallNumber::new(libc::SYS_getpid);
        let err = unsafe { SecretRegion::create_with_number(&DirectSystemCallInvoker::new(), getpid, 8) }.unwrap_err();
        assert!(matches!(err, BridgeError::NativeCall { function: "fcntl", .. }));
    }

    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    #[test]
    fn test_round_trip_when_kernel_allows() {
        // secretmem is off by default on many kernels and restricted in containers
        match SecretRegion::create(&DirectSystemCallInvoker::new(), 16) {
            Ok(mut region) => {
                region.write(b"p@ss123").unwrap();
                assert_eq!(&region.as_bytes()[..7], b"p@ss123");
                assert!(region.write(&[0; 17]).is_err());
            }
            Err(BridgeError::Syscall(err)) => assert_ne!(err.code, 0),
            Err(BridgeError::NativeCall { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
