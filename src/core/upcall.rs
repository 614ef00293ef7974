//! Native code calling back into Rust: libc's `qsort` driven by a Rust
//! comparator.

use crate::core::binder::ModuleHandle;
use crate::utils::error::Result;
use std::cmp::Ordering;
use std::ffi::{c_int, c_void};

pub type Comparator = unsafe extern "C" fn(*const c_void, *const c_void) -> c_int;

type Qsort = unsafe extern "C" fn(*mut c_void, usize, usize, Option<Comparator>);

unsafe extern "C" fn compare_i32(a: *const c_void, b: *const c_void) -> c_int {
    // SAFETY: qsort only passes pointers to elements of the array we gave it.
    let (a, b) = unsafe { (*a.cast::<i32>(), *b.cast::<i32>()) };
    match a.cmp(&b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// Sorts `values` in place with the `qsort` exported by `module`.
pub fn sort_with_native_qsort(module: &ModuleHandle, values: &mut [i32]) -> Result<()> {
    // SAFETY: this is the C standard library's qsort prototype.
    let qsort = unsafe { module.resolve::<Qsort>("qsort") }?;

    tracing::debug!("Sorting {} values through {}", values.len(), module.origin());

    // SAFETY: the pointer and length describe `values`, the element size
    // matches i32 and the comparator only reads elements.
    unsafe {
        (qsort.as_raw())(
            values.as_mut_ptr().cast(),
            values.len(),
            std::mem::size_of::<i32>(),
            Some(compare_i32),
        );
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::binder::DynamicSymbolBinder;

    #[test]
    fn test_qsort_matches_std_sort() {
        let module = DynamicSymbolBinder::default().this_process().unwrap();
        let mut values = vec![42, -7, 0, 1_000_000, 3, 3, -7, i32::MAX, i32::MIN];
        let mut expected = values.clone();
        expected.sort();

        sort_with_native_qsort(&module, &mut values).unwrap();
        assert_eq!(values, expected);
    }

    #[test]
    fn test_empty_slice() {
        let module = DynamicSymbolBinder::default().this_process().unwrap();
        let mut values: Vec<i32> = Vec::new();
        sort_with_native_qsort(&module, &mut values).unwrap();
        assert!(values.is_empty());
    }
}
