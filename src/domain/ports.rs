use crate::domain::model::{Coordinate2D, LoadOptions, SyscallNumber};

/// Types that cross the C ABI by value with an identical layout on both sides.
///
/// # Safety
///
/// Implementors must be `#[repr(C)]` (or a primitive) and valid for every bit
/// pattern a native callee may hand back.
pub unsafe trait NativeValue: Copy {}

macro_rules! native_values {
    ($($ty:ty),* $(,)?) => {
        $(unsafe impl NativeValue for $ty {})*
    };
}

native_values!(i8, u8, i16, u16, i32, u32, i64, u64, isize, usize, f32, f64, Coordinate2D);

/// Return types a bound symbol may produce: any [`NativeValue`] or nothing.
pub trait NativeReturn {}

impl<T: NativeValue> NativeReturn for T {}
impl NativeReturn for () {}

mod sealed {
    pub trait Sealed {}
}

/// A C function pointer type the binder knows how to call.
///
/// Implemented for `extern "C" fn` and `unsafe extern "C" fn` pointers of up to
/// six [`NativeValue`] arguments. The argument list is taken as a tuple so a
/// bound symbol can be invoked generically.
pub trait NativeSignature: Copy + sealed::Sealed {
    type Args;
    type Output;

    /// # Safety
    ///
    /// `self` must point at a function whose real ABI is exactly `Self`.
    unsafe fn call_with(self, args: Self::Args) -> Self::Output;
}

macro_rules! native_signature {
    ($($arg:ident),*) => {
        impl<R: NativeReturn, $($arg: NativeValue),*> sealed::Sealed for unsafe extern "C" fn($($arg),*) -> R {}
        impl<R: NativeReturn, $($arg: NativeValue),*> sealed::Sealed for extern "C" fn($($arg),*) -> R {}

        impl<R: NativeReturn, $($arg: NativeValue),*> NativeSignature for unsafe extern "C" fn($($arg),*) -> R {
            type Args = ($($arg,)*);
            type Output = R;

            #[allow(non_snake_case)]
            unsafe fn call_with(self, args: Self::Args) -> R {
                let ($($arg,)*) = args;
                unsafe { (self)($($arg),*) }
            }
        }

        impl<R: NativeReturn, $($arg: NativeValue),*> NativeSignature for extern "C" fn($($arg),*) -> R {
            type Args = ($($arg,)*);
            type Output = R;

            #[allow(non_snake_case)]
            unsafe fn call_with(self, args: Self::Args) -> R {
                let ($($arg,)*) = args;
                (self)($($arg),*)
            }
        }
    };
}

native_signature!();
native_signature!(A);
native_signature!(A, B);
native_signature!(A, B, C);
native_signature!(A, B, C, D);
native_signature!(A, B, C, D, E);
native_signature!(A, B, C, D, E, G);

/// Signature of the coordinate transforms the harness binds.
pub type CoordinateTransform = unsafe extern "C" fn(Coordinate2D) -> Coordinate2D;

/// Everything the harness runner needs to know, wherever it came from.
pub trait HarnessSettings {
    fn module_path(&self) -> Option<&str>;
    fn load_options(&self) -> LoadOptions;
    fn symbol(&self) -> &str;
    fn input(&self) -> Coordinate2D;
    fn syscall_number(&self) -> Option<SyscallNumber>;
    fn syscall_args(&self) -> &[i64];
}
