//! Shared library loaded by the `native-bridge` tests.
//!
//! Every export uses the C calling convention and only by-value arguments, so
//! the binder can bind them with `unsafe extern "C" fn` signatures.

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

/// Returns the point with its two fields exchanged.
#[no_mangle]
pub extern "C" fn swap(p: Point2D) -> Point2D {
    Point2D { x: p.y, y: p.x }
}

#[no_mangle]
pub extern "C" fn translate(p: Point2D, dx: f64, dy: f64) -> Point2D {
    Point2D {
        x: p.x + dx,
        y: p.y + dy,
    }
}

#[no_mangle]
pub extern "C" fn add_i64(a: i64, b: i64) -> i64 {
    a.wrapping_add(b)
}
