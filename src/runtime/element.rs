//! Element types carried by pipe buffers
//!
//! Streams carry fixed-size plain values. Anything that crosses a file
//! descriptor must be [`bytemuck::Pod`] so a buffer window can be viewed as
//! raw bytes without copying.

use crate::template::FormatArg;
use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Complex sample: a real/imaginary pair stored as two consecutive `T`
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

impl<T> Complex<T> {
    pub fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

// SAFETY: `repr(C)` with two fields of the same type has no padding, and any
// bit pattern valid for both fields is valid for the pair.
unsafe impl<T: Zeroable> Zeroable for Complex<T> {}
unsafe impl<T: Pod> Pod for Complex<T> {}

impl<T: fmt::Display> fmt::Display for Complex<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.re, self.im)
    }
}

/// Plain numeric element: can be scaled, produced from an item count, and
/// handed to a format template.
pub trait Scalar: Pod + Default + PartialEq + fmt::Debug {
    /// Multiplicative identity, the default scale of the printers
    const ONE: Self;

    /// `self * factor`; integer types wrap instead of panicking
    fn scale(self, factor: Self) -> Self;

    /// Convert an element count, saturating at the type's maximum
    fn from_count(count: usize) -> Self;

    /// Template argument carrying this value
    fn to_arg(self) -> FormatArg;
}

macro_rules! impl_scalar_signed {
    ($($t:ty),*) => {$(
        impl Scalar for $t {
            const ONE: Self = 1;

            #[inline]
            fn scale(self, factor: Self) -> Self {
                self.wrapping_mul(factor)
            }

            #[inline]
            fn from_count(count: usize) -> Self {
                <$t>::try_from(count).unwrap_or(<$t>::MAX)
            }

            #[inline]
            fn to_arg(self) -> FormatArg {
                FormatArg::Int(self as i64)
            }
        }
    )*};
}

macro_rules! impl_scalar_unsigned {
    ($($t:ty),*) => {$(
        impl Scalar for $t {
            const ONE: Self = 1;

            #[inline]
            fn scale(self, factor: Self) -> Self {
                self.wrapping_mul(factor)
            }

            #[inline]
            fn from_count(count: usize) -> Self {
                <$t>::try_from(count).unwrap_or(<$t>::MAX)
            }

            #[inline]
            fn to_arg(self) -> FormatArg {
                FormatArg::Uint(self as u64)
            }
        }
    )*};
}

macro_rules! impl_scalar_float {
    ($($t:ty),*) => {$(
        impl Scalar for $t {
            const ONE: Self = 1.0;

            #[inline]
            fn scale(self, factor: Self) -> Self {
                self * factor
            }

            #[inline]
            fn from_count(count: usize) -> Self {
                count as $t
            }

            #[inline]
            fn to_arg(self) -> FormatArg {
                FormatArg::Float(self as f64)
            }
        }
    )*};
}

impl_scalar_signed!(i8, i16, i32, i64, isize);
impl_scalar_unsigned!(u8, u16, u32, u64, usize);
impl_scalar_float!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complex_is_two_packed_scalars() {
        assert_eq!(std::mem::size_of::<Complex<f32>>(), 8);
        assert_eq!(std::mem::size_of::<Complex<i16>>(), 4);

        let pairs = [Complex::new(1.0f32, -2.0), Complex::new(3.0, 4.0)];
        let flat: &[f32] = bytemuck::cast_slice(&pairs);
        assert_eq!(flat, &[1.0, -2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_from_count_saturates() {
        assert_eq!(u8::from_count(5000), u8::MAX);
        assert_eq!(i16::from_count(5000), 5000);
        assert_eq!(u32::from_count(5000), 5000);
        assert_eq!(f32::from_count(5000), 5000.0);
    }

    #[test]
    fn test_integer_scale_wraps() {
        assert_eq!(200u8.scale(2), 144);
        assert_eq!((-3i32).scale(4), -12);
        assert_eq!(1.5f64.scale(2.0), 3.0);
    }

    #[test]
    fn test_to_arg_keeps_signedness() {
        assert_eq!((-5i8).to_arg(), FormatArg::Int(-5));
        assert_eq!(250u8.to_arg(), FormatArg::Uint(250));
        assert_eq!(0.5f32.to_arg(), FormatArg::Float(0.5));
    }
}
