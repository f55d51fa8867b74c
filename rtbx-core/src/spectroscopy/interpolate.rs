//! One-dimensional bracketing and linear blending.
//!
//! Every table axis is strictly ascending once loaded, so locating a coordinate is a
//! binary search for the last grid point not above it. The blend is written
//! as `a * (1 - f) + b * f` so that `f == 0` and `f == 1` reproduce the corner
//! values exactly.

use ndarray::ArrayView1;

use crate::precision::Precision;

/// Two neighbouring indices on an axis and the position between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket<T> {
    pub lo: usize,
    pub hi: usize,
    pub frac: T,
}

impl<T: Precision> Bracket<T> {
    /// Bracket for a single-entry axis: both corners are index 0.
    pub fn degenerate() -> Self {
        Self {
            lo: 0,
            hi: 0,
            frac: T::zero(),
        }
    }

    /// Point both corners at the only one carrying weight, if the fraction
    /// sits exactly on a grid point.
    pub fn collapsed(self) -> Self {
        if self.frac == T::zero() {
            Self { hi: self.lo, ..self }
        } else if self.frac == T::one() {
            Self {
                lo: self.hi,
                frac: T::zero(),
                ..self
            }
        } else {
            self
        }
    }

    /// Blend the values found at `lo` and `hi`.
    pub fn blend(&self, lo: T, hi: T) -> T {
        lerp(lo, hi, self.frac)
    }
}

/// Linear blend between `a` and `b`.
pub fn lerp<T: Precision>(a: T, b: T, frac: T) -> T {
    a * (T::one() - frac) + b * frac
}

/// Locate `x` on an ascending axis with at least two points.
///
/// Returns `None` if `x` is outside `[axis[0], axis[n-1]]` or NaN. The last
/// grid point maps onto the final interval with a fraction of one.
pub fn locate<T: Precision>(axis: ArrayView1<T>, x: T) -> Option<Bracket<T>> {
    let n = axis.len();
    if n < 2 || x.is_nan() || x < axis[0] || x > axis[n - 1] {
        return None;
    }

    // Largest `lo` in [0, n-2] with axis[lo] <= x
    let (mut lo, mut hi) = (0, n - 1);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if axis[mid] <= x {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let frac = (x - axis[lo]) / (axis[hi] - axis[lo]);
    Some(Bracket { lo, hi, frac })
}

/// Clamp `x` into the axis range. Returns the clamped value and whether it moved.
pub fn clamp_to_axis<T: Precision>(axis: ArrayView1<T>, x: T) -> (T, bool) {
    let first = axis[0];
    let last = axis[axis.len() - 1];
    if x < first {
        (first, true)
    } else if x > last {
        (last, true)
    } else {
        (x, false)
    }
}

/// True if every value is strictly greater than the one before it.
pub fn is_strictly_ascending(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}

/// True if every value is strictly smaller than the one before it.
pub fn is_strictly_descending(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] > w[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_locate_interior() {
        let axis = array![100.0_f64, 200.0, 500.0, 1000.0];
        let bracket = locate(axis.view(), 350.0).unwrap();
        assert_eq!((bracket.lo, bracket.hi), (1, 2));
        assert_relative_eq!(bracket.frac, 0.5);
    }

    #[test]
    fn test_locate_grid_points() {
        let axis = array![100.0_f64, 200.0, 500.0, 1000.0];

        let first = locate(axis.view(), 100.0).unwrap();
        assert_eq!((first.lo, first.frac), (0, 0.0));

        let inner = locate(axis.view(), 500.0).unwrap();
        assert_eq!((inner.lo, inner.frac), (2, 0.0));

        let last = locate(axis.view(), 1000.0).unwrap();
        assert_eq!((last.lo, last.hi, last.frac), (2, 3, 1.0));
    }

    #[test]
    fn test_locate_outside() {
        let axis = array![1.0_f32, 2.0];
        assert!(locate(axis.view(), 0.5).is_none());
        assert!(locate(axis.view(), 2.5).is_none());
        assert!(locate(axis.view(), f32::NAN).is_none());
        assert!(locate(array![1.0_f32].view(), 1.0).is_none());
    }

    #[test]
    fn test_lerp_endpoints_exact() {
        let (a, b) = (0.1_f64, 0.7);
        assert_eq!(lerp(a, b, 0.0), a);
        assert_eq!(lerp(a, b, 1.0), b);
        assert_relative_eq!(lerp(a, b, 0.25), 0.25);
    }

    #[test]
    fn test_collapsed() {
        let axis = array![1.0_f64, 2.0, 3.0];
        let on_last = locate(axis.view(), 3.0).unwrap().collapsed();
        assert_eq!((on_last.lo, on_last.hi, on_last.frac), (2, 2, 0.0));

        let on_first = locate(axis.view(), 1.0).unwrap().collapsed();
        assert_eq!((on_first.lo, on_first.hi), (0, 0));

        let inside = locate(axis.view(), 1.5).unwrap().collapsed();
        assert_eq!((inside.lo, inside.hi), (0, 1));
    }

    #[test]
    fn test_clamp_to_axis() {
        let axis = array![10.0_f64, 20.0];
        assert_eq!(clamp_to_axis(axis.view(), 5.0), (10.0, true));
        assert_eq!(clamp_to_axis(axis.view(), 25.0), (20.0, true));
        assert_eq!(clamp_to_axis(axis.view(), 15.0), (15.0, false));
    }

    #[test]
    fn test_axis_ordering() {
        assert!(is_strictly_ascending(&[1.0, 2.0, 3.0]));
        assert!(!is_strictly_ascending(&[1.0, 1.0, 3.0]));
        assert!(is_strictly_descending(&[1050.0, 700.0, 10.0]));
        assert!(!is_strictly_descending(&[1050.0, 1100.0]));
    }
}
