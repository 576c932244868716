//! Separable convolution kernels.

/// Symmetric 1D kernel of `(offset, weight)` taps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterKernel {
    taps: &'static [(isize, f32)],
}

/// 7-tap Gaussian approximation, offsets -3..=3.
///
/// The tabulated weights 0.006, 0.061, 0.242, 0.383 add up to 1.001 across
/// the kernel; they are stored divided by 1.001 so the taps sum to one.
pub static GAUSSIAN_7: FilterKernel = FilterKernel {
    taps: &[
        (-3, 0.005_994_006),
        (-2, 0.060_939_06),
        (-1, 0.241_758_24),
        (0, 0.382_617_38),
        (1, 0.241_758_24),
        (2, 0.060_939_06),
        (3, 0.005_994_006),
    ],
};

impl FilterKernel {
    pub fn taps(&self) -> &'static [(isize, f32)] {
        self.taps
    }

    /// Largest absolute tap offset.
    pub fn radius(&self) -> usize {
        self.taps.iter().map(|&(o, _)| o.unsigned_abs()).max().unwrap_or(0)
    }

    pub fn weight_sum(&self) -> f32 {
        self.taps.iter().map(|&(_, w)| w).sum()
    }

    /// Convolves one sample along a line of `len` values read through `at`.
    ///
    /// Taps landing outside `[0, len)` reuse the center sample instead of
    /// clamping or wrapping.
    #[inline]
    pub fn apply<F>(&self, center: usize, len: usize, at: F) -> f32
    where
        F: Fn(usize) -> f32,
    {
        let mut value = 0.0f32;
        for &(offset, weight) in self.taps {
            let index = center as isize + offset;
            let index = if index < 0 || index >= len as isize {
                center
            } else {
                index as usize
            };
            value += weight * at(index);
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_weights_sum_to_one() {
        assert!((GAUSSIAN_7.weight_sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_gaussian_matches_tabulated_ratios() {
        let taps = GAUSSIAN_7.taps();
        let tabulated = [0.006f32, 0.061, 0.242, 0.383, 0.242, 0.061, 0.006];
        for (&(_, w), t) in taps.iter().zip(tabulated) {
            assert!((w * 1.001 - t).abs() < 1e-6);
        }
    }

    #[test]
    fn test_gaussian_is_symmetric() {
        let taps = GAUSSIAN_7.taps();
        assert_eq!(taps.len() % 2, 1);
        for i in 0..taps.len() {
            let (o, w) = taps[i];
            let (mo, mw) = taps[taps.len() - 1 - i];
            assert_eq!(o, -mo);
            assert_eq!(w, mw);
        }
        assert_eq!(GAUSSIAN_7.radius(), 3);
    }

    #[test]
    fn test_apply_constant_line() {
        let line = [2.0f32; 10];
        let v = GAUSSIAN_7.apply(5, line.len(), |i| line[i]);
        assert!((v - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_apply_substitutes_center_out_of_range() {
        // Index 0: offsets -3..-1 fall outside and read the center.
        let line = [1.0f32, 0.0, 0.0, 0.0, 0.0];
        let v = GAUSSIAN_7.apply(0, line.len(), |i| line[i]);
        let expected: f32 = GAUSSIAN_7.taps()[..4].iter().map(|&(_, w)| w).sum();
        assert!((v - expected).abs() < 1e-6);
    }
}
