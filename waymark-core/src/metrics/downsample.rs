//! Uniform-stride index selection for chart series.

use super::MetricsError;

/// Indices of the points kept when thinning `len` points to roughly `cap`.
///
/// When `len <= cap` every index is returned. Otherwise indices are taken at a
/// stride of `ceil(len / cap)` starting from zero, and the final index is
/// appended if the stride skipped it. The first and last points are always
/// kept and the result never exceeds `cap + 1` entries.
///
/// # Errors
///
/// Returns [`MetricsError::ZeroSampleCap`] when `cap` is zero.
///
/// # Examples
///
/// ```
/// use waymark_core::downsample_indices;
///
/// assert_eq!(downsample_indices(5, 10)?, vec![0, 1, 2, 3, 4]);
/// assert_eq!(downsample_indices(10, 4)?, vec![0, 3, 6, 9]);
/// assert_eq!(downsample_indices(11, 4)?, vec![0, 3, 6, 9, 10]);
/// # Ok::<(), waymark_core::MetricsError>(())
/// ```
pub fn downsample_indices(len: usize, cap: usize) -> Result<Vec<usize>, MetricsError> {
    if cap == 0 {
        return Err(MetricsError::ZeroSampleCap);
    }
    if len <= cap {
        return Ok((0..len).collect());
    }

    let stride = len.div_ceil(cap);
    let mut indices: Vec<usize> = (0..len).step_by(stride).collect();
    let last = len - 1;
    if indices.last() != Some(&last) {
        indices.push(last);
    }
    Ok(indices)
}
