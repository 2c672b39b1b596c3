/// Linear-interpolated percentile (NIST method) of an unordered sample.
///
/// Returns 0 for an empty sample. `p` is clamped to `[0, 100]`.
#[must_use]
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let len = sorted.len();
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 100.0) };
    let rank = (len - 1) as f64 * p / 100.0 + 1.0;

    if rank <= 1.0 {
        return sorted[0];
    }
    if rank >= len as f64 {
        return sorted[len - 1];
    }

    let k = rank.floor() as usize;
    let d = rank - k as f64;
    sorted[k - 1] + d * (sorted[k] - sorted[k - 1])
}
