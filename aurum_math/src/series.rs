//! Element-wise transformations of indicator series

/// Carry the last non-missing value forward over gaps.
///
/// Leading gaps stay missing because there is nothing to carry.
pub fn forward_fill(values: &[f64]) -> Vec<f64> {
    let mut last = f64::NAN;
    values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                last
            } else {
                last = v;
                v
            }
        })
        .collect()
}

/// Fractional change between consecutive observations.
///
/// Gaps are forward filled first. The first element, and any element whose
/// predecessor is missing or zero, is `NaN`.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    let filled = forward_fill(values);
    let mut changes = Vec::with_capacity(filled.len());

    for i in 0..filled.len() {
        if i == 0 {
            changes.push(f64::NAN);
            continue;
        }

        let prev = filled[i - 1];
        let current = filled[i];
        if prev.is_nan() || current.is_nan() || prev == 0.0 {
            changes.push(f64::NAN);
        } else {
            changes.push(current / prev - 1.0);
        }
    }

    changes
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
