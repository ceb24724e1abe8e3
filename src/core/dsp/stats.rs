//! Summary statistics over magnitude spectra

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(data: &[f32]) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    // Accumulate in f64: spectra of loud windows reach ~1e7 per bin
    let sum: f64 = data.iter().map(|&x| x as f64).sum();
    (sum / data.len() as f64) as f32
}

/// Population standard deviation (divides by N)
pub fn std_dev(data: &[f32]) -> f32 {
    mean_and_std_dev(data).1
}

/// Mean and population standard deviation in one pass over the data
pub fn mean_and_std_dev(data: &[f32]) -> (f32, f32) {
    if data.is_empty() {
        return (0.0, 0.0);
    }

    let n = data.len() as f64;
    let mean = data.iter().map(|&x| x as f64).sum::<f64>() / n;
    let variance = data
        .iter()
        .map(|&x| {
            let d = x as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    (mean as f32, variance.max(0.0).sqrt() as f32)
}

/// Compute median of a slice
///
/// Sorts `data` in place. Even-length input averages the two middle values.
pub fn median(data: &mut [f32]) -> f32 {
    if data.is_empty() {
        return 0.0;
    }

    data.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = data.len() / 2;
    if data.len() % 2 == 0 {
        (data[mid - 1] + data[mid]) / 2.0
    } else {
        data[mid]
    }
}
