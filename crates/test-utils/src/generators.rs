//! Synthetic wind field generators.
//!
//! Patterns are predictable so tests can check positions and directions
//! without reference data.

use overlay_common::{DateKey, LevelKey, WindField, WindSample};

/// Regular lat/lon grid over `bounds` with a constant wind vector.
///
/// Samples are emitted row by row from `min_lat` upwards, `cols` per row.
pub fn uniform_grid(
    bounds: (f64, f64, f64, f64),
    rows: usize,
    cols: usize,
    u: f64,
    v: f64,
) -> Vec<WindSample> {
    let (min_lon, min_lat, max_lon, max_lat) = bounds;
    let lat_step = if rows > 1 {
        (max_lat - min_lat) / (rows - 1) as f64
    } else {
        0.0
    };
    let lon_step = if cols > 1 {
        (max_lon - min_lon) / (cols - 1) as f64
    } else {
        0.0
    };

    let mut samples = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            samples.push(WindSample::new(
                min_lat + row as f64 * lat_step,
                min_lon + col as f64 * lon_step,
                u,
                v,
            ));
        }
    }
    samples
}

/// Grid whose wind speed grows linearly from 0 to `max_speed` along the
/// sample order, blowing from the west.
pub fn ramp_grid(
    bounds: (f64, f64, f64, f64),
    rows: usize,
    cols: usize,
    max_speed: f64,
) -> Vec<WindSample> {
    let mut samples = uniform_grid(bounds, rows, cols, 0.0, 0.0);
    let last = samples.len().saturating_sub(1).max(1) as f64;
    for (i, sample) in samples.iter_mut().enumerate() {
        sample.u = max_speed * i as f64 / last;
    }
    samples
}

/// A uniform field ready for the renderer.
pub fn uniform_field(
    level: LevelKey,
    date: DateKey,
    bounds: (f64, f64, f64, f64),
    rows: usize,
    cols: usize,
) -> WindField {
    WindField::new(level, date, Some(0.0), uniform_grid(bounds, rows, cols, 5.0, 5.0))
}
