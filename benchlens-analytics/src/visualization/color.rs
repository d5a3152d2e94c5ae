//! Relative color scales
//!
//! A scale is always computed from the records currently on screen, never
//! from a global range, so colors show contrast within the current view.

use benchlens_common::{Metric, TestRun};
use serde::Serialize;

/// Fixed 18-step gradient, green through yellow and orange to red.
pub const PALETTE: [&str; 18] = [
    "#00a651", "#1fb14a", "#3dbb45", "#5cc540", "#7bcf3b", "#9ad936",
    "#b9e331", "#d8ed2c", "#f7f727", "#fbe31f", "#fdd017", "#ffbc10",
    "#ffa80a", "#ff9405", "#ff7f00", "#f55a00", "#eb3500", "#e01000",
];

/// Returned when a scale has no colors at all
pub const NEUTRAL_COLOR: &str = "#9e9e9e";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
    pub colors: &'static [&'static str],
}

impl ColorScale {
    /// Scale of a dataset without any positive value
    pub const fn empty() -> Self {
        Self { min: 0.0, max: 0.0, colors: &[] }
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::empty()
    }
}

/// Build a scale spanning the positive values of `metric` in `records`.
/// Non-positive values (absent metrics read as 0) do not count.
pub fn relative_color_scale<'a, I>(records: I, metric: Metric) -> ColorScale
where
    I: IntoIterator<Item = &'a TestRun>,
{
    let (min, max) = records
        .into_iter()
        .map(|run| metric.value(run))
        .filter(|value| *value > 0.0)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
            (min.min(value), max.max(value))
        });

    if min > max {
        return ColorScale::empty();
    }

    ColorScale { min, max, colors: &PALETTE }
}

/// Map a value onto the scale's palette, clamping values outside the range.
pub fn color_for_value(value: f64, scale: &ColorScale) -> &'static str {
    let Some(&first) = scale.colors.first() else {
        return NEUTRAL_COLOR;
    };
    if scale.min == scale.max {
        return first;
    }

    let last = (scale.colors.len() - 1) as f64;
    let ratio = (value - scale.min) / (scale.max - scale.min);
    let index = (ratio * last).floor().clamp(0.0, last) as usize;
    scale.colors[index]
}
