//! Column width specifications and their resolution to points.
//!
//! A column is either an absolute point width or a percentage. Absolute
//! columns are used as-is; percentage columns share whatever width the
//! absolute columns leave, proportionally to their values. When every
//! column is a percentage the resolved widths sum exactly to the table
//! width.
//!
//! ```
//! use pagegrid::unit::{UnitValue, resolve_column_widths};
//!
//! let widths = resolve_column_widths(300.0, &UnitValue::percent_array(3));
//! assert!((widths.total() - 300.0).abs() < 0.01);
//! ```

use num_rational::Ratio;

use crate::error::InvalidWidthSpec;
use crate::measure::Measurement;

/// Resolution unit for width distribution: 1/1000 pt.
const MILLIPOINTS: f32 = 1000.0;

/// Tolerance when comparing a column sum with a declared table width.
pub const WIDTH_TOLERANCE: f32 = 0.01;

/// An absolute or relative length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitValue {
    Point(f32),
    Percent(f32),
}

impl UnitValue {
    #[must_use]
    pub const fn points(value: f32) -> Self {
        Self::Point(value)
    }

    #[must_use]
    pub const fn percent(value: f32) -> Self {
        Self::Percent(value)
    }

    /// `n` equal percentage columns.
    #[must_use]
    pub fn percent_array(n: usize) -> Vec<Self> {
        #[expect(clippy::cast_precision_loss, reason = "column counts are small")]
        let share = if n == 0 { 0.0 } else { 100.0 / n as f32 };
        vec![Self::Percent(share); n]
    }

    /// Percentage columns proportional to `weights` (e.g. `[1.0, 3.0]`).
    #[must_use]
    pub fn weighted_array(weights: &[f32]) -> Vec<Self> {
        let total: f32 = weights.iter().map(|w| w.max(0.0)).sum();
        weights
            .iter()
            .map(|w| {
                if total > 0.0 {
                    Self::Percent(w.max(0.0) * 100.0 / total)
                } else {
                    Self::Percent(0.0)
                }
            })
            .collect()
    }

    /// Absolute columns with the given point widths.
    #[must_use]
    pub fn point_array(widths: &[f32]) -> Vec<Self> {
        widths.iter().map(|&w| Self::Point(w)).collect()
    }

    #[must_use]
    pub const fn is_percent(&self) -> bool {
        matches!(self, Self::Percent(_))
    }

    /// Resolve against a reference length.
    #[must_use]
    pub fn resolve(&self, reference: f32) -> f32 {
        match *self {
            Self::Point(v) => v.max(0.0),
            Self::Percent(p) => (reference * p / 100.0).max(0.0),
        }
    }
}

/// Column widths in points, together with the width they were resolved for.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWidths {
    pub widths: Vec<f32>,
    pub table_width: f32,
    all_absolute: bool,
}

impl ResolvedWidths {
    /// Sum of the column widths.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.widths.iter().sum()
    }

    /// Signed difference between the column sum and the table width.
    /// Positive values mean the columns overflow the table.
    #[must_use]
    pub fn excess(&self) -> f32 {
        self.total() - self.table_width
    }

    /// Validate the columns against a declared table width.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidWidthSpec`] when every column is absolute and their
    /// sum diverges from `declared` beyond [`WIDTH_TOLERANCE`], or when the
    /// absolute columns alone are wider than the table.
    pub fn check_declared(&self, declared: Option<f32>) -> Result<(), InvalidWidthSpec> {
        let total = self.total();
        if self.all_absolute
            && let Some(declared) = declared
            && (total - declared).abs() > WIDTH_TOLERANCE
        {
            return Err(InvalidWidthSpec {
                declared,
                resolved: total,
            });
        }
        if self.excess() > WIDTH_TOLERANCE {
            return Err(InvalidWidthSpec {
                declared: self.table_width,
                resolved: total,
            });
        }
        Ok(())
    }
}

/// Compute the table width from an optional declared width.
///
/// Without a declared width, an all-absolute table is as wide as its
/// columns; anything else uses the whole available width.
#[must_use]
pub fn table_width(declared: Option<UnitValue>, specs: &[UnitValue], available: f32) -> f32 {
    match declared {
        Some(width) => width.resolve(available),
        None if !specs.is_empty() && specs.iter().all(|s| !s.is_percent()) => {
            specs.iter().map(|s| s.resolve(available)).sum()
        }
        None => available.max(0.0),
    }
}

/// Resolve column specifications into point widths for a table of
/// `table_width` points.
#[must_use]
pub fn resolve_column_widths(table_width: f32, specs: &[UnitValue]) -> ResolvedWidths {
    let table_width = table_width.max(0.0);
    let absolute: f32 = specs
        .iter()
        .filter(|s| !s.is_percent())
        .map(|s| s.resolve(table_width))
        .sum();
    let remaining = (table_width - absolute).max(0.0);

    let weights: Vec<i64> = specs
        .iter()
        .filter_map(|s| match *s {
            UnitValue::Percent(p) => Some(to_millipoints(p)),
            UnitValue::Point(_) => None,
        })
        .collect();
    let shares = distribute(to_millipoints(remaining), &weights);

    let mut shares = shares.into_iter();
    let widths = specs
        .iter()
        .map(|s| match s {
            UnitValue::Point(_) => s.resolve(table_width),
            UnitValue::Percent(_) => shares.next().map_or(0.0, from_millipoints),
        })
        .collect();

    ResolvedWidths {
        widths,
        table_width,
        all_absolute: specs.iter().all(|s| !s.is_percent()),
    }
}

/// Column widths chosen from content measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoWidths {
    pub widths: Vec<f32>,
    /// Set when the minimum content widths alone exceed the available width.
    pub overflow: bool,
}

/// Auto layout: size columns by their content.
///
/// Each column starts at its natural width, the larger of its spec and its
/// widest content. Columns wider than `available` in total are collapsed
/// towards their minimum widths; with `expand` set, narrower tables grow to
/// `available`, proportionally to the natural widths.
#[must_use]
pub fn auto_column_widths(
    available: f32,
    specs: &[UnitValue],
    content: &[Measurement],
    expand: bool,
) -> AutoWidths {
    let available_mp = to_millipoints(available);
    let mut minimums = Vec::with_capacity(specs.len());
    let natural: Vec<i64> = specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let measured = content.get(i).copied().unwrap_or_default();
            let spec_width = spec.resolve(available);
            let minimum = match spec {
                UnitValue::Point(_) => measured.minimum.max(spec_width),
                UnitValue::Percent(_) => measured.minimum,
            };
            minimums.push(to_millipoints(minimum));
            to_millipoints(measured.maximum.max(spec_width).max(minimum))
        })
        .collect();

    let mut widths = natural;
    let mut overflow = false;
    let total: i64 = widths.iter().sum();
    if total > available_mp {
        widths = collapse_widths(&widths, &minimums, available_mp);
        overflow = minimums.iter().sum::<i64>() > available_mp;
    } else if expand && total < available_mp {
        widths = expand_widths_by_weights(&widths, available_mp);
    }

    AutoWidths {
        widths: widths.into_iter().map(from_millipoints).collect(),
        overflow,
    }
}

/// Shrink columns proportionally to how far they sit above their minimum.
fn collapse_widths(widths: &[i64], minimums: &[i64], available: i64) -> Vec<i64> {
    let total: i64 = widths.iter().sum();
    if total <= available {
        return widths.to_vec();
    }

    let mut result = widths.to_vec();
    let excess = total - available;
    let shrinkable: Vec<i64> = result
        .iter()
        .zip(minimums)
        .map(|(w, m)| (w - m).max(0))
        .collect();
    let total_shrinkable: i64 = shrinkable.iter().sum();
    if total_shrinkable == 0 {
        return result;
    }

    let excess = excess.min(total_shrinkable);
    for (i, &shrink) in shrinkable.iter().enumerate() {
        if shrink > 0 {
            let reduction = (Ratio::new(shrink, total_shrinkable) * excess)
                .round()
                .to_integer();
            result[i] -= reduction.min(shrink);
        }
    }

    // Rounding leftovers come off the rightmost columns first.
    let mut diff = result.iter().sum::<i64>() - available;
    for i in (0..result.len()).rev() {
        if diff <= 0 {
            break;
        }
        let can_remove = (result[i] - minimums[i]).max(0).min(diff);
        result[i] -= can_remove;
        diff -= can_remove;
    }
    result
}

/// Grow columns proportionally to their current widths.
fn expand_widths_by_weights(widths: &[i64], available: i64) -> Vec<i64> {
    let total: i64 = widths.iter().sum();
    if total >= available {
        return widths.to_vec();
    }
    let weights: Vec<i64> = widths.iter().map(|&w| w.max(1)).collect();
    let extra = distribute(available - total, &weights);
    widths.iter().zip(extra).map(|(w, e)| w + e).collect()
}

/// Split `total` into integer shares proportional to `weights`.
///
/// The last weighted entry takes the remainder so the shares always sum to
/// `total`. All-zero weights share equally.
fn distribute(total: i64, weights: &[i64]) -> Vec<i64> {
    if weights.is_empty() {
        return Vec::new();
    }
    let mut weights = weights.to_vec();
    if weights.iter().all(|&w| w <= 0) {
        weights.fill(1);
    }
    let total_weight: i64 = weights.iter().map(|&w| w.max(0)).sum();
    let last_index = weights.iter().rposition(|&w| w > 0).unwrap_or(0);

    let mut distributed = 0;
    weights
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let share = if i == last_index {
                total - distributed
            } else if w <= 0 {
                0
            } else {
                (Ratio::new(w, total_weight) * total).round().to_integer()
            };
            distributed += share;
            share
        })
        .collect()
}

#[expect(clippy::cast_possible_truncation, reason = "page lengths fit in i64 millipoints")]
fn to_millipoints(value: f32) -> i64 {
    (value.max(0.0) * MILLIPOINTS).round() as i64
}

#[expect(clippy::cast_precision_loss, reason = "page lengths fit in f32")]
fn from_millipoints(value: i64) -> f32 {
    value as f32 / MILLIPOINTS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_percent_array_sums_to_width() {
        let resolved = resolve_column_widths(595.0, &UnitValue::percent_array(7));
        assert!(close(resolved.total(), 595.0));
        assert!(resolved.check_declared(None).is_ok());
    }

    #[test]
    fn test_percent_normalised_when_not_100() {
        let specs = [UnitValue::percent(10.0), UnitValue::percent(30.0)];
        let resolved = resolve_column_widths(200.0, &specs);
        assert!(close(resolved.widths[0], 50.0));
        assert!(close(resolved.widths[1], 150.0));
    }

    #[test]
    fn test_weighted_array() {
        let resolved = resolve_column_widths(400.0, &UnitValue::weighted_array(&[1.0, 3.0]));
        assert!(close(resolved.widths[0], 100.0));
        assert!(close(resolved.widths[1], 300.0));
    }

    #[test]
    fn test_absolute_used_as_is() {
        let specs = UnitValue::point_array(&[100.0, 150.0]);
        let resolved = resolve_column_widths(300.0, &specs);
        assert!(close(resolved.widths[0], 100.0));
        assert!(close(resolved.widths[1], 150.0));
        assert!(close(resolved.excess(), -50.0));
    }

    #[test]
    fn test_absolute_mismatch_reports_invalid_width_spec() {
        let specs = UnitValue::point_array(&[100.0, 150.0]);
        let resolved = resolve_column_widths(300.0, &specs);
        let err = resolved.check_declared(Some(300.0)).unwrap_err();
        assert!(close(err.declared, 300.0));
        assert!(close(err.resolved, 250.0));
    }

    #[test]
    fn test_absolute_overflow_reported() {
        let specs = UnitValue::point_array(&[200.0, 200.0]);
        let resolved = resolve_column_widths(300.0, &specs);
        assert!(close(resolved.excess(), 100.0));
        assert!(resolved.check_declared(None).is_err());
    }

    #[test]
    fn test_mixed_percent_shares_remaining() {
        let specs = [
            UnitValue::points(100.0),
            UnitValue::percent(25.0),
            UnitValue::percent(75.0),
        ];
        let resolved = resolve_column_widths(500.0, &specs);
        assert!(close(resolved.widths[0], 100.0));
        assert!(close(resolved.widths[1], 100.0));
        assert!(close(resolved.widths[2], 300.0));
    }

    #[test]
    fn test_zero_percent_columns_share_equally() {
        let specs = [UnitValue::percent(0.0), UnitValue::percent(0.0)];
        let resolved = resolve_column_widths(90.0, &specs);
        assert!(close(resolved.widths[0], 45.0));
        assert!(close(resolved.widths[1], 45.0));
    }

    #[test]
    fn test_table_width_rules() {
        let pct = UnitValue::percent_array(2);
        assert!(close(table_width(None, &pct, 400.0), 400.0));
        assert!(close(
            table_width(Some(UnitValue::percent(50.0)), &pct, 400.0),
            200.0
        ));
        let abs = UnitValue::point_array(&[40.0, 60.0]);
        assert!(close(table_width(None, &abs, 400.0), 100.0));
    }

    #[test]
    fn test_auto_widths_natural_when_room() {
        let content = [Measurement::new(10.0, 40.0), Measurement::new(5.0, 60.0)];
        let auto = auto_column_widths(500.0, &[UnitValue::points(0.0); 2], &content, false);
        assert!(close(auto.widths[0], 40.0));
        assert!(close(auto.widths[1], 60.0));
        assert!(!auto.overflow);

        let expanded = auto_column_widths(200.0, &[UnitValue::points(0.0); 2], &content, true);
        assert!(close(expanded.widths.iter().sum::<f32>(), 200.0));
        assert!(close(expanded.widths[0], 80.0));
    }

    #[test]
    fn test_auto_widths_collapse_to_minimum() {
        let content = [Measurement::new(20.0, 100.0), Measurement::new(20.0, 100.0)];
        let auto = auto_column_widths(120.0, &[UnitValue::points(0.0); 2], &content, false);
        assert!(close(auto.widths.iter().sum::<f32>(), 120.0));
        assert!(auto.widths.iter().all(|&w| w >= 20.0 - 0.01));
        assert!(!auto.overflow);
    }

    #[test]
    fn test_auto_widths_overflow_flagged() {
        let content = [Measurement::new(80.0, 100.0), Measurement::new(80.0, 100.0)];
        let auto = auto_column_widths(100.0, &[UnitValue::points(0.0); 2], &content, false);
        assert!(auto.overflow);
        assert!(close(auto.widths[0], 80.0));
        assert!(close(auto.widths[1], 80.0));
    }

    #[test]
    fn test_distribute_remainder_goes_to_last() {
        let shares = distribute(100, &[1, 1, 1]);
        assert_eq!(shares.iter().sum::<i64>(), 100);
        assert_eq!(shares, vec![33, 33, 34]);
    }
}
