//! Small descriptive-statistics helpers over `f64` slices.
//!
//! Every function returns `None` on empty input instead of a sentinel, so an
//! empty filter result surfaces as "no data" rather than a bogus number.

use std::cmp::Ordering;

/// Closed numeric interval `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lo: f64,
    pub hi: f64,
}

impl Bounds {
    /// Builds the interval, swapping reversed endpoints.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// `lo <= v <= hi`.
    pub fn contains(&self, v: f64) -> bool {
        self.lo <= v && v <= self.hi
    }

    /// `lo < v < hi`.
    pub fn contains_strictly(&self, v: f64) -> bool {
        self.lo < v && v < self.hi
    }

    /// `self` squeezed into `outer`.
    pub fn clamp_to(&self, outer: Bounds) -> Bounds {
        Bounds::new(
            self.lo.clamp(outer.lo, outer.hi),
            self.hi.clamp(outer.lo, outer.hi),
        )
    }
}

fn sorted(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Quantile of already-sorted data, linear interpolation between closest
/// ranks (the default of most dataframe libraries).
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let index = q * (sorted.len() - 1) as f64;
    let lower_idx = index.floor() as usize;
    let upper_idx = index.ceil() as usize;

    if lower_idx == upper_idx || upper_idx >= sorted.len() {
        Some(sorted[lower_idx.min(sorted.len() - 1)])
    } else {
        let fraction = index - lower_idx as f64;
        Some(sorted[lower_idx] * (1.0 - fraction) + sorted[upper_idx] * fraction)
    }
}

pub fn quantile(data: &[f64], q: f64) -> Option<f64> {
    quantile_sorted(&sorted(data), q)
}

/// Both quantiles of a band in one sort.
pub fn quantile_bounds(data: &[f64], lower_q: f64, upper_q: f64) -> Option<Bounds> {
    let sorted = sorted(data);
    Some(Bounds::new(
        quantile_sorted(&sorted, lower_q)?,
        quantile_sorted(&sorted, upper_q)?,
    ))
}

pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

pub fn min_max(data: &[f64]) -> Option<Bounds> {
    if data.is_empty() {
        return None;
    }
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(Bounds { lo: min, hi: max })
}

/// Index of the largest value; the first occurrence wins on ties.
pub fn argmax_first(data: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in data.iter().enumerate() {
        match best {
            Some(b) if v <= data[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Box-and-whisker summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

impl BoxSummary {
    /// Linear-interpolated quartiles; whiskers reach the most extreme
    /// observations within 1.5×IQR of the box.
    pub fn from_values(data: &[f64]) -> Option<Self> {
        let sorted = sorted(data);
        let q1 = quantile_sorted(&sorted, 0.25)?;
        let median = quantile_sorted(&sorted, 0.5)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let fence = 1.5 * (q3 - q1);

        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|&v| v >= q1 - fence)
            .unwrap_or(q1);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= q3 + fence)
            .unwrap_or(q3);

        Some(Self {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let data = [4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(quantile(&data, 0.0), Some(1.0));
        assert_eq!(quantile(&data, 0.5), Some(3.0));
        assert_eq!(quantile(&data, 1.0), Some(5.0));
        assert!(approx(quantile(&data, 0.1).unwrap(), 1.4));
        assert!(approx(quantile(&data, 0.95).unwrap(), 4.8));
        assert!(approx(quantile(&data, 0.135).unwrap(), 1.54));
    }

    #[test]
    fn empty_input_is_none() {
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(mean(&[]), None);
        assert_eq!(min_max(&[]), None);
        assert_eq!(argmax_first(&[]), None);
        assert_eq!(BoxSummary::from_values(&[]), None);
        assert_eq!(quantile_bounds(&[], 0.1, 0.9), None);
    }

    #[test]
    fn argmax_prefers_first_occurrence() {
        assert_eq!(argmax_first(&[1.0, 7.0, 3.0, 7.0]), Some(1));
        assert_eq!(argmax_first(&[2.0]), Some(0));
    }

    #[test]
    fn bounds_normalise_and_clamp() {
        let b = Bounds::new(9.0, 3.0);
        assert_eq!(b, Bounds { lo: 3.0, hi: 9.0 });
        assert!(b.contains(3.0) && b.contains(9.0));
        assert!(!b.contains_strictly(3.0) && b.contains_strictly(4.0));
        assert_eq!(b.clamp_to(Bounds::new(5.0, 20.0)), Bounds { lo: 5.0, hi: 9.0 });
    }

    #[test]
    fn mean_and_range() {
        let data = [200.0, 250.0, 300.0];
        assert_eq!(mean(&data), Some(250.0));
        assert_eq!(min_max(&data), Some(Bounds { lo: 200.0, hi: 300.0 }));
    }

    #[test]
    fn box_summary_whiskers_stop_at_fence() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let b = BoxSummary::from_values(&data).unwrap();
        assert!(approx(b.q1, 2.25));
        assert!(approx(b.median, 3.5));
        assert!(approx(b.q3, 4.75));
        assert_eq!(b.lower_whisker, 1.0);
        assert_eq!(b.upper_whisker, 5.0);
    }
}
