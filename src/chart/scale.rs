use chrono::NaiveDate;

use crate::models::{Accessor, PriceRecord};

/// Linear map from a numeric domain to a pixel range. A collapsed domain
/// maps everything to the middle of the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// `[0, max]` onto `[height, 0]`: larger values draw higher.
    pub fn zero_based(max: f64, height: f64) -> Self {
        Self::new((0.0, max), (height, 0.0))
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }
}

/// Day-resolution time scale over `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    start: NaiveDate,
    end: NaiveDate,
    range: (f64, f64),
}

impl TimeScale {
    pub fn new(start: NaiveDate, end: NaiveDate, range: (f64, f64)) -> Self {
        Self { start, end, range }
    }

    /// Scale over the date extent of `records`. An empty slice gives a
    /// collapsed domain.
    pub fn over(records: &[PriceRecord], width: f64) -> Self {
        let (start, end) = date_extent(records).unwrap_or_default();
        Self::new(start, end, (0.0, width))
    }

    pub fn domain(&self) -> (NaiveDate, NaiveDate) {
        (self.start, self.end)
    }

    pub fn map(&self, date: NaiveDate) -> f64 {
        let (r0, r1) = self.range;
        let span = (self.end - self.start).num_days();
        if span == 0 {
            return (r0 + r1) / 2.0;
        }
        let offset = (date - self.start).num_days() as f64;
        r0 + offset / span as f64 * (r1 - r0)
    }
}

pub fn date_extent(records: &[PriceRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let min = records.iter().map(|r| r.date).min()?;
    let max = records.iter().map(|r| r.date).max()?;
    Some((min, max))
}

/// Largest finite accessor value, `0.0` when there is none.
pub fn max_value(records: &[PriceRecord], accessor: Accessor) -> f64 {
    records
        .iter()
        .map(|r| accessor.value(r))
        .filter(|v| v.is_finite())
        .reduce(f64::max)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ymd;

    #[test]
    fn test_linear_scale_inverted_range() {
        let y = LinearScale::zero_based(50.0, 430.0);
        assert_eq!(y.map(0.0), 430.0);
        assert_eq!(y.map(50.0), 0.0);
        assert_eq!(y.map(25.0), 215.0);
    }

    #[test]
    fn test_linear_scale_collapsed_domain_maps_to_midpoint() {
        let y = LinearScale::zero_based(0.0, 430.0);
        assert_eq!(y.map(0.0), 215.0);
        assert_eq!(y.map(12.0), 215.0);
    }

    #[test]
    fn test_time_scale_endpoints_and_middle() {
        let x = TimeScale::new(ymd(2020, 1, 1), ymd(2020, 1, 11), (0.0, 630.0));
        assert_eq!(x.map(ymd(2020, 1, 1)), 0.0);
        assert_eq!(x.map(ymd(2020, 1, 11)), 630.0);
        assert_eq!(x.map(ymd(2020, 1, 6)), 315.0);
    }

    #[test]
    fn test_pixels_stay_inside_plot() {
        let records: Vec<PriceRecord> = (1..=28)
            .map(|d| PriceRecord::new(ymd(2021, 2, d), d as f64 * 3.5, 1e6 * d as f64))
            .collect();
        let x = TimeScale::over(&records, 630.0);
        let y = LinearScale::zero_based(max_value(&records, Accessor::Close), 430.0);
        for r in &records {
            let px = x.map(r.date);
            let py = y.map(r.close);
            assert!((0.0..=630.0).contains(&px), "x {} out of plot", px);
            assert!((0.0..=430.0).contains(&py), "y {} out of plot", py);
        }
    }

    #[test]
    fn test_max_value_ignores_nan() {
        let records = vec![
            PriceRecord::new(ymd(2020, 1, 1), 5.0, 0.0),
            PriceRecord::new(ymd(2020, 1, 2), f64::NAN, 0.0),
            PriceRecord::new(ymd(2020, 1, 3), 7.0, 0.0),
        ];
        assert_eq!(max_value(&records, Accessor::Close), 7.0);
        assert_eq!(max_value(&[], Accessor::Close), 0.0);
    }

    #[test]
    fn test_empty_records_give_collapsed_time_scale() {
        let x = TimeScale::over(&[], 630.0);
        assert_eq!(x.map(ymd(2020, 1, 1)), 315.0);
    }
}
