use chrono::NaiveDate;

/// Build a calendar date from literal parts at compile time.
pub const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar date literal"),
    }
}

// ── Price record ──────────────────────────────────────────────────────────────

/// One row of the source CSV. `close`/`volume` hold `NaN` when the source
/// cell could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
}

impl PriceRecord {
    pub fn new(date: NaiveDate, close: f64, volume: f64) -> Self {
        Self { date, close, volume }
    }
}

// ── Accessors ─────────────────────────────────────────────────────────────────

/// Numeric field extracted from a record to drive one chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    Close,
    /// Share volume scaled to millions.
    VolumeMillions,
}

impl Accessor {
    pub fn value(self, record: &PriceRecord) -> f64 {
        match self {
            Accessor::Close => record.close,
            Accessor::VolumeMillions => record.volume / 1e6,
        }
    }
}

// ── Date range ────────────────────────────────────────────────────────────────

/// Inclusive lower bound, exclusive upper bound. `None` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub const fn unbounded() -> Self {
        Self { start: None, end: None }
    }

    pub const fn before(end: NaiveDate) -> Self {
        Self { start: None, end: Some(end) }
    }

    pub const fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start: Some(start), end: Some(end) }
    }

    pub const fn from(start: NaiveDate) -> Self {
        Self { start: Some(start), end: None }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date < e)
    }
}

// ── Dataset ───────────────────────────────────────────────────────────────────

/// The loaded price history, in source file order. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<PriceRecord>,
}

impl Dataset {
    pub fn new(records: Vec<PriceRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records falling inside `range`, keeping source order.
    pub fn filter(&self, range: &DateRange) -> Vec<PriceRecord> {
        self.records
            .iter()
            .filter(|r| range.contains(r.date))
            .copied()
            .collect()
    }

    /// Rows whose Close or Volume is not a finite, non-negative number.
    pub fn validate(&self) -> ValidationReport {
        let mut invalid = Vec::new();
        for (index, r) in self.records.iter().enumerate() {
            for (field, value) in [("Close", r.close), ("Volume", r.volume)] {
                if !value.is_finite() || value < 0.0 {
                    invalid.push(InvalidField { index, date: r.date, field, value });
                }
            }
        }
        ValidationReport { invalid }
    }

    pub fn summary(&self) -> DatasetSummary {
        let closes = || self.records.iter().map(|r| r.close).filter(|v| v.is_finite());
        let mut invalid_rows: Vec<usize> = self.validate().invalid.iter().map(|f| f.index).collect();
        invalid_rows.dedup();

        DatasetSummary {
            records: self.records.len(),
            first: self.records.first().map(|r| r.date),
            last: self.records.last().map(|r| r.date),
            min_close: closes().reduce(f64::min),
            max_close: closes().reduce(f64::max),
            invalid_rows: invalid_rows.len(),
        }
    }
}

// ── Validation / summary ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct InvalidField {
    pub index: usize,
    pub date: NaiveDate,
    pub field: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub invalid: Vec<InvalidField>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub records: usize,
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
    pub min_close: Option<f64>,
    pub max_close: Option<f64>,
    pub invalid_rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(y: i32, m: u32, d: u32, close: f64, volume: f64) -> PriceRecord {
        PriceRecord::new(ymd(y, m, d), close, volume)
    }

    #[test]
    fn test_date_range_bounds() {
        let range = DateRange::between(ymd(2019, 12, 1), ymd(2022, 12, 10));
        assert!(!range.contains(ymd(2019, 11, 30)));
        assert!(range.contains(ymd(2019, 12, 1)));
        assert!(range.contains(ymd(2022, 12, 9)));
        assert!(!range.contains(ymd(2022, 12, 10)));
        assert!(DateRange::unbounded().contains(ymd(1999, 1, 1)));
    }

    #[test]
    fn test_accessor_scales_volume_to_millions() {
        let r = rec(2020, 1, 2, 59.98, 23_753_600.0);
        assert_eq!(Accessor::Close.value(&r), 59.98);
        assert!((Accessor::VolumeMillions.value(&r) - 23.7536).abs() < 1e-9);
    }

    #[test]
    fn test_filter_keeps_source_order() {
        let ds = Dataset::new(vec![
            rec(2020, 3, 1, 3.0, 1.0),
            rec(2018, 1, 1, 1.0, 1.0),
            rec(2021, 1, 1, 2.0, 1.0),
        ]);
        let got = ds.filter(&DateRange::from(ymd(2019, 12, 1)));
        let closes: Vec<f64> = got.iter().map(|r| r.close).collect();
        assert_eq!(closes, vec![3.0, 2.0]);
    }

    #[test]
    fn test_validate_flags_nan_and_negative() {
        let ds = Dataset::new(vec![
            rec(2020, 1, 1, 10.0, 5.0),
            rec(2020, 1, 2, f64::NAN, 5.0),
            rec(2020, 1, 3, 10.0, -1.0),
        ]);
        let report = ds.validate();
        assert!(!report.is_clean());
        assert_eq!(report.invalid.len(), 2);
        assert_eq!(report.invalid[0].index, 1);
        assert_eq!(report.invalid[0].field, "Close");
        assert_eq!(report.invalid[1].field, "Volume");
    }

    #[test]
    fn test_summary_skips_non_finite_closes() {
        let ds = Dataset::new(vec![
            rec(2020, 1, 1, 10.0, 5.0),
            rec(2020, 1, 2, f64::NAN, 5.0),
            rec(2020, 1, 3, 30.0, 5.0),
        ]);
        let s = ds.summary();
        assert_eq!(s.records, 3);
        assert_eq!(s.first, Some(ymd(2020, 1, 1)));
        assert_eq!(s.last, Some(ymd(2020, 1, 3)));
        assert_eq!(s.min_close, Some(10.0));
        assert_eq!(s.max_close, Some(30.0));
        assert_eq!(s.invalid_rows, 1);
    }
}
