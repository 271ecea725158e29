//! Long-term reference statistics.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::error::CorrelError;
use crate::series::{TimeSeries, Timestamp, mean};

/// Mean of monthly means (MOMM).
///
/// Values are averaged per calendar month across all years, then the monthly
/// means are averaged. Each calendar month present weighs the same no matter
/// how many samples it holds, which removes seasonal sampling bias.
///
/// # Errors
/// Returns `InsufficientData` if the series has no valid values.
pub fn mean_of_monthly_means(series: &TimeSeries) -> Result<f64, CorrelError> {
    let mut sums = [0.0_f64; 12];
    let mut counts = [0_usize; 12];

    for p in series.iter().filter(|p| !p.is_missing()) {
        let month = p.timestamp.month0() as usize;
        sums[month] += p.value;
        counts[month] += 1;
    }

    let monthly: Vec<f64> = sums
        .iter()
        .zip(counts.iter())
        .filter(|&(_, &n)| n > 0)
        .map(|(&s, &n)| s / n as f64)
        .collect();

    if monthly.is_empty() {
        return Err(CorrelError::insufficient(
            "mean of monthly means needs at least one valid value",
        ));
    }

    Ok(mean(&monthly))
}

/// A date bound given as a date, a datetime or `YYYY-MM-DD`-prefixed text.
#[derive(Clone, Debug, PartialEq)]
pub enum DateInput {
    /// Calendar date (midnight)
    Date(NaiveDate),
    /// Exact timestamp
    DateTime(NaiveDateTime),
    /// Text; only the first 10 characters are read
    Text(String),
}

impl DateInput {
    /// Resolve to a timestamp.
    pub fn to_timestamp(&self) -> Result<Timestamp, CorrelError> {
        let date = match self {
            Self::DateTime(dt) => return Ok(*dt),
            Self::Date(d) => *d,
            Self::Text(s) => {
                let prefix = s.get(..10).unwrap_or(s);
                NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
                    .map_err(|e| CorrelError::Parse(format!("invalid date '{s}': {e}")))?
            }
        };
        date.and_hms_opt(0, 0, 0)
            .ok_or_else(|| CorrelError::Parse(format!("invalid date {date}")))
    }
}

impl From<NaiveDate> for DateInput {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for DateInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Long-term reference speed: MOMM, optionally over `[date_from, date_to]`.
///
/// Bounds are inclusive; dates resolve to midnight.
///
/// # Errors
/// - `Parse` if a text bound is not `YYYY-MM-DD`
/// - `InsufficientData` if no valid values fall in the range
pub fn calc_lt_ref_speed(
    data: &TimeSeries,
    date_from: Option<DateInput>,
    date_to: Option<DateInput>,
) -> Result<f64, CorrelError> {
    let from = date_from.map(|d| d.to_timestamp()).transpose()?;
    let to = date_to.map(|d| d.to_timestamp()).transpose()?;

    let selected = match (from, to) {
        (None, None) => data.clone(),
        (from, to) => data.between(
            from.unwrap_or(NaiveDateTime::MIN),
            to.unwrap_or(NaiveDateTime::MAX),
        ),
    };

    if selected.valid_values().is_empty() {
        return Err(CorrelError::insufficient(format!(
            "no data between {} and {}",
            from.map_or("start".to_string(), |t| t.to_string()),
            to.map_or("end".to_string(), |t| t.to_string()),
        )));
    }

    mean_of_monthly_means(&selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    const TOL: f64 = 1e-12;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily_series(start: NaiveDate, values: &[f64]) -> TimeSeries {
        TimeSeries::regular(start.and_hms_opt(0, 0, 0).unwrap(), TimeDelta::days(1), values).unwrap()
    }

    #[test]
    fn test_months_weighted_equally() {
        // 31 January days at 10 m/s, 3 February days at 4 m/s
        let mut values = vec![10.0; 31];
        values.extend([4.0; 3]);
        let series = daily_series(date(2020, 1, 1), &values);

        let momm = mean_of_monthly_means(&series).unwrap();
        assert!((momm - 7.0).abs() < TOL, "got {momm}");
        assert!((series.mean() - 322.0 / 34.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_month_across_years_pooled() {
        let jan_2020 = daily_series(date(2020, 1, 1), &[2.0; 2]);
        let jan_2021 = daily_series(date(2021, 1, 1), &[6.0; 6]);
        let mut points = jan_2020.points().to_vec();
        points.extend_from_slice(jan_2021.points());
        let series = TimeSeries::from_points(points).unwrap();

        // Pooled January mean: (2*2 + 6*6) / 8 = 5
        assert!((mean_of_monthly_means(&series).unwrap() - 5.0).abs() < TOL);
    }

    #[test]
    fn test_empty_series() {
        let series = daily_series(date(2020, 1, 1), &[f64::NAN; 3]);
        assert!(matches!(
            mean_of_monthly_means(&series),
            Err(CorrelError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_lt_ref_speed_with_text_dates() {
        let mut values = vec![5.0; 31];
        values.extend([9.0; 29]);
        let series = daily_series(date(2020, 1, 1), &values);

        let all = calc_lt_ref_speed(&series, None, None).unwrap();
        assert!((all - 7.0).abs() < TOL);

        let january = calc_lt_ref_speed(
            &series,
            Some("2020-01-01T00:00:00".into()),
            Some("2020-01-31 extra text".into()),
        )
        .unwrap();
        assert!((january - 5.0).abs() < TOL);
    }

    #[test]
    fn test_lt_ref_speed_with_dates() {
        let series = daily_series(date(2020, 1, 1), &[3.0; 40]);
        let lt = calc_lt_ref_speed(&series, Some(date(2020, 1, 5).into()), Some(date(2020, 2, 2).into())).unwrap();
        assert!((lt - 3.0).abs() < TOL);
    }

    #[test]
    fn test_lt_ref_speed_empty_range() {
        let series = daily_series(date(2020, 1, 1), &[3.0; 10]);
        let err = calc_lt_ref_speed(&series, Some("2021-01-01".into()), Some("2021-02-01".into())).unwrap_err();
        assert!(matches!(err, CorrelError::InsufficientData(_)));

        let err = calc_lt_ref_speed(&series, Some("01/01/2020".into()), None).unwrap_err();
        assert!(matches!(err, CorrelError::Parse(_)));
    }
}
