//! Validated daily rainfall forecast for the planning horizon.
//!
//! Every day has a date and a non-negative, finite rainfall amount. Dates
//! must be strictly increasing so the series reads as one ordered window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// One forecast day.
///
/// Deserializes from the forecaster's `predicted_rainfall_mm` column as well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRainfall {
    pub date: NaiveDate,
    #[serde(alias = "predicted_rainfall_mm")]
    pub rainfall_mm: f64,
}

impl DailyRainfall {
    pub fn new(date: NaiveDate, rainfall_mm: f64) -> Self {
        Self { date, rainfall_mm }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainfallSeries {
    days: Vec<DailyRainfall>,
}

impl RainfallSeries {
    /// Create a new series with validation.
    ///
    /// Validates:
    /// - the series is non-empty
    /// - no NaN, infinite or negative rainfall
    /// - dates strictly increase
    pub fn new(days: Vec<DailyRainfall>) -> Result<Self, PlanError> {
        if days.is_empty() {
            return Err(PlanError::invalid("rainfall series is empty"));
        }
        for (i, day) in days.iter().enumerate() {
            if !day.rainfall_mm.is_finite() || day.rainfall_mm < 0.0 {
                return Err(PlanError::invalid(format!(
                    "rainfall on {} is {} mm; expected a finite value >= 0",
                    day.date, day.rainfall_mm
                )));
            }
            if i > 0 && day.date <= days[i - 1].date {
                return Err(PlanError::invalid(format!(
                    "rainfall dates must increase: {} follows {}",
                    day.date,
                    days[i - 1].date
                )));
            }
        }
        Ok(Self { days })
    }

    /// Consecutive days starting at `start`, one per rainfall value.
    pub fn from_amounts(start: NaiveDate, amounts: &[f64]) -> Result<Self, PlanError> {
        let days = start
            .iter_days()
            .zip(amounts)
            .map(|(date, &mm)| DailyRainfall::new(date, mm))
            .collect();
        Self::new(days)
    }

    pub fn days(&self) -> &[DailyRainfall] {
        &self.days
    }

    pub fn rainfall(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.days.iter().map(|d| d.rainfall_mm)
    }

    /// Number of forecast days.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Always `false` for a validated series.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl<'de> Deserialize<'de> for RainfallSeries {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let days = Vec::<DailyRainfall>::deserialize(deserializer)?;
        RainfallSeries::new(days).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32, mm: f64) -> DailyRainfall {
        DailyRainfall::new(NaiveDate::from_ymd_opt(2025, 6, d).unwrap(), mm)
    }

    #[test]
    fn valid_series() {
        let s = RainfallSeries::new(vec![day(1, 0.0), day(2, 12.5), day(3, 3.2)]).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.rainfall().collect::<Vec<_>>(), vec![0.0, 12.5, 3.2]);
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            RainfallSeries::new(vec![]),
            Err(PlanError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_negative_and_nan() {
        assert!(RainfallSeries::new(vec![day(1, -0.1)]).is_err());
        assert!(RainfallSeries::new(vec![day(1, f64::NAN)]).is_err());
        assert!(RainfallSeries::new(vec![day(1, f64::INFINITY)]).is_err());
    }

    #[test]
    fn rejects_unordered_dates() {
        assert!(RainfallSeries::new(vec![day(2, 1.0), day(1, 1.0)]).is_err());
        assert!(RainfallSeries::new(vec![day(2, 1.0), day(2, 1.0)]).is_err());
    }

    #[test]
    fn from_amounts_assigns_consecutive_dates() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let s = RainfallSeries::from_amounts(start, &[1.0, 2.0]).unwrap();
        assert_eq!(s.days()[1].date, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
    }

    #[test]
    fn deserializes_forecaster_column_name() {
        let json = r#"[{"date":"2025-06-01","predicted_rainfall_mm":4.5},
                       {"date":"2025-06-02","rainfall_mm":0.0}]"#;
        let s: RainfallSeries = serde_json::from_str(json).unwrap();
        assert_eq!(s.days()[0].rainfall_mm, 4.5);
        let bad = r#"[{"date":"2025-06-01","rainfall_mm":-1.0}]"#;
        assert!(serde_json::from_str::<RainfallSeries>(bad).is_err());
    }
}
