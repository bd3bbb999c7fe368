//! Reduce a temperature series to its extremes

use chrono::{DateTime, Utc};

use crate::models::{DailyTemperatureSample, TemperatureSummary};

pub struct SummaryBuilder;

impl SummaryBuilder {
    /// Overall min/max ignore absent or non-finite values independently;
    /// `day_count` counts every sample.
    #[must_use]
    pub fn summarize(
        samples: Vec<DailyTemperatureSample>,
        generated_at: DateTime<Utc>,
    ) -> TemperatureSummary {
        let overall_min_c = samples
            .iter()
            .filter_map(|s| s.min_c)
            .filter(|v| v.is_finite())
            .reduce(f64::min);
        let overall_max_c = samples
            .iter()
            .filter_map(|s| s.max_c)
            .filter(|v| v.is_finite())
            .reduce(f64::max);

        TemperatureSummary {
            overall_min_c,
            overall_max_c,
            day_count: samples.len(),
            unit: "C".to_string(),
            generated_at,
            daily: samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::{add_days, parse_date};

    fn sample(offset: i64, min_c: Option<f64>, max_c: Option<f64>) -> DailyTemperatureSample {
        DailyTemperatureSample {
            date: add_days(parse_date("2024-01-01").unwrap(), offset),
            min_c,
            max_c,
        }
    }

    #[test]
    fn test_empty_series() {
        let summary = SummaryBuilder::summarize(Vec::new(), Utc::now());
        assert_eq!(summary.overall_min_c, None);
        assert_eq!(summary.overall_max_c, None);
        assert_eq!(summary.day_count, 0);
        assert_eq!(summary.unit, "C");
    }

    #[test]
    fn test_non_finite_values_are_ignored() {
        let summary = SummaryBuilder::summarize(
            vec![
                sample(0, Some(5.0), Some(10.0)),
                sample(1, Some(f64::NAN), Some(15.0)),
            ],
            Utc::now(),
        );
        assert_eq!(summary.overall_min_c, Some(5.0));
        assert_eq!(summary.overall_max_c, Some(15.0));
        assert_eq!(summary.day_count, 2);
    }

    #[test]
    fn test_missing_values_counted_but_not_reduced() {
        let summary = SummaryBuilder::summarize(
            vec![
                sample(0, None, Some(3.0)),
                sample(1, Some(-4.5), None),
                sample(2, None, None),
            ],
            Utc::now(),
        );
        assert_eq!(summary.overall_min_c, Some(-4.5));
        assert_eq!(summary.overall_max_c, Some(3.0));
        assert_eq!(summary.day_count, 3);
        assert_eq!(summary.daily.len(), 3);
    }

    #[test]
    fn test_only_absent_values_yield_none() {
        let summary = SummaryBuilder::summarize(
            vec![sample(0, None, Some(f64::INFINITY))],
            Utc::now(),
        );
        assert_eq!(summary.overall_min_c, None);
        assert_eq!(summary.overall_max_c, None);
        assert_eq!(summary.day_count, 1);
    }

    #[test]
    fn test_generated_at_is_computation_time() {
        let at = parse_date("2030-01-01")
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
            .and_utc();
        let summary = SummaryBuilder::summarize(vec![sample(0, Some(1.0), Some(2.0))], at);
        assert_eq!(summary.generated_at, at);
    }
}
