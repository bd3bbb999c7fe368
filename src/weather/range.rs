//! Temperature retrieval for arbitrary date ranges
//!
//! A requested range may reach into the past, the present and the future.
//! The archive source only serves days up to yesterday and the forecast
//! source only serves today onwards, so the range is split into at most two
//! contiguous segments, each fetched from its own source, and the results are
//! merged back into one chronological series.

use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use super::WeatherProvider;
use crate::dates::{Clock, add_days};
use crate::models::{DailyTemperatureSample, DateInterval, ResolvedLocation};
use crate::{Result, WeatherError};

/// Which upstream source serves a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentSource {
    Archive,
    Forecast,
}

/// A contiguous slice of the requested range routed to one source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub source: SegmentSource,
    pub interval: DateInterval,
}

/// Split `interval` around `today`.
///
/// The archive segment is `[start, min(end, yesterday)]` and only exists when
/// `start <= yesterday`; the forecast segment is `[max(start, today), end]`
/// and only exists when `end >= today`. Together they cover every requested
/// day exactly once.
#[must_use]
pub fn plan_segments(interval: &DateInterval, today: NaiveDate) -> Vec<Segment> {
    let yesterday = add_days(today, -1);
    let mut segments = Vec::with_capacity(2);

    if interval.start <= yesterday {
        segments.push(Segment {
            source: SegmentSource::Archive,
            interval: DateInterval {
                start: interval.start,
                end: interval.end.min(yesterday),
            },
        });
    }

    if interval.end >= today {
        segments.push(Segment {
            source: SegmentSource::Forecast,
            interval: DateInterval {
                start: interval.start.max(today),
                end: interval.end,
            },
        });
    }

    segments
}

/// Fetches a chronological temperature series for any date range
pub struct TemperatureRangeFetcher;

impl TemperatureRangeFetcher {
    /// Fetch daily temperatures for `interval` at `location`.
    ///
    /// Segments are fetched one after the other; the first failure aborts the
    /// whole fetch. An empty merged series is an upstream error.
    #[instrument(skip(provider, clock, location), fields(location = %location.name))]
    pub async fn fetch(
        provider: &dyn WeatherProvider,
        clock: &dyn Clock,
        location: &ResolvedLocation,
        interval: DateInterval,
    ) -> Result<Vec<DailyTemperatureSample>> {
        let start_time = Instant::now();
        let segments = plan_segments(&interval, clock.today());
        debug!("Planned segments: {:?}", segments);

        let mut collected = Vec::new();
        for segment in segments {
            let entries = match segment.source {
                SegmentSource::Archive => {
                    provider
                        .archive_daily(location.latitude, location.longitude, segment.interval)
                        .await?
                }
                SegmentSource::Forecast => {
                    provider
                        .forecast_daily(location.latitude, location.longitude, segment.interval)
                        .await?
                }
            };
            debug!("{:?} segment returned {} days", segment.source, entries.len());
            collected.extend(entries);
        }

        // Segments are fetched independently, so order is restored here
        collected.sort_by_key(|sample| sample.date);

        if collected.is_empty() {
            return Err(WeatherError::upstream(
                "No weather data returned for this date range. Try a nearby range or smaller window.",
            ));
        }

        info!(
            "Fetched {} days for {}..{} in {:.3}s",
            collected.len(),
            interval.start,
            interval.end,
            start_time.elapsed().as_secs_f64()
        );
        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::{FixedClock, days_inclusive, parse_date};
    use crate::weather::CurrentReport;
    use async_trait::async_trait;
    use rstest::rstest;
    use std::sync::Mutex;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn interval(start: &str, end: &str) -> DateInterval {
        DateInterval::parse(start, end).unwrap()
    }

    fn location() -> ResolvedLocation {
        ResolvedLocation::new("nyc".into(), "New York".into(), 40.7128, -74.006)
    }

    /// Returns one sample per requested day, in reverse order, and records calls
    #[derive(Default)]
    struct FakeProvider {
        calls: Mutex<Vec<(SegmentSource, DateInterval)>>,
        archive_empty: bool,
        forecast_empty: bool,
        fail_forecast: bool,
    }

    impl FakeProvider {
        fn days(interval: DateInterval, base: f64) -> Vec<DailyTemperatureSample> {
            let mut out = Vec::new();
            let mut day = interval.start;
            while day <= interval.end {
                out.push(DailyTemperatureSample {
                    date: day,
                    min_c: Some(base),
                    max_c: Some(base + 10.0),
                });
                day = add_days(day, 1);
            }
            out.reverse();
            out
        }

        fn calls(&self) -> Vec<(SegmentSource, DateInterval)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn archive_daily(
            &self,
            _latitude: f64,
            _longitude: f64,
            interval: DateInterval,
        ) -> Result<Vec<DailyTemperatureSample>> {
            self.calls.lock().unwrap().push((SegmentSource::Archive, interval));
            if self.archive_empty {
                return Ok(Vec::new());
            }
            Ok(Self::days(interval, 1.0))
        }

        async fn forecast_daily(
            &self,
            _latitude: f64,
            _longitude: f64,
            interval: DateInterval,
        ) -> Result<Vec<DailyTemperatureSample>> {
            self.calls.lock().unwrap().push((SegmentSource::Forecast, interval));
            if self.fail_forecast {
                return Err(WeatherError::upstream_status(500, "boom"));
            }
            if self.forecast_empty {
                return Ok(Vec::new());
            }
            Ok(Self::days(interval, 5.0))
        }

        async fn current(&self, _latitude: f64, _longitude: f64, _days: u8) -> Result<CurrentReport> {
            unreachable!("range fetch never asks for current conditions")
        }
    }

    #[test]
    fn test_straddling_interval_splits_at_today() {
        let segments = plan_segments(&interval("2024-06-10", "2024-06-20"), d("2024-06-15"));
        assert_eq!(
            segments,
            vec![
                Segment {
                    source: SegmentSource::Archive,
                    interval: interval("2024-06-10", "2024-06-14"),
                },
                Segment {
                    source: SegmentSource::Forecast,
                    interval: interval("2024-06-15", "2024-06-20"),
                },
            ]
        );
    }

    #[test]
    fn test_fully_past_interval_is_archive_only() {
        let segments = plan_segments(&interval("2024-01-01", "2024-01-05"), d("2024-06-15"));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].source, SegmentSource::Archive);
        assert_eq!(segments[0].interval, interval("2024-01-01", "2024-01-05"));
    }

    #[test]
    fn test_fully_future_interval_is_forecast_only() {
        let segments = plan_segments(&interval("2024-06-18", "2024-06-25"), d("2024-06-15"));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].source, SegmentSource::Forecast);
        assert_eq!(segments[0].interval, interval("2024-06-18", "2024-06-25"));
    }

    #[rstest]
    #[case("2024-06-14", "2024-06-14", vec![SegmentSource::Archive])]
    #[case("2024-06-15", "2024-06-15", vec![SegmentSource::Forecast])]
    #[case("2024-06-14", "2024-06-15", vec![SegmentSource::Archive, SegmentSource::Forecast])]
    #[case("2024-06-01", "2024-06-14", vec![SegmentSource::Archive])]
    fn test_boundary_days(
        #[case] start: &str,
        #[case] end: &str,
        #[case] expected: Vec<SegmentSource>,
    ) {
        let sources: Vec<_> = plan_segments(&interval(start, end), d("2024-06-15"))
            .into_iter()
            .map(|s| s.source)
            .collect();
        assert_eq!(sources, expected);
    }

    #[rstest]
    #[case("2024-05-20", "2024-06-20")]
    #[case("2024-06-14", "2024-06-16")]
    #[case("2024-01-01", "2024-01-31")]
    #[case("2024-07-01", "2024-07-31")]
    fn test_segments_cover_every_day_once(#[case] start: &str, #[case] end: &str) {
        let requested = interval(start, end);
        let segments = plan_segments(&requested, d("2024-06-15"));

        let covered: i64 = segments
            .iter()
            .map(|s| days_inclusive(s.interval.start, s.interval.end))
            .sum();
        assert_eq!(covered, requested.day_count());

        assert_eq!(segments.first().unwrap().interval.start, requested.start);
        assert_eq!(segments.last().unwrap().interval.end, requested.end);
        if let [first, second] = segments.as_slice() {
            assert_eq!(add_days(first.interval.end, 1), second.interval.start);
        }
    }

    #[tokio::test]
    async fn test_fetch_straddling_merges_sorted() {
        let provider = FakeProvider::default();
        let clock = FixedClock::on_date(d("2024-06-15"));

        let samples = TemperatureRangeFetcher::fetch(
            &provider,
            &clock,
            &location(),
            interval("2024-06-10", "2024-06-20"),
        )
        .await
        .unwrap();

        assert_eq!(samples.len(), 11);
        assert!(samples.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(samples[0].date, d("2024-06-10"));
        assert_eq!(samples[4].min_c, Some(1.0));
        assert_eq!(samples[5].min_c, Some(5.0));
        assert_eq!(provider.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_past_range_skips_forecast_call() {
        let provider = FakeProvider::default();
        let clock = FixedClock::on_date(d("2024-06-15"));

        TemperatureRangeFetcher::fetch(
            &provider,
            &clock,
            &location(),
            interval("2024-01-01", "2024-01-05"),
        )
        .await
        .unwrap();

        assert_eq!(
            provider.calls(),
            vec![(SegmentSource::Archive, interval("2024-01-01", "2024-01-05"))]
        );
    }

    #[tokio::test]
    async fn test_fetch_future_range_skips_archive_call() {
        let provider = FakeProvider::default();
        let clock = FixedClock::on_date(d("2024-06-15"));

        TemperatureRangeFetcher::fetch(
            &provider,
            &clock,
            &location(),
            interval("2024-06-16", "2024-06-18"),
        )
        .await
        .unwrap();

        assert_eq!(
            provider.calls(),
            vec![(SegmentSource::Forecast, interval("2024-06-16", "2024-06-18"))]
        );
    }

    #[tokio::test]
    async fn test_fetch_empty_result_is_upstream_error() {
        let provider = FakeProvider {
            archive_empty: true,
            forecast_empty: true,
            ..FakeProvider::default()
        };
        let clock = FixedClock::on_date(d("2024-06-15"));

        let err = TemperatureRangeFetcher::fetch(
            &provider,
            &clock,
            &location(),
            interval("2024-06-10", "2024-06-20"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WeatherError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_fetch_segment_failure_aborts() {
        let provider = FakeProvider {
            fail_forecast: true,
            ..FakeProvider::default()
        };
        let clock = FixedClock::on_date(d("2024-06-15"));

        let err = TemperatureRangeFetcher::fetch(
            &provider,
            &clock,
            &location(),
            interval("2024-06-10", "2024-06-20"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WeatherError::Upstream { status: Some(500), .. }));
    }
}
