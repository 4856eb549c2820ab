//! Hourly resampling of processed forecasts.

use crate::types::forecast_record::{ForecastRecord, ForecastVariable};
use chrono::{DateTime, Duration, DurationRound, Utc};

/// Resamples `records` onto an hourly grid.
///
/// The grid runs from the first timestamp (floored to the hour) through the last
/// one. Values are only taken from records that fall exactly on the grid; gaps
/// between two known values are filled by linear interpolation, gaps after the
/// last known value repeat it, and gaps before the first known value stay empty.
/// The final grid row is dropped, since it belongs to the start of the next window.
pub fn resample_hourly(records: &[ForecastRecord]) -> Vec<ForecastRecord> {
    let mut sorted: Vec<&ForecastRecord> = records.iter().collect();
    sorted.sort_by_key(|record| record.time);

    let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    let start = floor_to_hour(first.time);
    let hours = (last.time - start).num_hours();

    let mut grid: Vec<ForecastRecord> = (0..=hours)
        .map(|h| ForecastRecord::empty(start + Duration::hours(h)))
        .collect();

    for record in &sorted {
        if record.time != floor_to_hour(record.time) {
            continue;
        }
        let slot = (record.time - start).num_hours() as usize;
        for variable in ForecastVariable::ALL {
            // Duplicate timestamps: the first record carrying a value wins.
            if grid[slot].get(variable).is_none() {
                grid[slot].set(variable, record.get(variable));
            }
        }
    }

    for variable in ForecastVariable::ALL {
        let mut column: Vec<Option<f64>> = grid.iter().map(|r| r.get(variable)).collect();
        interpolate_linear(&mut column);
        for (record, value) in grid.iter_mut().zip(column) {
            record.set(variable, value);
        }
    }

    grid.pop();
    grid
}

fn floor_to_hour(time: DateTime<Utc>) -> DateTime<Utc> {
    time.duration_trunc(Duration::hours(1)).unwrap_or(time)
}

/// Fills `None` gaps in an evenly spaced series in place: linear between known
/// neighbours, forward-filled after the last known value, untouched before the first.
pub fn interpolate_linear(values: &mut [Option<f64>]) {
    let mut previous: Option<(usize, f64)> = None;
    for i in 0..values.len() {
        let Some(current) = values[i] else { continue };
        if let Some((p, prev)) = previous {
            let span = (i - p) as f64;
            for (k, slot) in values.iter_mut().enumerate().take(i).skip(p + 1) {
                let fraction = (k - p) as f64 / span;
                *slot = Some(prev + (current - prev) * fraction);
            }
        }
        previous = Some((i, current));
    }
    if let Some((p, last)) = previous {
        for slot in values.iter_mut().skip(p + 1) {
            *slot = Some(last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap() + Duration::hours(hour)
    }

    #[test]
    fn test_interpolate_linear() {
        let mut values = vec![None, Some(0.0), None, None, Some(3.0), None, None];
        interpolate_linear(&mut values);
        assert_eq!(
            values,
            vec![None, Some(0.0), Some(1.0), Some(2.0), Some(3.0), Some(3.0), Some(3.0)]
        );

        let mut empty: Vec<Option<f64>> = vec![None, None];
        interpolate_linear(&mut empty);
        assert_eq!(empty, vec![None, None]);
    }

    #[test]
    fn test_three_hourly_day_becomes_24_hourly_rows() {
        // GFS-like: 00, 03, ..., 24 inclusive.
        let records: Vec<ForecastRecord> = (0..=8)
            .map(|i| {
                ForecastRecord::empty(at(i * 3)).with(ForecastVariable::TempAir, (i * 3) as f64)
            })
            .collect();

        let hourly = resample_hourly(&records);
        assert_eq!(hourly.len(), 24);
        assert_eq!(hourly[0].time, at(0));
        assert_eq!(hourly[23].time, at(23));
        for (h, record) in hourly.iter().enumerate() {
            let temp = record.get(ForecastVariable::TempAir).unwrap();
            assert!((temp - h as f64).abs() < 1e-9, "hour {h}: {temp}");
        }
    }

    #[test]
    fn test_unsorted_input_and_off_grid_times() {
        let records = vec![
            ForecastRecord::empty(at(2)).with(ForecastVariable::Ghi, 200.0),
            ForecastRecord::empty(at(0)).with(ForecastVariable::Ghi, 0.0),
            ForecastRecord::empty(at(1) + Duration::minutes(30)).with(ForecastVariable::Ghi, 999.0),
            ForecastRecord::empty(at(3)).with(ForecastVariable::Ghi, 300.0),
        ];
        let hourly = resample_hourly(&records);
        let ghi: Vec<Option<f64>> = hourly
            .iter()
            .map(|r| r.get(ForecastVariable::Ghi))
            .collect();
        assert_eq!(ghi, vec![Some(0.0), Some(100.0), Some(200.0)]);
    }

    #[test]
    fn test_variables_are_interpolated_independently() {
        let records = vec![
            ForecastRecord::empty(at(0))
                .with(ForecastVariable::TempAir, 10.0)
                .with(ForecastVariable::WindSpeed, 1.0),
            ForecastRecord::empty(at(2)).with(ForecastVariable::TempAir, 12.0),
            ForecastRecord::empty(at(4))
                .with(ForecastVariable::TempAir, 14.0)
                .with(ForecastVariable::WindSpeed, 5.0),
        ];
        let hourly = resample_hourly(&records);
        assert_eq!(hourly.len(), 4);
        assert_eq!(hourly[1].get(ForecastVariable::TempAir), Some(11.0));
        assert_eq!(hourly[2].get(ForecastVariable::WindSpeed), Some(3.0));
        assert_eq!(hourly[3].get(ForecastVariable::LowClouds), None);
    }

    #[test]
    fn test_empty_and_single_record() {
        assert!(resample_hourly(&[]).is_empty());
        let single = vec![ForecastRecord::empty(at(5)).with(ForecastVariable::TempAir, 1.0)];
        assert!(resample_hourly(&single).is_empty());
    }
}
