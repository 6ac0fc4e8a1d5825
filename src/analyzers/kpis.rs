use crate::analyzers::types::{BasicKpis, DateBounds, HourlyHeatmap};
use crate::analyzers::utility::{mean, round2};
use crate::records::HourlyRecord;
use crate::store::HourlyStore;
use chrono::Datelike;

pub const HEATMAP_WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Row count, ride total and rounded averages. Empty input gives zeros.
pub fn basic_kpis(rows: &[&HourlyRecord]) -> BasicKpis {
    let rides: Vec<f64> = rows.iter().map(|r| r.rented_bike_count as f64).collect();
    let temps: Vec<f64> = rows.iter().map(|r| r.temperature_c).collect();
    let humidity: Vec<f64> = rows.iter().map(|r| r.humidity_pct).collect();

    BasicKpis {
        rows: rows.len(),
        total_rides: rows.iter().map(|r| u64::from(r.rented_bike_count)).sum(),
        avg_temp_c: round2(mean(&temps)),
        avg_humidity_pct: round2(mean(&humidity)),
        avg_rides_per_hour: round2(mean(&rides)),
    }
}

/// 7×24 grid of mean rides, Sunday-first rows, 0.0 where no data exists.
pub fn hourly_heatmap(rows: &[&HourlyRecord]) -> HourlyHeatmap {
    let mut sums = [[0.0f64; 24]; 7];
    let mut counts = [[0usize; 24]; 7];

    for r in rows {
        let wd = r.date.weekday().num_days_from_sunday() as usize;
        let hr = usize::from(r.hour);
        if hr >= 24 {
            continue;
        }
        sums[wd][hr] += r.rented_bike_count as f64;
        counts[wd][hr] += 1;
    }

    let matrix = sums
        .iter()
        .zip(counts.iter())
        .map(|(s, c)| {
            s.iter()
                .zip(c.iter())
                .map(|(&sum, &n)| if n == 0 { 0.0 } else { round2(sum / n as f64) })
                .collect()
        })
        .collect();

    HourlyHeatmap {
        matrix,
        weekdays: HEATMAP_WEEKDAYS.to_vec(),
        hours: (0..24).collect(),
    }
}

pub fn date_bounds(store: &HourlyStore) -> DateBounds {
    match store.date_bounds() {
        Some((start, end)) => DateBounds {
            start: Some(start),
            end: Some(end),
        },
        None => DateBounds {
            start: None,
            end: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(date: NaiveDate, hour: u8, rides: u32, temp: f64) -> HourlyRecord {
        HourlyRecord {
            date,
            hour,
            rented_bike_count: rides,
            temperature_c: temp,
            humidity_pct: 40.0,
            windspeed_ms: 1.0,
            visibility_10m: 2000.0,
            dew_point_c: 0.0,
            solar_radiation_mj_m2: 0.0,
            rainfall_mm: 0.0,
            snowfall_cm: 0.0,
            seasons: "Winter".to_string(),
            holiday: "No Holiday".to_string(),
            functioning_day: "Yes".to_string(),
        }
    }

    #[test]
    fn test_basic_kpis_empty() {
        let kpis = basic_kpis(&[]);
        assert_eq!(kpis.rows, 0);
        assert_eq!(kpis.total_rides, 0);
        assert_eq!(kpis.avg_rides_per_hour, 0.0);
    }

    #[test]
    fn test_basic_kpis_rounds() {
        let date = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let rows = vec![
            record(date, 0, 10, 1.0),
            record(date, 1, 20, 1.5),
            record(date, 2, 11, 1.25),
        ];
        let refs: Vec<&HourlyRecord> = rows.iter().collect();

        let kpis = basic_kpis(&refs);
        assert_eq!(kpis.rows, 3);
        assert_eq!(kpis.total_rides, 41);
        assert_eq!(kpis.avg_temp_c, 1.25);
        assert_eq!(kpis.avg_rides_per_hour, 13.67);
    }

    #[test]
    fn test_heatmap_sunday_first() {
        // 2018-01-07 is a Sunday, 2018-01-08 a Monday
        let sunday = NaiveDate::from_ymd_opt(2018, 1, 7).unwrap();
        let monday = NaiveDate::from_ymd_opt(2018, 1, 8).unwrap();
        let rows = vec![
            record(sunday, 8, 100, 0.0),
            record(monday, 8, 300, 0.0),
            record(NaiveDate::from_ymd_opt(2018, 1, 15).unwrap(), 8, 100, 0.0),
        ];
        let refs: Vec<&HourlyRecord> = rows.iter().collect();

        let heatmap = hourly_heatmap(&refs);
        assert_eq!(heatmap.matrix.len(), 7);
        assert_eq!(heatmap.matrix[0].len(), 24);
        assert_eq!(heatmap.matrix[0][8], 100.0);
        assert_eq!(heatmap.matrix[1][8], 200.0);
        assert_eq!(heatmap.matrix[1][9], 0.0);
        assert_eq!(heatmap.weekdays[0], "Sun");
    }
}
