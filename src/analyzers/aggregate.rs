use crate::analyzers::utility::{finite_or_zero, mean, mode, rolling_mean};
use crate::records::{DailyAggregate, HourlyRecord};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Trailing window sizes, in dates present in the daily sequence.
pub const ROLL_SHORT: usize = 7;
pub const ROLL_LONG: usize = 30;

/// Hourly values collected for one date before reduction.
#[derive(Default)]
struct DayBucket<'a> {
    rides: u64,
    temperature: Vec<f64>,
    humidity: Vec<f64>,
    windspeed: Vec<f64>,
    seasons: Vec<&'a str>,
    holiday_any: bool,
    functioning_all_yes: bool,
    hours: usize,
}

impl<'a> DayBucket<'a> {
    fn push(&mut self, record: &'a HourlyRecord) {
        if self.hours == 0 {
            self.functioning_all_yes = true;
        }
        self.hours += 1;
        self.rides += u64::from(record.rented_bike_count);
        self.temperature.push(record.temperature_c);
        self.humidity.push(record.humidity_pct);
        self.windspeed.push(record.windspeed_ms);
        self.seasons.push(&record.seasons);
        self.holiday_any |= record.is_holiday();
        self.functioning_all_yes &= record.is_functioning();
    }

    fn finish(self, date: NaiveDate) -> DailyAggregate {
        DailyAggregate {
            date,
            total_rides: self.rides,
            avg_temp_c: finite_or_zero(mean(&self.temperature)),
            avg_humidity_pct: finite_or_zero(mean(&self.humidity)),
            avg_windspeed_ms: finite_or_zero(mean(&self.windspeed)),
            roll7_total: None,
            roll30_total: None,
            seasons_mode: mode(self.seasons.iter().copied()),
            holiday_any: self.holiday_any,
            functioning_all_yes: self.functioning_all_yes,
        }
    }
}

/// Rolls hourly records up into one [`DailyAggregate`] per date.
///
/// Input order does not matter for the sums and means; the seasons mode
/// breaks ties by the order records are encountered. The output is sorted by
/// date ascending and carries trailing 7/30 date rolling means of
/// `total_rides` with a minimum of one period.
pub fn aggregate_daily<'a, I>(records: I) -> Vec<DailyAggregate>
where
    I: IntoIterator<Item = &'a HourlyRecord>,
{
    let mut buckets: BTreeMap<NaiveDate, DayBucket<'a>> = BTreeMap::new();
    for record in records {
        buckets.entry(record.date).or_default().push(record);
    }

    let mut days: Vec<DailyAggregate> = buckets
        .into_iter()
        .map(|(date, bucket)| bucket.finish(date))
        .collect();

    let totals: Vec<f64> = days.iter().map(|d| d.total_rides as f64).collect();
    let roll7 = rolling_mean(&totals, ROLL_SHORT);
    let roll30 = rolling_mean(&totals, ROLL_LONG);

    for ((day, short), long) in days.iter_mut().zip(roll7).zip(roll30) {
        day.roll7_total = short.is_finite().then_some(short);
        day.roll30_total = long.is_finite().then_some(long);
    }

    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: (i32, u32, u32), hour: u8, rides: u32, temp: f64) -> HourlyRecord {
        HourlyRecord {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            hour,
            rented_bike_count: rides,
            temperature_c: temp,
            humidity_pct: 50.0,
            windspeed_ms: 1.0,
            visibility_10m: 2000.0,
            dew_point_c: -1.0,
            solar_radiation_mj_m2: 0.0,
            rainfall_mm: 0.0,
            snowfall_cm: 0.0,
            seasons: "Winter".to_string(),
            holiday: "No Holiday".to_string(),
            functioning_day: "Yes".to_string(),
        }
    }

    #[test]
    fn test_three_hours_one_day() {
        let rows = vec![
            record((2018, 1, 1), 0, 10, 1.0),
            record((2018, 1, 1), 1, 20, 2.0),
            record((2018, 1, 1), 2, 30, 3.0),
        ];

        let days = aggregate_daily(&rows);

        assert_eq!(days.len(), 1);
        let day = &days[0];
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
        assert_eq!(day.total_rides, 60);
        assert_eq!(day.avg_temp_c, 2.0);
        assert_eq!(day.roll7_total, Some(60.0));
        assert_eq!(day.roll30_total, Some(60.0));
        assert_eq!(day.seasons_mode, "Winter");
        // "No Holiday" still contains "holiday"
        assert!(day.holiday_any);
        assert!(day.functioning_all_yes);
    }

    #[test]
    fn test_output_sorted_from_unordered_input() {
        let rows = vec![
            record((2018, 1, 3), 0, 5, 0.0),
            record((2018, 1, 1), 0, 1, 0.0),
            record((2018, 1, 2), 0, 3, 0.0),
        ];

        let days = aggregate_daily(&rows);
        let totals: Vec<u64> = days.iter().map(|d| d.total_rides).collect();
        assert_eq!(totals, vec![1, 3, 5]);
        assert_eq!(days[0].roll7_total, Some(1.0));
        assert_eq!(days[1].roll7_total, Some(2.0));
        assert_eq!(days[2].roll7_total, Some(3.0));
    }

    #[test]
    fn test_roll7_drops_oldest_day() {
        let rows: Vec<HourlyRecord> = (1..=8)
            .map(|d| record((2018, 1, d), 0, d * 10, 0.0))
            .collect();

        let days = aggregate_daily(&rows);
        // day 8 averages days 2..=8
        assert_eq!(days[7].roll7_total, Some(50.0));
        // the 30 day window still covers all eight
        assert_eq!(days[7].roll30_total, Some(45.0));
    }

    #[test]
    fn test_roll30_drops_oldest_day() {
        let rows: Vec<HourlyRecord> = (1..=31).map(|d| record((2018, 1, d), 0, d, 0.0)).collect();

        let days = aggregate_daily(&rows);
        assert_eq!(days.len(), 31);
        // day 30 still averages 1..=30
        assert_eq!(days[29].roll30_total, Some(15.5));
        // day 31 averages 2..=31
        assert_eq!(days[30].roll30_total, Some(16.5));
        assert_eq!(days[30].roll7_total, Some(28.0));
    }

    #[test]
    fn test_functioning_all_yes_single_no() {
        let mut rows: Vec<HourlyRecord> = (0..24).map(|h| record((2018, 4, 11), h, 1, 0.0)).collect();
        let days = aggregate_daily(&rows);
        assert!(days[0].functioning_all_yes);

        rows[13].functioning_day = "No".to_string();
        let days = aggregate_daily(&rows);
        assert!(!days[0].functioning_all_yes);
    }

    #[test]
    fn test_holiday_any() {
        let mut rows = vec![record((2018, 1, 1), 0, 1, 0.0), record((2018, 1, 1), 1, 1, 0.0)];
        for row in &mut rows {
            row.holiday = "Unknown".to_string();
        }
        assert!(!aggregate_daily(&rows)[0].holiday_any);

        rows[1].holiday = "Holiday".to_string();
        assert!(aggregate_daily(&rows)[0].holiday_any);

        rows[1].holiday = "No Holiday".to_string();
        assert!(aggregate_daily(&rows)[0].holiday_any);
    }

    #[test]
    fn test_seasons_mode_tie_uses_first_seen() {
        let mut rows = vec![
            record((2018, 3, 1), 0, 1, 0.0),
            record((2018, 3, 1), 1, 1, 0.0),
            record((2018, 3, 1), 2, 1, 0.0),
        ];
        rows[0].seasons = "Spring".to_string();
        rows[1].seasons = "Winter".to_string();
        rows[2].seasons = "Spring".to_string();
        assert_eq!(aggregate_daily(&rows)[0].seasons_mode, "Spring");

        rows[2].seasons = "Autumn".to_string();
        assert_eq!(aggregate_daily(&rows)[0].seasons_mode, "Spring");
    }

    #[test]
    fn test_non_finite_means_written_as_zero() {
        let mut rows = vec![record((2018, 1, 1), 0, 1, f64::NAN)];
        rows[0].humidity_pct = f64::INFINITY;

        let day = &aggregate_daily(&rows)[0];
        assert_eq!(day.avg_temp_c, 0.0);
        assert_eq!(day.avg_humidity_pct, 0.0);
    }

    #[test]
    fn test_empty_input() {
        let rows: Vec<HourlyRecord> = Vec::new();
        assert!(aggregate_daily(&rows).is_empty());
    }
}
