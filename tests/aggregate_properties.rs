use bike_demand::analyzers::aggregate::aggregate_daily;
use bike_demand::records::HourlyRecord;
use bike_demand::store::HourlyStore;
use chrono::{Days, NaiveDate};
use proptest::prelude::*;

fn arb_record() -> impl Strategy<Value = HourlyRecord> {
    (
        0u64..60,
        0u8..24,
        0u32..4000,
        -20.0f64..38.0,
        prop_oneof![Just("Yes"), Just("No")],
        prop_oneof![Just("Winter"), Just("Spring"), Just("Summer"), Just("Autumn")],
    )
        .prop_map(|(offset, hour, rides, temp, functioning, season)| HourlyRecord {
            date: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap() + Days::new(offset),
            hour,
            rented_bike_count: rides,
            temperature_c: temp,
            humidity_pct: 50.0,
            windspeed_ms: 1.0,
            visibility_10m: 2000.0,
            dew_point_c: 0.0,
            solar_radiation_mj_m2: 0.0,
            rainfall_mm: 0.0,
            snowfall_cm: 0.0,
            seasons: season.to_string(),
            holiday: "No Holiday".to_string(),
            functioning_day: functioning.to_string(),
        })
}

fn store_of(records: Vec<HourlyRecord>) -> HourlyStore {
    let mut store = HourlyStore::in_memory();
    store.insert_ignore_conflicts(records);
    store
}

proptest! {
    #[test]
    fn prop_total_rides_conserved(records in prop::collection::vec(arb_record(), 0..300)) {
        let store = store_of(records);
        let hourly_sum: u64 = store.iter().map(|r| u64::from(r.rented_bike_count)).sum();
        let daily_sum: u64 = aggregate_daily(store.iter()).iter().map(|d| d.total_rides).sum();
        prop_assert_eq!(hourly_sum, daily_sum);
    }

    #[test]
    fn prop_aggregation_idempotent(records in prop::collection::vec(arb_record(), 1..300)) {
        let store = store_of(records);
        let first = aggregate_daily(store.iter());
        let second = aggregate_daily(store.iter());
        prop_assert_eq!(&first, &second);

        // Same bytes when serialized.
        let a = serde_json::to_string(&first).unwrap();
        let b = serde_json::to_string(&second).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_first_day_roll7_is_own_total(records in prop::collection::vec(arb_record(), 1..300)) {
        let store = store_of(records);
        let days = aggregate_daily(store.iter());
        let first = &days[0];
        prop_assert_eq!(first.roll7_total, Some(first.total_rides as f64));
        prop_assert_eq!(first.roll30_total, Some(first.total_rides as f64));
        prop_assert!(days.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn prop_functioning_all_yes_matches_hours(records in prop::collection::vec(arb_record(), 1..300)) {
        let store = store_of(records);
        for day in aggregate_daily(store.iter()) {
            let expected = store
                .iter()
                .filter(|r| r.date == day.date)
                .all(|r| r.functioning_day == "Yes");
            prop_assert_eq!(day.functioning_all_yes, expected);
        }
    }
}
