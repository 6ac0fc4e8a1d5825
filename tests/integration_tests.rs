use bike_demand::Error;
use bike_demand::analyzers::analyzer::build_daily_aggregates;
use bike_demand::analyzers::types::BuildStatus;
use bike_demand::features::{DayLabels, FEATURE_NAMES, HourInput, Weather};
use bike_demand::infra::model::{FsModelSource, LinearModel};
use bike_demand::parser::ingest;
use bike_demand::services::PredictionService;
use bike_demand::store::{self, DailyStore, HourlyStore};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;

const EXPORT: &str = "\
Date,Rented Bike Count,Hour,Temperature(°C),Humidity(%),Wind speed (m/s),Visibility (10m),Dew point temperature(°C),Solar Radiation (MJ/m2),Rainfall(mm),Snowfall (cm),Seasons,Holiday,Functioning Day
01/12/2017,254,0,-5.2,37,2.2,2000,-17.6,0,0,0,Winter,No Holiday,Yes
01/12/2017,204,1,-5.5,38,0.8,2000,-17.6,0,0,0,Winter,No Holiday,Yes
01/12/2017,173,2,-6,39,1,2000,-17.7,0,0,0,Winter,No Holiday,Yes
02/12/2017,328,0,-1.8,87,1.1,994,-3.6,0,0,0,Winter,No Holiday,Yes
02/12/2017,308,1,-2.2,86,0.6,990,-4.1,0,0,0,Winter,No Holiday,Yes
03/12/2017,0,0,1.1,70,1.5,1900,-3.2,0,0,0,Winter,Holiday,No
not-a-date,99,0,1,1,1,1,1,0,0,0,Winter,No Holiday,Yes
";

fn write_model(dir: &Path) {
    let model = LinearModel {
        version: "v2-test".to_string(),
        features: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        intercept: 100.0,
        weights: HashMap::from([("hour".to_string(), 10.0)]),
        categories: HashMap::from([(
            "seasons".to_string(),
            HashMap::from([("Winter".to_string(), -50.0)]),
        )]),
    };
    std::fs::write(
        dir.join("model_v2.json"),
        serde_json::to_string_pretty(&model).expect("serialize model"),
    )
    .expect("write model");
}

fn winter_labels() -> DayLabels {
    DayLabels {
        seasons: "Winter".to_string(),
        holiday: "No Holiday".to_string(),
        functioning_day: "Yes".to_string(),
    }
}

#[test]
fn test_full_pipeline() {
    let data = tempfile::tempdir().expect("data dir");
    let models = tempfile::tempdir().expect("models dir");

    // Ingest, persist and reopen the hourly store.
    let mut hourly = HourlyStore::open(store::hourly_path(data.path())).expect("open hourly");
    let report = ingest(&mut hourly, EXPORT.as_bytes()).expect("ingest");
    assert_eq!(report.rows_read, 7);
    assert_eq!(report.rows_dropped, 1);
    assert_eq!(report.inserted, 6);
    hourly.save().expect("save hourly");

    let again = ingest(&mut hourly, EXPORT.as_bytes()).expect("re-ingest");
    assert_eq!(again.inserted, 0);
    assert_eq!(again.duplicates, 6);

    let hourly = HourlyStore::open(store::hourly_path(data.path())).expect("reopen hourly");
    assert_eq!(hourly.len(), 6);

    // Aggregate into the daily store and check it survives a reopen.
    let mut daily = DailyStore::open(store::daily_path(data.path())).expect("open daily");
    let status = build_daily_aggregates(&hourly, &mut daily).expect("build daily");
    assert_eq!(status, BuildStatus::Built { days: 3 });

    let daily = DailyStore::open(store::daily_path(data.path())).expect("reopen daily");
    let first = daily
        .get(NaiveDate::from_ymd_opt(2017, 12, 1).unwrap())
        .expect("first day");
    assert_eq!(first.total_rides, 631);
    assert_eq!(first.roll7_total, Some(631.0));

    let third = daily
        .get(NaiveDate::from_ymd_opt(2017, 12, 3).unwrap())
        .expect("third day");
    assert!(third.holiday_any);
    assert!(!third.functioning_all_yes);
    assert_eq!(third.roll7_total, Some((631.0 + 636.0) / 3.0));

    // Predict through the on-disk model.
    write_model(models.path());
    let predictor = PredictionService::new(FsModelSource::new(models.path()));

    let hour = predictor
        .predict_hour(&HourInput {
            date: NaiveDate::from_ymd_opt(2018, 1, 15).unwrap(),
            hour: 8,
            weather: Weather::default(),
            labels: winter_labels(),
        })
        .expect("predict hour");
    assert_eq!(hour.predicted_rented_bike_count, 130.0);

    let date = NaiveDate::from_ymd_opt(2018, 1, 20).unwrap();
    let day = predictor
        .predict_day(&hourly, date, winter_labels())
        .expect("predict day");
    assert_eq!(day.pred.len(), 24);
    assert_eq!(day.pred[0], 50.0);
    assert_eq!(day.pred[23], 280.0);

    let summer = DayLabels {
        seasons: "Summer".to_string(),
        ..winter_labels()
    };
    assert!(matches!(
        predictor.predict_day(&hourly, date, summer),
        Err(Error::NoData(_))
    ));
}

#[test]
fn test_build_daily_on_empty_store_keeps_existing_aggregates() {
    let data = tempfile::tempdir().expect("data dir");
    let hourly = HourlyStore::open(store::hourly_path(data.path())).expect("open hourly");
    let mut daily = DailyStore::open(store::daily_path(data.path())).expect("open daily");

    let status = build_daily_aggregates(&hourly, &mut daily).expect("build daily");
    assert_eq!(status, BuildStatus::NothingToDo);
    assert!(!store::daily_path(data.path()).exists());
}

#[test]
fn test_prediction_without_artifact() {
    let models = tempfile::tempdir().expect("models dir");
    let predictor = PredictionService::new(FsModelSource::new(models.path()));
    let result = predictor.predict_hour(&HourInput {
        date: NaiveDate::from_ymd_opt(2018, 1, 15).unwrap(),
        hour: 0,
        weather: Weather::default(),
        labels: winter_labels(),
    });
    assert!(matches!(result, Err(Error::ModelNotFound { .. })));

    // A model dropped in later is picked up.
    write_model(models.path());
    assert!(predictor.model().is_ok());
}
