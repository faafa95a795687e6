use carbon_footprint_lib::core::{Config, DayCount, LampEntry, Section};
use carbon_footprint_lib::estimator::Estimator;
use std::path::PathBuf;

fn test_config(db: PathBuf) -> Config {
    let mut config = Config::default();
    config.data.directory = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data");
    config.storage.path = Some(db);
    config
}

#[tokio::test]
async fn test_bundled_data_scenarios() {
    let dir = tempfile::tempdir().unwrap();
    let mut estimator = Estimator::open(&test_config(dir.path().join("storage.db")))
        .await
        .unwrap();

    assert_eq!(estimator.total(), 0.0);

    let fan = estimator.set_appliance_hours("Ventilador", 2.0).unwrap();
    assert!((fan - 35.1).abs() < 1e-9);

    let car = estimator.set_commute("Auto", 5.0, 5.0).unwrap();
    assert!((car - 24.0).abs() < 1e-9);

    let index = estimator.add_lamp().unwrap();
    let lamp = estimator
        .update_lamp(index, LampEntry::new("Halógena", "50W", 10.0, 10.0))
        .unwrap();
    assert_eq!(lamp, 0.0);

    let subtotals = estimator.subtotals();
    let sum: f64 = Section::ALL.iter().map(|s| subtotals.get(*s)).sum();
    assert!((estimator.total() - sum).abs() < 1e-9);
    assert!((estimator.total() - 59.1).abs() < 1e-9);
}

#[tokio::test]
async fn test_inputs_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().join("storage.db"));

    let expected = {
        let mut estimator = Estimator::open(&config).await.unwrap();
        estimator.set_heating_hours("Estufa a gas", 5.0).unwrap();
        estimator.set_business_km("Avión", 1500.0).unwrap();
        estimator.set_food("carne", 2.0, Some(150.0)).unwrap();
        estimator.set_days(DayCount::Heating, 120.0).unwrap();
        estimator.clear_lamps().unwrap();
        (estimator.state().clone(), estimator.total())
    };

    let estimator = Estimator::open(&config).await.unwrap();
    assert_eq!(estimator.state(), &expected.0);
    assert!((estimator.total() - expected.1).abs() < 1e-9);
    assert_eq!(estimator.state().lamps.len(), 3);
}

#[tokio::test]
async fn test_reset_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().join("storage.db"));

    {
        let mut estimator = Estimator::open(&config).await.unwrap();
        estimator.set_appliance_hours("Heladera", 24.0).unwrap();
        estimator.reset().unwrap();
    }

    let estimator = Estimator::open(&config).await.unwrap();
    assert_eq!(estimator.total(), 0.0);
    assert!(estimator.state().hours.appliances.is_empty());
}

#[tokio::test]
async fn test_missing_data_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path().join("storage.db"));
    config.data.directory = dir.path().join("missing");

    assert!(Estimator::open(&config).await.is_err());
}
