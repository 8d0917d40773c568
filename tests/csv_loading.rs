use climate_data_processing::ingestion::header::canonicalize_header;
use climate_data_processing::ingestion::{load_from_path, load_from_reader, HeaderMode, LoadOptions};
use climate_data_processing::types::{Field, Value};
use climate_data_processing::LoadError;

fn detect() -> LoadOptions {
    LoadOptions {
        header_mode: HeaderMode::Detect,
        ..Default::default()
    }
}

#[test]
fn load_standard_headers_from_path() {
    let ds = load_from_path("tests/fixtures/climate.csv", &LoadOptions::default()).unwrap();

    assert_eq!(ds.len(), 7);
    assert!(ds.schema().missing_fields().is_empty());
    let r = &ds.records()[0];
    assert_eq!(r.country, "USA");
    assert_eq!(r.year, 2020);
    assert_eq!(r.value(Field::Gdp), Value::Float64(21000.0));
    assert_eq!(r.extra("urbanization"), Some("82.7"));
    assert_eq!(r.extra("deforestation"), Some("0.1"));

    assert_eq!(ds.countries(), vec!["brazil", "china", "india", "usa"]);
    assert_eq!(ds.years().collect::<Vec<_>>(), vec![2020, 2021]);
}

#[test]
fn alias_headers_and_missing_markers() {
    let ds = load_from_path("tests/fixtures/climate_aliases.csv", &LoadOptions::default()).unwrap();

    assert_eq!(ds.len(), 4);
    assert!(ds.schema().missing_fields().is_empty());
    assert_eq!(ds.schema().source_of(Field::Country), Some("Nation"));
    assert_eq!(ds.schema().source_of(Field::Co2Emissions), Some("CO2 Emissions (Mt)"));

    let kenya: Vec<_> = ds.records_for_country("KENYA").collect();
    assert_eq!(kenya[0].co2_emissions, 1250.5);
    assert_eq!(kenya[1].co2_emissions, 1300.0);
    assert_eq!(kenya[1].temperature_anomaly, 0.0);
    assert_eq!(kenya[1].gdp, 0.0);
    assert_eq!(kenya[0].extra("urbanization"), Some("27.5"));
    assert_eq!(kenya[0].extra("forest_loss_pct"), Some(""));

    let chile: Vec<_> = ds.records_for_country("chile").collect();
    assert_eq!(chile[0].extreme_weather_events, 0.0);
    assert_eq!(chile[1].year, 0);
    assert_eq!(ds.records_for_year(0).count(), 1);
}

#[test]
fn alias_group_members_share_one_canonical_name() {
    for raw in ["CO2", "co2_emission", "CO2 Emissions (Mt)", "co2 emissions"] {
        assert_eq!(canonicalize_header(raw), "co2_emissions", "header {raw:?}");
    }
    for raw in ["Temp Anomaly", "temperature_anamoly", "Temperature Change"] {
        assert_eq!(canonicalize_header(raw), "temperature_anomaly", "header {raw:?}");
    }
}

#[test]
fn detect_mode_finds_descriptive_headers() {
    let ds = load_from_path("tests/fixtures/climate_detect.csv", &detect()).unwrap();

    assert_eq!(ds.len(), 4);
    assert!(ds.schema().missing_fields().is_empty());
    assert_eq!(ds.schema().source_of(Field::Year), Some("Observation Year"));
    assert_eq!(ds.schema().source_of(Field::Co2Emissions), Some("Carbon Emissions (kt)"));
    assert_eq!(ds.schema().source_of(Field::Population), Some("Total Population"));

    let peru: Vec<_> = ds.records_for_country("peru").collect();
    assert_eq!(peru.len(), 2);
    assert_eq!(peru[1].year, 0);
    assert_eq!(peru[1].co2_emissions, 58000.0);
    // the row without a year stays out of the year index
    assert_eq!(ds.years().collect::<Vec<_>>(), vec![2018, 2019]);
}

#[test]
fn alias_mode_on_descriptive_headers_keeps_them_as_extras() {
    let ds = load_from_path("tests/fixtures/climate_detect.csv", &LoadOptions::default()).unwrap();
    assert_eq!(ds.len(), 4);
    assert!(!ds.schema().contains(Field::Country));
    assert_eq!(ds.records()[0].country, "");
    assert_eq!(ds.records()[0].extra("country_name"), Some("Norway"));
    assert!(ds.countries().is_empty());
}

#[test]
fn missing_core_columns_are_recorded_in_schema() {
    let ds = load_from_path("tests/fixtures/no_year.csv", &LoadOptions::default()).unwrap();
    assert_eq!(
        ds.schema().missing_fields(),
        vec![
            Field::Year,
            Field::TemperatureAnomaly,
            Field::ExtremeWeatherEvents,
            Field::Population
        ]
    );
    assert!(ds.records().iter().all(|r| r.year == 0));
}

#[test]
fn path_and_reader_loads_agree() {
    let via_path = load_from_path("tests/fixtures/climate.csv", &LoadOptions::default()).unwrap();
    let file = std::fs::File::open("tests/fixtures/climate.csv").unwrap();
    let via_reader = load_from_reader(file, &LoadOptions::default()).unwrap();
    assert_eq!(via_path.records(), via_reader.records());
    assert_eq!(via_path.schema(), via_reader.schema());
}

#[test]
fn header_only_file_loads_empty_dataset() {
    let ds = load_from_reader("Country,Year,GDP\n".as_bytes(), &LoadOptions::default()).unwrap();
    assert!(ds.is_empty());
    assert_eq!(ds.years().count(), 0);
}

#[test]
fn invalid_utf8_cells_are_replaced_not_rejected() {
    let mut input = b"country,year,gdp\n".to_vec();
    input.extend_from_slice(b"C\xF4te d'Ivoire,2020,70\n");
    let ds = load_from_reader(input.as_slice(), &LoadOptions::default()).unwrap();
    assert_eq!(ds.len(), 1);
    assert!(ds.records()[0].country.starts_with('C'));
    assert_eq!(ds.records()[0].gdp, 70.0);
}

fn temp_csv(name: &str, contents: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("climate-csv-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn empty_and_header_only_files_on_disk() {
    let empty = temp_csv("empty.csv", "");
    let err = load_from_path(&empty, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::EmptyInput { .. }));

    let header_only = temp_csv("header_only.csv", "Country,Year,CO2\n");
    let ds = load_from_path(&header_only, &detect()).unwrap();
    assert!(ds.is_empty());
    assert!(ds.schema().contains(Field::Co2Emissions));

    let _ = std::fs::remove_file(empty);
    let _ = std::fs::remove_file(header_only);
}

#[test]
fn invalid_utf8_header_is_csv_error() {
    let input: &[u8] = b"Countr\xFF,Year\nA,2020\n";
    let err = load_from_reader(input, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Csv(_)));
    assert!(err.to_string().starts_with("csv error"));
}

#[test]
fn missing_file_is_io_error() {
    let err = load_from_path("tests/fixtures/does_not_exist.csv", &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn empty_file_is_rejected() {
    let err = load_from_reader("".as_bytes(), &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::EmptyInput { .. }));
    assert!(err.to_string().starts_with("empty input"));
}
