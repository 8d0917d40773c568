use std::sync::{Arc, Mutex};

use climate_data_processing::ingestion::{
    load_from_path, load_from_reader, CompositeObserver, FileObserver, HeaderMode, LoadContext, LoadObserver,
    LoadOptions, LoadRequest, LoadSeverity, LoadStats,
};
use climate_data_processing::LoadError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<LoadStats>>,
    failures: Mutex<Vec<LoadSeverity>>,
    alerts: Mutex<Vec<LoadSeverity>>,
    sources: Mutex<Vec<String>>,
}

impl LoadObserver for RecordingObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.sources.lock().unwrap().push(ctx.source.display().to_string());
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &LoadError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &LoadError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn observed(obs: &Arc<RecordingObserver>) -> LoadOptions {
    LoadOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: LoadSeverity::Critical,
        ..Default::default()
    }
}

#[test]
fn observer_receives_failure_and_alert_on_missing_file() {
    let obs = Arc::new(RecordingObserver::default());

    // Missing file -> Io error -> Critical
    let _ = load_from_path("tests/fixtures/does_not_exist.csv", &observed(&obs)).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![LoadSeverity::Critical]);
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![LoadSeverity::Critical]);
    assert!(obs.successes.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_failure_without_alert_for_empty_input() {
    let obs = Arc::new(RecordingObserver::default());

    // Empty source -> EmptyInput -> Error (below the Critical threshold)
    let _ = load_from_reader("".as_bytes(), &observed(&obs)).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![LoadSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn undecodable_header_is_error_severity() {
    let obs = Arc::new(RecordingObserver::default());

    let input: &[u8] = b"Countr\xFF,Year\nA,2020\n";
    let err = load_from_reader(input, &observed(&obs)).unwrap_err();

    assert!(matches!(err, LoadError::Csv(_)));
    assert_eq!(LoadSeverity::for_error(&err), LoadSeverity::Error);
    assert_eq!(obs.failures.lock().unwrap().clone(), vec![LoadSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn lower_threshold_alerts_on_errors_too() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = LoadOptions {
        alert_at_or_above: LoadSeverity::Error,
        ..observed(&obs)
    };

    let _ = load_from_reader(" ,\n1,2\n".as_bytes(), &opts).unwrap_err();

    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![LoadSeverity::Error]);
}

#[test]
fn observer_receives_stats_on_success() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = LoadOptions {
        drop_incomplete_rows: true,
        ..observed(&obs)
    };

    let ds = load_from_path("tests/fixtures/climate_aliases.csv", &opts).unwrap();

    let stats = obs.successes.lock().unwrap().clone();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].rows, ds.len());
    assert_eq!(stats[0].rows, 3);
    assert_eq!(stats[0].dropped_rows, 1);
    assert_eq!(stats[0].countries, 2);
    assert_eq!(stats[0].years, 2);
    assert!(stats[0].defaulted_cells >= 3);
    assert_eq!(obs.sources.lock().unwrap().clone(), vec!["tests/fixtures/climate_aliases.csv"]);
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn composite_observer_fans_out() {
    let a = Arc::new(RecordingObserver::default());
    let b = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn LoadObserver>> = vec![a.clone(), b.clone()];
    let composite = CompositeObserver::new(observers);
    let opts = LoadOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };

    let _ = load_from_path("tests/fixtures/does_not_exist.csv", &opts).unwrap_err();

    for obs in [&a, &b] {
        assert_eq!(obs.failures.lock().unwrap().clone(), vec![LoadSeverity::Critical]);
        assert_eq!(obs.alerts.lock().unwrap().clone(), vec![LoadSeverity::Critical]);
    }
}

#[test]
fn file_observer_appends_load_events() {
    let dir = std::env::temp_dir().join(format!("climate-observer-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let log = dir.join("load.log");
    let _ = std::fs::remove_file(&log);

    let request = LoadRequest {
        path: "tests/fixtures/climate_detect.csv".into(),
        options: LoadOptions {
            header_mode: HeaderMode::Detect,
            observer: Some(Arc::new(FileObserver::new(&log))),
            ..Default::default()
        },
    };
    let ds = request.run().unwrap();
    assert_eq!(ds.len(), 4);

    let missing = LoadRequest {
        path: dir.join("missing.csv"),
        options: request.options.clone(),
    };
    let _ = missing.run().unwrap_err();

    let text = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains(" ok mode=Detect "));
    assert!(lines[0].contains("rows=4 dropped=0 defaulted_cells=1 "));
    assert!(lines[1].contains(" fail severity=Critical "));
    assert!(lines[2].contains(" ALERT severity=Critical "));

    let _ = std::fs::remove_dir_all(&dir);
}
