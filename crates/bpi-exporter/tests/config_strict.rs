#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use bpi_core::ErrorKind;
use bpi_exporter::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
upstream:
  url: "https://api.coindesk.com/v1/bpi/currentprice.json"
  timeoutms: 500 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn ok_minimal_config() {
    let ok = "version: 1\n";
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.exporter.listen, "0.0.0.0:8080");
    assert_eq!(cfg.scheduler.interval_ms, 60_000);
    assert!(!cfg.scheduler.run_once);
    assert_eq!(cfg.metric.full_name(), "bitcoinIndex_Coindesk_bitcoinPrice");
    assert_eq!(cfg.metric.currencies, vec!["USD", "EUR", "GBP"]);
}

#[test]
fn ok_full_config() {
    let ok = r#"
version: 1
exporter:
  listen: "127.0.0.1:9100"
upstream:
  url: "http://localhost:8000/bpi.json"
  timeout_ms: 2000
scheduler:
  interval_ms: 15000
  run_once: true
metric:
  namespace: "btc"
  subsystem: "index"
  name: "price"
  help: "BTC price"
  currencies: ["USD"]
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.exporter.listen_addr().unwrap().port(), 9100);
    assert_eq!(cfg.upstream.timeout().as_millis(), 2000);
    assert!(cfg.scheduler.run_once);
    assert_eq!(cfg.metric.full_name(), "btc_index_price");
}

#[test]
fn default_config_is_valid() {
    config::ExporterConfig::default().validate().expect("defaults must validate");
}

#[test]
fn rejects_bad_values() {
    let cases = [
        ("version: 2\n", ErrorKind::UnsupportedVersion),
        ("version: 1\nexporter: { listen: \"not-an-addr\" }\n", ErrorKind::Config),
        ("version: 1\nupstream: { url: \"ftp://example.com/x\" }\n", ErrorKind::Config),
        ("version: 1\nupstream: { timeout_ms: 10 }\n", ErrorKind::Config),
        ("version: 1\nscheduler: { interval_ms: 10 }\n", ErrorKind::Config),
        (
            "version: 1\nupstream: { timeout_ms: 5000 }\nscheduler: { interval_ms: 5000 }\n",
            ErrorKind::Config,
        ),
        ("version: 1\nmetric: { currencies: [] }\n", ErrorKind::Config),
        ("version: 1\nmetric: { currencies: [\"USD\", \"USD\"] }\n", ErrorKind::Config),
        ("version: 1\nmetric: { currencies: [\"usd\"] }\n", ErrorKind::Config),
        ("version: 1\nmetric: { name: \"bitcoin-price\" }\n", ErrorKind::Config),
        ("version: [1\n", ErrorKind::Config),
    ];

    for (yaml, kind) in cases {
        let err = config::load_from_str(yaml).expect_err(yaml);
        assert_eq!(err.kind(), kind, "{yaml}");
    }
}

#[test]
fn explicit_missing_file_is_an_error() {
    let err = config::load(Some("/nonexistent/bpi-exporter.yaml".into())).expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Config);
}

// Process-wide state (env var, working directory) is only touched here, in
// one sequential test, so parallel tests in this binary never observe it.
#[test]
fn config_path_resolution() {
    let dir = std::env::temp_dir().join(format!("bpi-exporter-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let original_cwd = std::env::current_dir().unwrap();
    std::env::set_current_dir(&dir).unwrap();
    std::env::remove_var(config::CONFIG_PATH_ENV);

    // no default file: built-in defaults
    let cfg = config::load(None).expect("defaults when default file is absent");
    let defaults = config::ExporterConfig::default();
    assert_eq!(cfg.exporter.listen, defaults.exporter.listen);
    assert_eq!(cfg.upstream.url, defaults.upstream.url);
    assert_eq!(cfg.scheduler.interval_ms, defaults.scheduler.interval_ms);
    assert_eq!(cfg.metric.currencies, defaults.metric.currencies);

    // default file present: it is read
    std::fs::write(dir.join(config::DEFAULT_CONFIG_PATH), "version: 1\nexporter:\n  listen: \"127.0.0.1:9101\"\n").unwrap();
    let cfg = config::load(None).unwrap();
    assert_eq!(cfg.exporter.listen, "127.0.0.1:9101");

    // env var overrides the default file
    let env_file = dir.join("from-env.yaml");
    std::fs::write(&env_file, "version: 1\nexporter:\n  listen: \"127.0.0.1:9102\"\n").unwrap();
    std::env::set_var(config::CONFIG_PATH_ENV, &env_file);
    let cfg = config::load(None).unwrap();
    assert_eq!(cfg.exporter.listen, "127.0.0.1:9102");

    // explicit argument beats the env var
    let arg_file = dir.join("from-arg.yaml");
    std::fs::write(&arg_file, "version: 1\nexporter:\n  listen: \"127.0.0.1:9103\"\n").unwrap();
    let cfg = config::load(Some(arg_file.to_string_lossy().into_owned())).unwrap();
    assert_eq!(cfg.exporter.listen, "127.0.0.1:9103");

    // env var naming a missing file is an error, not a fallback
    std::env::set_var(config::CONFIG_PATH_ENV, dir.join("missing.yaml"));
    let err = config::load(None).expect_err("missing env file must fail");
    assert_eq!(err.kind(), ErrorKind::Config);

    std::env::remove_var(config::CONFIG_PATH_ENV);
    std::env::set_current_dir(original_cwd).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();
}
