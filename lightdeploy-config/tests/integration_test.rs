//! Integration tests for lightdeploy-config

use lightdeploy_config::*;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

fn resolve(yaml: &str) -> ConfigResult<ServerConfig> {
    let raw: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
    ServerConfig::resolve(&ConfigValue::try_from(raw).unwrap())
}

#[test]
fn test_absent_management_section() {
    let config = resolve("http:\n  port: 8080\n").unwrap();
    assert!(!config.has_management_endpoint());
    assert!(!config.is_jmx_enabled());
    assert!(config.jmx().is_none());
}

#[test]
fn test_partial_management_section_fails() {
    for yaml in [
        "http:\n  port: 8080\njmx:\n  registryPort: 9000\n",
        "http:\n  port: 8080\njmx:\n  serverPort: 9001\n",
    ] {
        let err = resolve(yaml).unwrap_err();
        assert!(
            matches!(err, ConfigError::IncompleteSection { ref section, .. } if section == "jmx"),
            "unexpected error for {yaml:?}: {err:?}"
        );
    }
}

#[test]
fn test_management_section_with_both_ports() {
    let config = resolve("http:\n  port: 8080\njmx:\n  registryPort: 9000\n  serverPort: 9001\n").unwrap();
    assert!(config.has_management_endpoint());

    let jmx = config.jmx().unwrap();
    assert_eq!(jmx.registry_port, 9000);
    assert_eq!(jmx.server_port, 9001);
}

#[test]
fn test_numeric_defaults() {
    let config = resolve("http:\n  port: 8080\n").unwrap();
    let connector = &config.http().connector;

    assert_eq!(config.min_threads(), 8);
    assert_eq!(config.max_threads(), 128);
    assert_eq!(connector.request_buffer_size, 16384);
    assert_eq!(connector.response_header_buffer_size, 6144);
    assert_eq!(connector.max_idle_time, Duration::from_secs(200));
    assert_eq!(connector.acceptor_threads, 1);
    assert_eq!(connector.max_buffer_count, 1024);
}

#[test]
fn test_tls_modes() {
    let mixed = resolve("http:\n  port: 8080\n  ssl:\n    port: 8443\n").unwrap();
    assert!(mixed.is_ssl());
    assert!(mixed.is_mixed_mode());

    let shared = resolve("http:\n  port: 8080\n  ssl:\n    keyStorePath: /etc/keys/server.jks\n").unwrap();
    assert!(shared.is_ssl());
    assert!(!shared.is_mixed_mode());

    let plain = resolve("http:\n  port: 8080\n").unwrap();
    assert!(!plain.is_ssl());
    assert!(!plain.is_mixed_mode());
    assert!(plain.ssl().is_none());
}

#[test]
fn test_work_dir() {
    let default = resolve("http:\n  port: 8080\n").unwrap();
    assert_eq!(default.work_dir(), std::env::temp_dir());

    let explicit = resolve("http:\n  port: 8080\nworkDir: \"/srv/app\"\n").unwrap();
    assert_eq!(explicit.work_dir(), Path::new("/srv/app"));
}

#[test]
fn test_resolution_is_deterministic() {
    let yaml = r#"
http:
  port: 8080
  adminPort: 8081
  ssl:
    port: 8443
  requestLog:
    currentLogFilename: /var/log/app/request.log
logging:
  level: warn
jmx:
  registryPort: 9000
  serverPort: 9001
workDir: /srv/app
"#;
    assert_eq!(resolve(yaml).unwrap(), resolve(yaml).unwrap());
}

#[test]
fn test_type_mismatch_is_reported_with_key() {
    let err = resolve("http:\n  port: \"8080\"\n").unwrap_err();
    assert_eq!(err.key(), Some("http.port"));
    assert!(err.to_string().contains("expected integer, found string"));

    let err = resolve("http:\n  port: 8080\nworkDir: 42\n").unwrap_err();
    assert_eq!(err.key(), Some("workDir"));
}

#[test]
fn test_missing_root_data() {
    assert!(matches!(
        resolve("logging:\n  level: info\n"),
        Err(ConfigError::MissingSection { .. })
    ));
    assert!(matches!(
        resolve("http:\n  adminPort: 8081\n"),
        Err(ConfigError::MissingField { .. })
    ));
    assert!(resolve("- just\n- a list\n").is_err());
}

#[test]
fn test_comprehensive_config() {
    let yaml = r#"
http:
  port: 8080
  adminPort: 8081
  minThreads: 4
  maxThreads: 64
  contextPath: /shop
  acceptorThreads: 2
  requestHeaderBufferSize: 8192
  lowResourcesMaxIdleTime: 5000
  sessions:
    path: /shop
    secureCookies: true
  gzip:
    minimumEntitySize: 512
    compressedMimeTypes:
      - text/html
      - application/json
  ssl:
    port: 8443
    keyStorePath: /etc/keys/server.jks
    keyStorePassword: changeit
  requestLog:
    currentLogFilename: /var/log/shop/request.log
    archivedLogFilenamePattern: /var/log/shop/request-%d.log.gz
    archivedFileCount: 10
logging:
  level: debug
  loggers:
    org.eclipse.jetty: warn
jmx:
  registryPort: 9000
  serverPort: 9001
workDir: /srv/shop
"#;

    let config = resolve(yaml).unwrap();

    assert_eq!(config.port(), 8080);
    assert_eq!(config.admin_port(), Some(8081));
    assert_eq!(config.min_threads(), 4);
    assert_eq!(config.max_threads(), 64);
    assert_eq!(config.http().connector.context_path, "/shop");
    assert_eq!(config.http().connector.acceptor_threads, 2);
    assert_eq!(config.http().connector.request_header_buffer_size, 8192);
    assert_eq!(
        config.http().connector.low_resources_max_idle_time,
        Duration::from_secs(5)
    );
    assert!(config.http().sessions.secure_cookies);
    assert_eq!(config.http().gzip.minimum_entity_size, 512);
    assert!(config.http().gzip.enabled);

    let ssl = config.ssl().unwrap();
    assert_eq!(ssl.key_store_password.as_deref(), Some("changeit"));
    assert!(config.is_mixed_mode());

    let request_log = config.request_log().unwrap();
    assert_eq!(request_log.archived_file_count, 10);
    assert_eq!(
        request_log.destination(),
        LogDestination::File(Path::new("/var/log/shop/request.log"))
    );

    let server_log = config.server_log().unwrap();
    assert_eq!(server_log.level, LogLevel::Debug);
    assert_eq!(server_log.level_for("org.eclipse.jetty"), LogLevel::Warn);

    assert_eq!(
        config.jmx().unwrap().service_url("0.0.0.0"),
        "service:jmx:rmi://0.0.0.0:9001/jndi/rmi://0.0.0.0:9000/jmxrmi"
    );
    assert_eq!(config.work_dir(), Path::new("/srv/shop"));
}

#[test]
fn test_loader_from_yaml_file() {
    let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
    writeln!(file, "http:\n  port: 8080\njmx:\n  registryPort: 9000\n  serverPort: 9001").unwrap();

    let config = ConfigLoader::with_prefix("LDFILETEST").from_file(file.path()).unwrap();
    assert_eq!(config.port(), 8080);
    assert!(config.has_management_endpoint());
}

#[test]
fn test_loader_from_json_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"http": {{"port": 8080, "ssl": {{"port": 8443}}}}}}"#).unwrap();

    let config = ConfigLoader::with_prefix("LDFILETEST").from_file(file.path()).unwrap();
    assert!(config.is_mixed_mode());
}

#[test]
fn test_loader_propagates_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yml");

    match ConfigLoader::new().from_file(&missing).unwrap_err() {
        ConfigError::FileReadError(err) => assert_eq!(err.kind(), std::io::ErrorKind::NotFound),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_loader_reports_syntax_errors() {
    let err = ConfigLoader::with_prefix("LDFILETEST")
        .from_yaml_str("http: [unclosed\n")
        .unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn test_generated_sample_loads() {
    let sample = ServerConfig::generate_sample();
    let config = ConfigLoader::with_prefix("LDFILETEST").from_yaml_str(&sample).unwrap();
    assert_eq!(config.port(), 8080);
    assert_eq!(config.admin_port(), Some(8081));
}

#[test]
fn test_programmatic_document() {
    let mut http = ConfigMap::new();
    http.insert("port".to_string(), ConfigValue::Int(8080));
    http.insert("maxThreads".to_string(), ConfigValue::Int(32));

    let mut root = ConfigMap::new();
    root.insert("http".to_string(), ConfigValue::from(http));

    let config = ServerConfig::resolve(&ConfigValue::from(root)).unwrap();
    assert_eq!(config.port(), 8080);
    assert_eq!(config.max_threads(), 32);
}
