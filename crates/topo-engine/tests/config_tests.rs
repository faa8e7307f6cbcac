use std::io::Write;
use tempfile::NamedTempFile;
use topo_engine::api::*;
use topo_engine::config::EngineConfig;
use topo_engine::error::ConfigError;
use topo_engine::handle::TopologyHandle;
use topo_engine::types::*;
use topo_test_utils::*;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_config_from_file() {
    let file = write_config(
        r#"
        audit_capacity = 3
        history_limit = 2
        actor = "noc"
        "#,
    );

    let config = EngineConfig::load(file.path()).unwrap();
    assert_eq!(config.audit_capacity, 3);
    assert_eq!(config.history_limit, Some(2));
    assert!(!config.strict_targets);

    let mut handle = TopologyHandle::with_config(GraphSnapshot::default(), config).unwrap();
    for i in 0..5 {
        handle.add_node(node(&format!("n{i}"))).unwrap();
    }

    assert_eq!(handle.audit_logs().len(), 3);
    assert_eq!(handle.undo_depth(), 2);
    assert_eq!(handle.audit_logs()[0].user.as_deref(), Some("noc"));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let err = EngineConfig::load(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::Io { ref path, .. } if path == &missing));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let file = write_config("audit_capacity = \"lots\"");

    assert!(matches!(
        EngineConfig::load(file.path()),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_zero_capacity_file_is_rejected() {
    let file = write_config("audit_capacity = 0");

    assert!(matches!(
        EngineConfig::load(file.path()),
        Err(ConfigError::ZeroAuditCapacity)
    ));
}
