use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use vyx_app::{ConfigError, Settings};
use vyx_app::settings::{DEFAULT_CLIP_WEBHOOK_URL, DEFAULT_INGEST_WEBHOOK_URL};
use vyx_core::ProfileKind;
use vyx_engine::WireFields;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

fn write_config(dir: &Path, text: &str) -> PathBuf {
    let path = dir.join("vyx.ron");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn defaults_apply_without_file_or_env() {
    let temp = TempDir::new().unwrap();
    let path = write_config(temp.path(), "()");
    let settings = Settings::load(Some(&path), env_from(&[])).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.endpoint(ProfileKind::Content), DEFAULT_INGEST_WEBHOOK_URL);
    assert_eq!(settings.endpoint(ProfileKind::Clips), DEFAULT_CLIP_WEBHOOK_URL);
}

#[test]
fn layers_file_then_env_then_flags() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        temp.path(),
        r#"(
            ingest_webhook_url: Some("http://file.test/ingest"),
            clip_webhook_url: Some("http://file.test/clips"),
            timeout_secs: Some(90),
            state_dir: Some("/tmp/vyx-state"),
        )"#,
    );

    let settings = Settings::load(
        Some(&path),
        env_from(&[("VYX_CLIP_WEBHOOK_URL", "http://env.test/clips")]),
    )
    .unwrap();
    assert_eq!(settings.ingest_webhook_url, "http://file.test/ingest");
    assert_eq!(settings.clip_webhook_url, "http://env.test/clips");
    assert_eq!(settings.timeout_secs, Some(90));
    assert_eq!(settings.state_dir, PathBuf::from("/tmp/vyx-state"));

    let settings = settings.with_overrides(
        ProfileKind::Content,
        Some("http://flag.test/ingest".into()),
        Some(5),
        None,
    );
    assert_eq!(settings.ingest_webhook_url, "http://flag.test/ingest");
    assert_eq!(settings.clip_webhook_url, "http://env.test/clips");
    assert_eq!(settings.profile(ProfileKind::Content).budget, Duration::from_secs(5));
}

#[test]
fn blank_values_do_not_override() {
    let temp = TempDir::new().unwrap();
    let path = write_config(temp.path(), r#"(ingest_webhook_url: Some(""))"#);
    let settings = Settings::load(Some(&path), env_from(&[("VYX_INGEST_WEBHOOK_URL", "  ")]))
        .unwrap()
        .with_overrides(ProfileKind::Content, Some(String::new()), None, None);
    assert_eq!(settings.ingest_webhook_url, DEFAULT_INGEST_WEBHOOK_URL);
}

#[test]
fn profile_budget_defaults_per_kind() {
    let settings = Settings::default();
    assert_eq!(
        settings.profile(ProfileKind::Content).budget,
        Duration::from_secs(5 * 60)
    );
    assert_eq!(
        settings.profile(ProfileKind::Clips).budget,
        Duration::from_secs(10 * 60)
    );
}

#[test]
fn submit_settings_follow_profile() {
    let settings = Settings::default().with_overrides(
        ProfileKind::Clips,
        Some("http://localhost:5678/webhook/clip".into()),
        Some(42),
        None,
    );
    let profile = settings.profile(ProfileKind::Clips);
    let submit = settings.submit_settings(&profile);
    assert_eq!(submit.endpoint, "http://localhost:5678/webhook/clip");
    assert_eq!(submit.fields, WireFields::clips());
    assert_eq!(submit.request_timeout, Duration::from_secs(42));
}

#[test]
fn invalid_timeout_env_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = write_config(temp.path(), "()");
    for value in ["soon", "0", "-3"] {
        let err = Settings::load(Some(&path), env_from(&[("VYX_TIMEOUT_SECS", value)]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout { .. }), "{value}");
    }
}

#[test]
fn missing_or_malformed_config_is_an_error() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.ron");
    assert!(matches!(
        Settings::load(Some(&missing), env_from(&[])),
        Err(ConfigError::Read { .. })
    ));

    let bad = write_config(temp.path(), "(timeout_secs: \"ten\")");
    assert!(matches!(
        Settings::load(Some(&bad), env_from(&[])),
        Err(ConfigError::Parse { .. })
    ));
}
