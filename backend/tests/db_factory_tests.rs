//! Tests for db::factory module - repository creation and configuration.

mod support;

use std::io::Write;
use std::str::FromStr;

use timetabler::db::factory::{RepositoryFactory, RepositoryType};
use timetabler::db::repository::{CatalogRepository, RepositoryError};
use timetabler::db::RepositoryConfig;

#[test]
fn test_repository_type_from_str() {
    assert_eq!(RepositoryType::from_str("local").unwrap(), RepositoryType::Local);
    assert_eq!(RepositoryType::from_str("MEMORY").unwrap(), RepositoryType::Local);
    assert_eq!(RepositoryType::from_str("remote").unwrap(), RepositoryType::Remote);
    assert_eq!(RepositoryType::from_str("Http").unwrap(), RepositoryType::Remote);
}

#[test]
fn test_repository_type_from_str_invalid() {
    let result = RepositoryType::from_str("postgres");
    assert!(result.unwrap_err().contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(
        &[("REPOSITORY_TYPE", None), ("TIMETABLE_STORE_URL", None)],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[test]
fn test_repository_type_from_env_with_store_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("TIMETABLE_STORE_URL", Some("http://localhost:8080")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Remote),
    );
}

#[test]
fn test_explicit_repository_type_wins() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("TIMETABLE_STORE_URL", Some("http://localhost:8080")),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
            let config = RepositoryConfig::default().with_env_overrides();
            assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
            assert_eq!(config.remote.base_url, "http://localhost:8080");
        },
    );
}

#[test]
fn test_unknown_env_type_falls_back_to_local() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", Some("sqlite"))], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[test]
fn test_remote_without_url_is_configuration_error() {
    let config = RepositoryConfig::from_toml_str("[repository]\ntype = \"remote\"\n").unwrap();
    let result = RepositoryFactory::from_repository_config(&config);
    assert!(matches!(
        result,
        Err(RepositoryError::ConfigurationError { .. })
    ));
}

#[test]
fn test_invalid_type_in_file_is_rejected() {
    let result = RepositoryConfig::from_toml_str("[repository]\ntype = \"mongo\"\n");
    assert!(matches!(
        result,
        Err(RepositoryError::ConfigurationError { .. })
    ));
}

#[tokio::test]
async fn test_from_env_creates_healthy_local_store() {
    let repo = support::with_scoped_env(
        &[("REPOSITORY_TYPE", Some("local")), ("TIMETABLE_STORE_URL", None)],
        RepositoryFactory::from_env,
    )
    .unwrap();

    assert!(repo.health_check().await.unwrap());
    assert_eq!(repo.list_buildings().await.unwrap(), vec!["BUSH", "CSS", "KEENE"]);
    assert!(repo.list_section_names().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_from_config_file_with_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("catalog.json");
    std::fs::write(
        &catalog_path,
        r#"{
            "instructors": ["Hopper, Grace"],
            "rooms": ["OLIN 101", "OLIN 204"],
            "timeslot_categories": [
                { "name": "TR for 75 minutes", "timeslots": ["TR 9:30 - 10:45"] }
            ]
        }"#,
    )
    .unwrap();

    let config_path = dir.path().join("timetabler.toml");
    let mut file = std::fs::File::create(&config_path).unwrap();
    writeln!(
        file,
        "[repository]\ntype = \"local\"\n\n[catalog]\npath = {:?}",
        catalog_path.display().to_string()
    )
    .unwrap();

    let repo = RepositoryFactory::from_config_file(&config_path).unwrap();
    assert_eq!(repo.list_buildings().await.unwrap(), vec!["OLIN"]);
    assert_eq!(repo.list_instructors().await.unwrap(), vec!["Hopper, Grace"]);
    assert_eq!(
        repo.list_timeslot_categories().await.unwrap().first().map(String::as_str),
        Some("TR for 75 minutes")
    );
}

#[test]
fn test_missing_catalog_file_fails() {
    let config = RepositoryConfig::from_toml_str(
        "[repository]\ntype = \"local\"\n\n[catalog]\npath = \"/nonexistent/catalog.json\"\n",
    )
    .unwrap();
    assert!(RepositoryFactory::from_repository_config(&config).is_err());
}
