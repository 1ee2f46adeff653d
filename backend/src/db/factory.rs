//! Repository factory for dependency injection.
//!
//! This module provides utilities for creating and configuring repository instances
//! based on runtime configuration.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use log::info;

use super::models::CatalogSeed;
use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "remote-repo")]
use super::repositories::RemoteRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory local repository
    Local,
    /// HTTP client for a remote timetable store
    Remote,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string (`"local"`, `"remote"` or `"http"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            "remote" | "http" => Ok(Self::Remote),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variable.
    ///
    /// Reads `REPOSITORY_TYPE`. Defaults to Remote if `TIMETABLE_STORE_URL` is
    /// present, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("TIMETABLE_STORE_URL").is_ok() {
            Self::Remote
        } else {
            Self::Local
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```ignore
/// use timetabler::db::{RepositoryConfig, RepositoryFactory};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = RepositoryConfig::from_default_location()?.with_env_overrides();
///     let repo = RepositoryFactory::from_repository_config(&config)?;
///     assert!(repo.health_check().await?);
///     Ok(())
/// }
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create an in-memory local repository seeded with the built-in campus.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::seeded())
    }

    /// Create an in-memory local repository seeded with `seed`.
    pub fn create_local_with_catalog(seed: CatalogSeed) -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::with_catalog(seed))
    }

    /// Create a client for the store at `base_url`.
    #[cfg(feature = "remote-repo")]
    pub fn create_remote(
        base_url: &str,
        timeout: std::time::Duration,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        Ok(Arc::new(RemoteRepository::new(base_url, timeout)?))
    }

    /// Create repository from environment configuration.
    ///
    /// Uses the default config file when present, then applies
    /// `REPOSITORY_TYPE` and `TIMETABLE_STORE_URL`.
    pub fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_default_location()
            .unwrap_or_default()
            .with_env_overrides();
        Self::from_repository_config(&config)
    }

    /// Create repository from a TOML configuration file.
    pub fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config)
    }

    /// Create repository from a RepositoryConfig instance.
    pub fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match config.repository_type()? {
            RepositoryType::Local => {
                let seed = match &config.catalog.path {
                    Some(path) => {
                        info!("Loading campus catalog from {}", path.display());
                        CatalogSeed::from_json_file(path)?
                    }
                    None => CatalogSeed::default_campus(),
                };
                Ok(Self::create_local_with_catalog(seed))
            }
            RepositoryType::Remote => {
                #[cfg(feature = "remote-repo")]
                {
                    let base_url = config.remote_base_url()?;
                    info!("Using remote timetable store at {}", base_url);
                    Self::create_remote(base_url, config.remote_timeout())
                }
                #[cfg(not(feature = "remote-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "Remote repository feature not enabled",
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_type_from_str() {
        assert_eq!(
            RepositoryType::from_str("local").unwrap(),
            RepositoryType::Local
        );
        assert_eq!(
            RepositoryType::from_str("Remote").unwrap(),
            RepositoryType::Remote
        );
        assert_eq!(
            RepositoryType::from_str("http").unwrap(),
            RepositoryType::Remote
        );
        assert!(RepositoryType::from_str("invalid").is_err());
    }

    #[tokio::test]
    async fn test_create_local_repository() {
        let repo = RepositoryFactory::create_local();
        assert!(repo.health_check().await.unwrap());
        assert_eq!(repo.list_buildings().await.unwrap(), vec!["BUSH", "CSS", "KEENE"]);
    }

    #[tokio::test]
    async fn test_local_from_config_with_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("campus.json");
        std::fs::write(&catalog, r#"{ "rooms": ["OLIN 101", "OLIN 102"] }"#).unwrap();

        let mut config = RepositoryConfig::default();
        config.catalog.path = Some(catalog);
        let repo = RepositoryFactory::from_repository_config(&config).unwrap();

        assert_eq!(repo.list_buildings().await.unwrap(), vec!["OLIN"]);
        assert_eq!(repo.list_rooms_by_building("OLIN").await.unwrap().len(), 2);
    }

    #[test]
    fn test_missing_catalog_file_is_configuration_error() {
        let mut config = RepositoryConfig::default();
        config.catalog.path = Some("/no/such/catalog.json".into());
        assert!(matches!(
            RepositoryFactory::from_repository_config(&config),
            Err(RepositoryError::ConfigurationError { .. })
        ));
    }
}
