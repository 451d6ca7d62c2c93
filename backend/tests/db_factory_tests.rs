//! Tests for db::factory and db::repo_config - repository creation and configuration.

mod support;

use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use cybercafe::db::factory::{data_file_from_env, RepositoryFactory, RepositoryType};
use cybercafe::db::repo_config::DEFAULT_DATA_FILE;
use cybercafe::db::{PcRepository, RepositoryError, UsageRepository};

#[test]
fn test_repository_type_from_str_local() {
    assert_eq!(RepositoryType::from_str("local").unwrap(), RepositoryType::Local);
    assert_eq!(RepositoryType::from_str("LOCAL").unwrap(), RepositoryType::Local);
    assert_eq!(RepositoryType::from_str("memory").unwrap(), RepositoryType::Local);
}

#[test]
fn test_repository_type_from_str_file() {
    assert_eq!(RepositoryType::from_str("file").unwrap(), RepositoryType::File);
    assert_eq!(RepositoryType::from_str("Json").unwrap(), RepositoryType::File);
}

#[test]
fn test_repository_type_from_str_invalid() {
    let result = RepositoryType::from_str("postgres");
    assert!(result.unwrap_err().contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", None), ("DATA_FILE", None)], || {
        assert_eq!(RepositoryType::from_env().unwrap(), RepositoryType::Local);
        assert_eq!(data_file_from_env(), PathBuf::from(DEFAULT_DATA_FILE));
    });
}

#[test]
fn test_repository_type_from_env_with_data_file() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATA_FILE", Some("/tmp/cafe.json")),
        ],
        || {
            assert_eq!(RepositoryType::from_env().unwrap(), RepositoryType::File);
            assert_eq!(data_file_from_env(), PathBuf::from("/tmp/cafe.json"));
        },
    );
}

#[test]
fn test_explicit_type_wins_over_data_file() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("DATA_FILE", Some("/tmp/cafe.json")),
        ],
        || assert_eq!(RepositoryType::from_env().unwrap(), RepositoryType::Local),
    );
}

#[test]
fn test_unparseable_type_is_configuration_error() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("fiel")),
            ("DATA_FILE", Some("/tmp/cafe.json")),
        ],
        || {
            let err = RepositoryType::from_env().unwrap_err();
            assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
            assert!(err.to_string().contains("Invalid REPOSITORY_TYPE"));
        },
    );
}

#[test]
fn test_factory_from_env_rejects_unparseable_type() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", Some("cassandra"))], || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result = runtime.block_on(RepositoryFactory::from_env());
        assert!(matches!(
            result,
            Err(RepositoryError::ConfigurationError { .. })
        ));
    });
}

#[test]
fn test_config_file_or_env_without_file_uses_env() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", None), ("DATA_FILE", None)], || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let repo = runtime
            .block_on(RepositoryFactory::from_config_file_or_env(None))
            .unwrap();
        assert!(runtime.block_on(repo.health_check()).unwrap());
        assert!(runtime.block_on(repo.list_pcs()).unwrap().is_empty());
    });
}

#[tokio::test]
async fn test_malformed_config_file_is_not_replaced_by_env() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository\ntype = ").unwrap();

    let result = RepositoryFactory::from_config_file_or_env(Some(file.path())).await;
    match result {
        Err(RepositoryError::ConfigurationError { message, .. }) => {
            assert!(message.contains("Failed to parse config file"));
        }
        Err(other) => panic!("expected configuration error, got {other}"),
        Ok(_) => panic!("malformed config must not fall back to the environment"),
    }
}

#[tokio::test]
async fn test_config_file_or_env_with_unknown_type_in_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"fiel\"").unwrap();

    let result = RepositoryFactory::from_config_file_or_env(Some(file.path())).await;
    assert!(matches!(
        result,
        Err(RepositoryError::ConfigurationError { .. })
    ));
}

#[tokio::test]
async fn test_from_config_file_selects_file_backend() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("nested").join("state.json");
    let config_path = dir.path().join("repository.toml");

    let mut config = std::fs::File::create(&config_path).unwrap();
    writeln!(
        config,
        "[repository]\ntype = \"file\"\n\n[file]\npath = {:?}\npretty = true",
        data_path.to_str().unwrap()
    )
    .unwrap();

    let repo = RepositoryFactory::from_config_file(&config_path).await.unwrap();
    assert!(repo.health_check().await.unwrap());

    repo.insert_usage_records(&[support::record("PC-01", "user-1", 60, 14)])
        .await
        .unwrap();
    assert!(data_path.exists());
    let written = std::fs::read_to_string(&data_path).unwrap();
    assert!(written.contains('\n'), "pretty snapshot spans several lines");
}

#[tokio::test]
async fn test_from_config_file_with_bad_type() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"postgres\"").unwrap();

    let result = RepositoryFactory::from_config_file(file.path()).await;
    assert!(matches!(
        result,
        Err(RepositoryError::ConfigurationError { .. })
    ));
}

#[tokio::test]
async fn test_create_local_is_isolated() {
    let a = RepositoryFactory::create_local();
    let b = RepositoryFactory::create_local();

    a.insert_usage_records(&[support::record("PC-01", "user-1", 60, 14)])
        .await
        .unwrap();

    assert_eq!(a.list_usage_records().await.unwrap().len(), 1);
    assert!(b.list_usage_records().await.unwrap().is_empty());
    assert!(b.list_pcs().await.unwrap().is_empty());
}
