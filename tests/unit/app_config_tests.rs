/*!
 * Tests for project configuration functionality
 */

use anyhow::Result;

use crate::common::{create_temp_dir, default_project_config, write_project_config};
use greyparrot::app_config::{LogLevel, ProjectConfig, resolve_credential_with, TOKEN_VAR};
use greyparrot::database::repository::CANDIDATE_LOOKUP_LIMIT;
use greyparrot::errors::AppError;
use greyparrot::scan::{ProjectKind, ScanPattern};

/// Test default values of a minimal configuration
#[test]
fn test_defaultProjectConfig_shouldResolvePathsAgainstConfigDir() -> Result<()> {
    let dir = create_temp_dir()?;
    let config = default_project_config(dir.path())?;

    assert_eq!(config.scan_root(), dir.path().join("src"));
    assert_eq!(config.langs_dir(), dir.path().join("locales"));
    assert_eq!(config.require_dashboard_url()?, "http://127.0.0.1:9");
    assert!(config.log_level.is_none());
    assert!(config.local.is_none());
    assert_eq!(config.local_config().candidate_limit, CANDIDATE_LOOKUP_LIMIT);
    Ok(())
}

/// Test a configuration using every supplemented field
#[test]
fn test_fullProjectConfig_shouldParseLocalAndCustomTokens() -> Result<()> {
    let dir = create_temp_dir()?;
    let config = write_project_config(
        dir.path(),
        r#"{
            "projectId": 3,
            "dashboardUrl": "https://dash.example.com",
            "defaultLocale": "zh-CN",
            "scanDir": "lib",
            "include": ["**/*.dart"],
            "exclude": ["**/build/**"],
            "langsDir": "assets/i18n",
            "marker": "tr",
            "replacementCall": "context.t",
            "logLevel": "debug",
            "local": {
                "database": "store.db",
                "languages": ["EN", "ja"],
                "candidateLimit": 5,
                "ai": { "model": "local-model", "temperature": 0.1 }
            }
        }"#,
    )?;

    assert_eq!(config.project_id, "3");
    assert_eq!(config.default_locale, "zh-CN");
    assert_eq!(config.marker, "tr");
    assert_eq!(config.log_level, Some(LogLevel::Debug));
    assert_eq!(config.database_path()?, dir.path().join("store.db"));

    let local = config.local_config();
    assert_eq!(local.languages, vec!["en".to_string(), "ja".to_string()]);
    assert_eq!(local.candidate_limit, 5);
    assert_eq!(local.ai.model, "local-model");
    assert_eq!(local.ai.endpoint, "https://api.openai.com/v1");
    assert_ne!(config.scan_pattern(), ScanPattern::preset(ProjectKind::Js));
    Ok(())
}

/// Test that broken JSON is reported as invalid configuration
#[test]
fn test_load_withBrokenJson_shouldBeInvalidConfiguration() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = crate::common::create_test_file(dir.path(), ".grey-parrot.json", "{ not json")?;

    assert!(matches!(
        ProjectConfig::load(&path),
        Err(AppError::InvalidConfiguration(_))
    ));
    Ok(())
}

/// Test that a missing token is reported by variable name
#[test]
fn test_resolveCredential_withNoSource_shouldNameTheVariable() -> Result<()> {
    let dir = create_temp_dir()?;
    let error = resolve_credential_with(TOKEN_VAR, None, dir.path()).unwrap_err();

    assert!(error.to_string().contains("GREY_PARROT_TOKEN"));
    Ok(())
}
