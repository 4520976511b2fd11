/*!
 * End-to-end tests: scan → reconcile → replace → pull
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;

use crate::common::{
    create_temp_dir, create_test_file, default_project_config, init_test_logging,
};
use greyparrot::app_config::TOKEN_VAR;
use greyparrot::database::Repository;
use greyparrot::errors::AppError;
use greyparrot::providers::mock::MockProvider;
use greyparrot::reconcile::LocalSheet;
use greyparrot::{Controller, TransOptions};

const SAMPLE: &str = "const a = $tt('Hello world'); const b = $tt('Hello world');";

fn local_service(provider: MockProvider, languages: &[&str]) -> Result<Arc<LocalSheet>> {
    Ok(Arc::new(LocalSheet::new(
        Repository::new_in_memory()?,
        Arc::new(provider),
        languages.iter().map(|l| l.to_string()).collect(),
    )))
}

fn stub_backend() -> MockProvider {
    MockProvider::working().with_custom_response(|_| {
        "```yaml\nentries:\n  - key: hello_world\n    translations:\n      en: Hello world\n```"
            .to_string()
    })
}

/// Test the full scenario from a single file with a repeated text
#[tokio::test]
async fn test_trans_withReplace_shouldRewriteBothCallSitesAndPull() -> Result<()> {
    init_test_logging();
    let dir = create_temp_dir()?;
    let source = create_test_file(dir.path(), "src/app.ts", SAMPLE)?;
    let config = default_project_config(dir.path())?;
    let provider = stub_backend();
    let controller = Controller::with_service(config, local_service(provider.clone(), &["en"])?);

    let outcome = controller
        .trans(TransOptions {
            replace: true,
            local: false,
        })
        .await?;

    assert_eq!(outcome.scan.total_matches(), 2);
    assert_eq!(outcome.scan.index.len(), 1);
    let locations = outcome.scan.index.locations("Hello world");
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].line, locations[1].line);

    assert_eq!(outcome.entries.len(), 1);
    assert_eq!(outcome.entries[0].key, "hello_world");
    assert_eq!(provider.request_count(), 1);
    assert!(provider.prompts()[0].user.contains("1. Hello world"));

    assert_eq!(
        fs::read_to_string(&source)?,
        "const a = $t('hello_world'); const b = $t('hello_world');"
    );
    let summary = outcome.replacement.expect("replacement summary");
    assert_eq!(summary.replacements, 2);
    assert_eq!(summary.files_changed, 1);

    let en: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("locales/en.json"))?)?;
    assert_eq!(en["hello_world"], "Hello world");
    Ok(())
}

/// Test that without --replace sources stay untouched but locale files are written
#[tokio::test]
async fn test_trans_withoutReplace_shouldOnlyPull() -> Result<()> {
    let dir = create_temp_dir()?;
    let source = create_test_file(dir.path(), "src/app.ts", SAMPLE)?;
    create_test_file(dir.path(), "src/view.vue", "<b>{{ $tt('Cancel') }}</b>")?;
    let config = default_project_config(dir.path())?;
    let controller =
        Controller::with_service(config, local_service(MockProvider::working(), &["en", "fr"])?);

    let outcome = controller.trans(TransOptions::default()).await?;

    assert!(outcome.replacement.is_none());
    assert_eq!(fs::read_to_string(&source)?, SAMPLE);
    assert_eq!(outcome.locale_files.len(), 2);

    let fr: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("locales/fr.json"))?)?;
    assert_eq!(fr["cancel"], "[fr] Cancel");
    assert_eq!(fr["hello_world"], "[fr] Hello world");
    Ok(())
}

/// Test that a second run reuses the stored entries without calling the backend
#[tokio::test]
async fn test_trans_runTwice_shouldReuseStoredEntries() -> Result<()> {
    let dir = create_temp_dir()?;
    create_test_file(dir.path(), "src/app.ts", "$tt('Save'); $tt('Open')")?;
    let config = default_project_config(dir.path())?;
    let provider = MockProvider::working();
    let controller =
        Controller::with_service(config, local_service(provider.clone(), &["en"])?);

    let first = controller.trans(TransOptions::default()).await?;
    let second = controller.trans(TransOptions::default()).await?;

    assert_eq!(provider.request_count(), 1);
    assert_eq!(first.entries, second.entries);
    Ok(())
}

/// Test that a failed AI stage aborts the run and leaves sources untouched
#[tokio::test]
async fn test_trans_withMalformedBackend_shouldFailWithoutReplacing() -> Result<()> {
    init_test_logging();
    let dir = create_temp_dir()?;
    let source = create_test_file(dir.path(), "src/app.ts", SAMPLE)?;
    let config = default_project_config(dir.path())?;
    let controller =
        Controller::with_service(config, local_service(MockProvider::malformed(), &["en"])?);

    let result = controller
        .trans(TransOptions {
            replace: true,
            local: false,
        })
        .await;

    assert!(matches!(result, Err(AppError::Reconciliation(_))));
    assert_eq!(fs::read_to_string(&source)?, SAMPLE);
    assert!(!dir.path().join("locales").exists());
    Ok(())
}

/// Test that a project with no marked texts needs no sheet service at all
#[tokio::test]
async fn test_trans_withNoMarkedTexts_shouldStopAfterScan() -> Result<()> {
    let dir = create_temp_dir()?;
    create_test_file(dir.path(), "src/app.ts", "console.log('plain');")?;
    let config = default_project_config(dir.path())?;

    let outcome = Controller::new(config).trans(TransOptions::default()).await?;

    assert!(outcome.entries.is_empty());
    assert!(outcome.locale_files.is_empty());
    Ok(())
}

/// Test that the token is only required once a network call is due
#[tokio::test]
async fn test_trans_withoutToken_shouldFailAfterScanning() -> Result<()> {
    if std::env::var(TOKEN_VAR).is_ok() {
        return Ok(());
    }
    let dir = create_temp_dir()?;
    create_test_file(dir.path(), "src/app.ts", SAMPLE)?;
    let controller = Controller::new(default_project_config(dir.path())?);

    let scan = controller.run_scan().await?;
    assert_eq!(scan.index.len(), 1);

    let result = controller.trans(TransOptions::default()).await;
    assert!(matches!(result, Err(AppError::MissingCredential(var)) if var == TOKEN_VAR));
    Ok(())
}

/// Test that a missing scan directory is an I/O error
#[tokio::test]
async fn test_scan_withMissingScanDir_shouldBeIoError() -> Result<()> {
    let dir = create_temp_dir()?;
    let controller = Controller::new(default_project_config(dir.path())?);

    assert!(matches!(controller.scan().await, Err(AppError::Io { .. })));
    Ok(())
}
