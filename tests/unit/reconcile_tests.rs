/*!
 * Tests for key allocation and reuse priority during reconciliation
 */

use anyhow::Result;
use std::sync::Arc;

use greyparrot::database::repository::translations;
use greyparrot::database::{NewEntry, Repository};
use greyparrot::providers::mock::MockProvider;
use greyparrot::reconcile::{KeyAllocator, LocalSheet, Reconciler, SheetService};

/// Test that a taken key and its first suffix push the candidate to `_2`
#[test]
fn test_keyAllocator_withGreetingAndGreeting1Taken_shouldResolveGreeting2() {
    let mut keys = KeyAllocator::new(vec!["greeting".to_string(), "greeting_1".to_string()]);
    assert_eq!(keys.allocate("greeting"), "greeting_2");
    assert_eq!(keys.allocate("greeting"), "greeting_3");
}

/// Test that same-sheet reuse wins over other-sheet reuse
#[tokio::test]
async fn test_reconcile_withSameAndOtherSheetSave_shouldReturnSaveAction() -> Result<()> {
    let repo = Repository::new_in_memory()?;
    repo.ensure_sheet("app", "app", &["en".to_string()]).await?;
    repo.ensure_sheet("shop", "shop", &["en".to_string()]).await?;
    repo.insert_entry(&NewEntry::new("app", "save_action", "Save", translations([("en", "Save")])))
        .await?;
    repo.insert_entry(&NewEntry::new("shop", "btn_save", "Save", translations([("en", "Save")])))
        .await?;

    let provider = MockProvider::working();
    let service = LocalSheet::new(repo.clone(), Arc::new(provider.clone()), vec!["en".to_string()]);
    let result = service.reconcile("app", &["Save".to_string()], "en").await?;

    assert!(result.success);
    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].key, "save_action");
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

/// Test that other-sheet candidates and AI entries share one collision space
#[tokio::test]
async fn test_reconcile_withForeignAndGeneratedKeysColliding_shouldSuffixInOrder() -> Result<()> {
    let repo = Repository::new_in_memory()?;
    repo.ensure_sheet("app", "app", &["en".to_string()]).await?;
    repo.ensure_sheet("shop", "shop", &["en".to_string()]).await?;
    repo.insert_entry(&NewEntry::new("app", "ok", "Fine", translations([("en", "Fine")])))
        .await?;
    repo.insert_entry(&NewEntry::new("shop", "ok", "Okay", translations([("en", "Okay")])))
        .await?;

    let provider = MockProvider::working().with_custom_response(|_| {
        "entries:\n  - key: ok\n    translations:\n      en: OK\n".to_string()
    });
    let reconciler = Reconciler::new(repo.clone(), Arc::new(provider));

    let result = reconciler
        .reconcile(&["Okay".to_string(), "OK".to_string()], "en", "app")
        .await?;

    let keys: Vec<&str> = result.entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["ok_1", "ok_2"]);
    assert_eq!(repo.sheet_keys("app").await?.len(), 3);
    Ok(())
}

/// Test that a stub backend answer is used verbatim for new texts
#[tokio::test]
async fn test_reconcile_withStubBackendAnswer_shouldReturnItsKey() -> Result<()> {
    let repo = Repository::new_in_memory()?;
    let provider = MockProvider::working().with_custom_response(|_| {
        r#"{entries: [{key: "hello_world", translations: {en: "Hello world"}}]}"#.to_string()
    });
    let service = LocalSheet::new(repo, Arc::new(provider), vec!["en".to_string()]);

    let result = service
        .reconcile("demo", &["Hello world".to_string()], "en")
        .await?;

    assert!(result.success);
    assert_eq!(result.entries[0].key, "hello_world");
    assert_eq!(result.entries[0].translations["en"], "Hello world");
    Ok(())
}

/// Test that an empty backend answer fails the whole batch without persisting
#[tokio::test]
async fn test_reconcile_withEmptyBackendAnswer_shouldFailAtomically() -> Result<()> {
    let repo = Repository::new_in_memory()?;
    let service = LocalSheet::new(repo.clone(), Arc::new(MockProvider::empty()), vec![]);

    let result = service
        .reconcile("demo", &["One".to_string(), "Two".to_string()], "en")
        .await?;

    assert!(!result.success);
    assert!(result.into_entries().is_err());
    assert!(repo.list_entries("demo").await?.is_empty());
    Ok(())
}
