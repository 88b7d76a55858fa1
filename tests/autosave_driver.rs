use async_trait::async_trait;
use intakeflow::engine::{AcceptAll, DraftRecord, DraftStore, InMemoryDraftStore, PersistenceError, SessionOptions,
                         StepSpec, WizardDefinition, WizardMachine, WizardSession};
use intakeflow::{spawn_autosave, AutosaveSummary};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

fn definition() -> Arc<WizardDefinition> {
    Arc::new(WizardDefinition::builder().step(StepSpec::new("contact", "Contact", AcceptAll))
                                        .step(StepSpec::new("notes", "Notes", AcceptAll))
                                        .build()
                                        .expect("definition"))
}

fn session(store: Arc<dyn DraftStore>) -> Arc<WizardSession> {
    let options = SessionOptions::default().with_autosave_on_advance(false);
    Arc::new(WizardSession::new(WizardMachine::start(definition()), store, options))
}

struct DownStore;

#[async_trait]
impl DraftStore for DownStore {
    async fn save(&self, _draft: &DraftRecord) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("connection refused".into()))
    }

    async fn load(&self, _wizard_id: Uuid) -> Result<Option<DraftRecord>, PersistenceError> {
        Ok(None)
    }

    async fn delete(&self, _wizard_id: Uuid) -> Result<bool, PersistenceError> {
        Ok(false)
    }
}

#[tokio::test(start_paused = true)]
async fn saves_only_changes_and_ends_when_wizard_terminates() {
    let store = Arc::new(InMemoryDraftStore::new());
    let s = session(store.clone());
    let driver = spawn_autosave(s.clone(), Duration::from_secs(30));

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(store.contains(s.wizard_id()));

    s.go_next(json!({"email": "a@b.co"})).await.expect("advance");
    tokio::time::sleep(Duration::from_secs(30)).await;
    let saved = store.load(s.wizard_id()).await.expect("load").expect("draft");
    assert_eq!(saved.current_step_id, "notes");

    s.abandon().await.expect("abandon");
    let summary = driver.join().await.expect("join");
    assert_eq!(summary,
               AutosaveSummary { ticks: 3,
                                 saved: 2,
                                 unchanged: 0,
                                 busy: 0,
                                 failed: 0,
                                 finished_inactive: true });
}

#[tokio::test(start_paused = true)]
async fn stop_returns_counts_so_far() {
    let s = session(Arc::new(InMemoryDraftStore::new()));
    let driver = spawn_autosave(s, Duration::from_secs(30));

    tokio::time::sleep(Duration::from_secs(65)).await;
    assert!(!driver.is_finished());
    let summary = driver.stop().await.expect("stop");
    assert_eq!(summary.ticks, 2);
    assert_eq!(summary.saved, 1);
    assert_eq!(summary.unchanged, 1);
    assert!(!summary.finished_inactive);
}

#[tokio::test(start_paused = true)]
async fn unavailable_store_is_counted_and_retried_next_tick() {
    let s = session(Arc::new(DownStore));
    let driver = spawn_autosave(s.clone(), Duration::from_secs(10));

    tokio::time::sleep(Duration::from_secs(35)).await;
    // la navegación sigue disponible aunque el store esté caído
    s.go_next(json!({"email": "a@b.co"})).await.expect("advance");
    let summary = driver.stop().await.expect("stop");
    assert_eq!(summary.ticks, 3);
    assert_eq!(summary.failed, 3);
    assert_eq!(summary.saved, 0);
}
