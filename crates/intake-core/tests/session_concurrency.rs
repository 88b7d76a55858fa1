use async_trait::async_trait;
use intake_core::{AcceptAll, AutosaveOutcome, DraftRecord, DraftStore, InMemoryDraftStore, JsonAssembler,
                  PersistenceError, SessionOptions, StepOutcome, StepSpec, SubmissionError, SubmitReceipt, Submitter,
                  WizardDefinition, WizardError, WizardMachine, WizardSession, WizardStatus};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

fn definition() -> Arc<WizardDefinition> {
    Arc::new(WizardDefinition::builder().step(StepSpec::new("contact", "Contact", AcceptAll))
                                        .step(StepSpec::new("notes", "Notes", AcceptAll).optional())
                                        .build()
                                        .expect("definition"))
}

/// Store que tarda `delay` en cada operación.
struct SlowStore {
    delay: Duration,
    inner: InMemoryDraftStore,
}

#[async_trait]
impl DraftStore for SlowStore {
    async fn save(&self, draft: &DraftRecord) -> Result<(), PersistenceError> {
        tokio::time::sleep(self.delay).await;
        self.inner.save(draft).await
    }

    async fn load(&self, wizard_id: Uuid) -> Result<Option<DraftRecord>, PersistenceError> {
        self.inner.load(wizard_id).await
    }

    async fn delete(&self, wizard_id: Uuid) -> Result<bool, PersistenceError> {
        self.inner.delete(wizard_id).await
    }
}

struct DownStore;

#[async_trait]
impl DraftStore for DownStore {
    async fn save(&self, _draft: &DraftRecord) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("connection refused".into()))
    }

    async fn load(&self, _wizard_id: Uuid) -> Result<Option<DraftRecord>, PersistenceError> {
        Err(PersistenceError::Unavailable("connection refused".into()))
    }

    async fn delete(&self, _wizard_id: Uuid) -> Result<bool, PersistenceError> {
        Err(PersistenceError::Unavailable("connection refused".into()))
    }
}

/// Submitter que responde con `response` y cuenta las llamadas.
struct ScriptedSubmitter {
    calls: AtomicUsize,
    response: Result<SubmitReceipt, SubmissionError>,
    delay: Duration,
}

impl ScriptedSubmitter {
    fn ok() -> Self {
        Self { calls: AtomicUsize::new(0),
               response: Ok(SubmitReceipt { status: 201,
                                            body: json!({"id": "c-1"}) }),
               delay: Duration::ZERO }
    }

    fn rejecting() -> Self {
        Self { calls: AtomicUsize::new(0),
               response: Err(SubmissionError::Rejected { status: 422,
                                                         error: "Invalid phone".into(),
                                                         details: None }),
               delay: Duration::ZERO }
    }
}

#[async_trait]
impl Submitter for ScriptedSubmitter {
    async fn submit(&self, _body: &Value) -> Result<SubmitReceipt, SubmissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.response.clone()
    }
}

#[tokio::test(start_paused = true)]
async fn autosave_tick_skips_while_an_operation_holds_the_session() {
    let store = Arc::new(SlowStore { delay: Duration::from_secs(1),
                                     inner: InMemoryDraftStore::new() });
    let session = Arc::new(WizardSession::new(WizardMachine::start(definition()), store, SessionOptions::default()));

    let busy = session.clone();
    let handle = tokio::spawn(async move { busy.save_draft().await });
    tokio::task::yield_now().await;

    assert_eq!(session.autosave_tick().await, AutosaveOutcome::Busy);
    handle.await.expect("join").expect("save");
    assert_eq!(session.autosave_tick().await, AutosaveOutcome::Unchanged);
}

#[tokio::test(start_paused = true)]
async fn slow_store_times_out_and_state_stays_put() {
    let store = Arc::new(SlowStore { delay: Duration::from_secs(30),
                                     inner: InMemoryDraftStore::new() });
    let options = SessionOptions::default().with_persistence_timeout(Duration::from_millis(200))
                                           .with_autosave_on_advance(false);
    let session = WizardSession::new(WizardMachine::start(definition()), store, options);
    let before = session.state().await;

    let err = session.save_draft().await.expect_err("timeout");
    assert!(matches!(err, WizardError::Timeout { operation: "save_draft", after_ms: 200 }));
    assert_eq!(session.state().await, before);
    assert_eq!(session.event_variants().await, vec!["S", "F"]);
}

#[tokio::test]
async fn unavailable_store_never_blocks_navigation() {
    let session = WizardSession::new(WizardMachine::start(definition()), Arc::new(DownStore), SessionOptions::default());
    let advance = session.go_next(json!({"email": "a@b.co"})).await.expect("advance despite store failure");
    assert!(!advance.is_rejected());
    assert!(matches!(advance.autosave_error, Some(WizardError::Persistence(PersistenceError::Unavailable(_)))));
    assert_eq!(session.state().await.current_step_id(), "notes");
    assert_eq!(session.event_variants().await, vec!["S", "C", "F"]);
    assert!(matches!(session.autosave_tick().await, AutosaveOutcome::Failed { .. }));
    assert!(matches!(session.save_draft().await, Err(WizardError::Persistence(PersistenceError::Unavailable(_)))));
}

#[tokio::test]
async fn rejected_submission_keeps_wizard_editable() {
    let session = WizardSession::new(WizardMachine::start(definition()),
                                     Arc::new(InMemoryDraftStore::new()),
                                     SessionOptions::default());
    session.go_next(json!({"email": "a@b.co"})).await.expect("contact");
    let submitter = ScriptedSubmitter::rejecting();

    let err = session.submit(&JsonAssembler::default(), &submitter).await.expect_err("rejected");
    assert!(matches!(err, WizardError::Submission(SubmissionError::Rejected { status: 422, .. })));
    assert_eq!(session.status().await, WizardStatus::InProgress);
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.event_variants().await.last(), Some(&"E"));
    session.go_previous().await.expect("still editable");
}

#[tokio::test]
async fn successful_submission_is_terminal_and_clears_draft() {
    let store = Arc::new(InMemoryDraftStore::new());
    let session = WizardSession::new(WizardMachine::start(definition()), store.clone(), SessionOptions::default());
    session.go_next(json!({"email": "a@b.co"})).await.expect("contact");
    assert!(store.contains(session.wizard_id()));

    let submitter = ScriptedSubmitter::ok();
    let outcome = session.submit(&JsonAssembler::default(), &submitter).await.expect("submit");
    assert_eq!(outcome.receipt.status, 201);
    assert_eq!(outcome.object, json!({"contact": {"email": "a@b.co"}}));
    assert_eq!(outcome.fingerprint, intake_core::hashing::hash_value(&outcome.object));
    assert_eq!(session.status().await, WizardStatus::Submitted);
    assert!(!store.contains(session.wizard_id()));

    let before = serde_json::to_vec(&session.state().await).expect("ser");
    let events = session.events().await.len();
    let again = session.submit(&JsonAssembler::default(), &submitter).await.expect_err("terminal");
    assert!(again.is_invalid_state());
    assert!(session.go_next(json!({"notes": "late"})).await.expect_err("terminal").is_invalid_state());
    assert!(session.go_previous().await.expect_err("terminal").is_invalid_state());
    assert!(session.jump_to("contact").await.expect_err("terminal").is_invalid_state());
    assert!(session.save_draft().await.expect_err("terminal").is_invalid_state());
    assert!(session.abandon().await.expect_err("terminal").is_invalid_state());
    assert_eq!(session.autosave_tick().await, AutosaveOutcome::Inactive);
    assert_eq!(serde_json::to_vec(&session.state().await).expect("ser"), before);
    assert_eq!(session.events().await.len(), events);
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn submission_timeout_leaves_state_in_progress() {
    let session = WizardSession::new(WizardMachine::start(definition()),
                                     Arc::new(InMemoryDraftStore::new()),
                                     SessionOptions::default().with_submission_timeout(Duration::from_secs(2)));
    session.go_next(json!({"email": "a@b.co"})).await.expect("contact");
    let submitter = ScriptedSubmitter { delay: Duration::from_secs(60),
                                        ..ScriptedSubmitter::ok() };
    let err = session.submit(&JsonAssembler::default(), &submitter).await.expect_err("timeout");
    assert!(err.is_timeout());
    assert_eq!(session.status().await, WizardStatus::InProgress);
}

#[tokio::test(start_paused = true)]
async fn concurrent_advances_queue_without_lost_updates() {
    let store = Arc::new(SlowStore { delay: Duration::from_secs(1),
                                     inner: InMemoryDraftStore::new() });
    let session = Arc::new(WizardSession::new(WizardMachine::start(definition()), store.clone(), SessionOptions::default()));
    let a = session.clone();
    let b = session.clone();
    let first = tokio::spawn(async move { a.go_next(json!({"email": "a@b.co"})).await });
    tokio::task::yield_now().await;
    // la primera operación está guardando; la segunda queda en cola
    let second = tokio::spawn(async move { b.go_next(json!({"text": "call after 5pm"})).await });

    let first = first.await.expect("join").expect("contact");
    let second = second.await.expect("join").expect("notes");
    assert!(matches!(&first.outcome, StepOutcome::Advanced { to, .. } if to == "notes"));
    assert!(matches!(second.outcome, StepOutcome::ReadyToSubmit { .. }));
    assert!(first.autosave_error.is_none() && second.autosave_error.is_none());

    let state = session.state().await;
    assert_eq!(state.completed_steps().iter().map(String::as_str).collect::<Vec<_>>(), vec!["contact", "notes"]);
    assert_eq!(state.payload("contact"), Some(&json!({"email": "a@b.co"})));
    assert_eq!(state.payload("notes"), Some(&json!({"text": "call after 5pm"})));
    assert_eq!(session.event_variants().await, vec!["S", "C", "D", "C", "D"]);

    let saved = store.load(session.wizard_id()).await.expect("load").expect("draft");
    assert_eq!(saved.completed_steps, vec!["contact".to_string(), "notes".to_string()]);
}
