use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use super::DraftRecord;
use crate::errors::PersistenceError;

/// Backend clave-valor de borradores, indexado por `wizard_id`.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Inserta o reemplaza el borrador del wizard.
    async fn save(&self, draft: &DraftRecord) -> Result<(), PersistenceError>;

    async fn load(&self, wizard_id: Uuid) -> Result<Option<DraftRecord>, PersistenceError>;

    /// Elimina el borrador; `true` si existía.
    async fn delete(&self, wizard_id: Uuid) -> Result<bool, PersistenceError>;
}

/// Store en memoria. Guarda el JSON serializado, igual que un backend real,
/// para que los borradores crucen la misma frontera de serialización.
#[derive(Debug, Default)]
pub struct InMemoryDraftStore {
    inner: DashMap<Uuid, Value>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains(&self, wizard_id: Uuid) -> bool {
        self.inner.contains_key(&wizard_id)
    }
}

#[async_trait]
impl DraftStore for InMemoryDraftStore {
    async fn save(&self, draft: &DraftRecord) -> Result<(), PersistenceError> {
        let value = serde_json::to_value(draft)?;
        self.inner.insert(draft.wizard_id, value);
        Ok(())
    }

    async fn load(&self, wizard_id: Uuid) -> Result<Option<DraftRecord>, PersistenceError> {
        let Some(value) = self.inner.get(&wizard_id).map(|v| v.value().clone()) else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(value)?))
    }

    async fn delete(&self, wizard_id: Uuid) -> Result<bool, PersistenceError> {
        Ok(self.inner.remove(&wizard_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use indexmap::IndexMap;
    use serde_json::json;

    fn draft(id: Uuid) -> DraftRecord {
        let mut captured = IndexMap::new();
        captured.insert("personalInfo".to_string(), json!({"firstName": "Ana"}));
        DraftRecord { wizard_id: id,
                      definition_hash: "h".into(),
                      format_version: 1,
                      current_step_id: "details".into(),
                      captured_data: captured,
                      completed_steps: vec!["personalInfo".into()],
                      saved_at: Utc::now() }
    }

    #[tokio::test]
    async fn save_load_delete() {
        let store = InMemoryDraftStore::new();
        let id = Uuid::new_v4();
        assert_eq!(store.load(id).await.expect("load"), None);
        store.save(&draft(id)).await.expect("save");
        let loaded = store.load(id).await.expect("load").expect("present");
        assert_eq!(loaded.current_step_id, "details");
        assert_eq!(loaded.captured_data["personalInfo"], json!({"firstName": "Ana"}));
        assert!(store.delete(id).await.expect("delete"));
        assert!(!store.delete(id).await.expect("delete again"));
        assert!(store.is_empty());
    }
}
