use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::warn;

use crate::meals::model::Meal;

pub const MEALS_KEY: &str = "nutritrack.meals";

/// Durable key-value persistence for saved meals and settings. Last write
/// wins; callers degrade failures to the prior state or a default.
#[async_trait]
pub trait MealStore: Send + Sync {
    async fn get_all(&self) -> anyhow::Result<Vec<Meal>>;
    async fn save(&self, meal: &Meal) -> anyhow::Result<()>;
    async fn delete_by_id(&self, id: &str) -> anyhow::Result<()>;
    async fn get_setting(&self, key: &str) -> anyhow::Result<Option<Value>>;
    async fn set_setting(&self, key: &str, value: Value) -> anyhow::Result<()>;
}

fn meals_from_doc(doc: &Map<String, Value>) -> Vec<Meal> {
    match doc.get(MEALS_KEY) {
        None => Vec::new(),
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(meals) => meals,
            Err(e) => {
                warn!(error = %e, "stored meals are malformed, treating as empty");
                Vec::new()
            }
        },
    }
}

fn put_meals(doc: &mut Map<String, Value>, meals: &[Meal]) -> anyhow::Result<()> {
    let value = serde_json::to_value(meals).context("serialize meals")?;
    doc.insert(MEALS_KEY.to_string(), value);
    Ok(())
}

/// Single JSON document on disk. A missing or malformed file reads as empty
/// and is overwritten by the next successful write.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_document(&self) -> Map<String, Value> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "failed to read data file");
                return Map::new();
            }
        };
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "data file is not a JSON object, starting empty");
                Map::new()
            }
        }
    }

    async fn write_document(&self, doc: Map<String, Value>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .context("create data directory")?;
            }
        }
        let body = serde_json::to_vec_pretty(&Value::Object(doc)).context("serialize data file")?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("write data file {}", self.path.display()))
    }
}

#[async_trait]
impl MealStore for FileStore {
    async fn get_all(&self) -> anyhow::Result<Vec<Meal>> {
        Ok(meals_from_doc(&self.read_document().await))
    }

    async fn save(&self, meal: &Meal) -> anyhow::Result<()> {
        let mut doc = self.read_document().await;
        let mut meals = meals_from_doc(&doc);
        // newest first, like the home screen expects
        meals.insert(0, meal.clone());
        put_meals(&mut doc, &meals)?;
        self.write_document(doc).await
    }

    async fn delete_by_id(&self, id: &str) -> anyhow::Result<()> {
        let mut doc = self.read_document().await;
        let mut meals = meals_from_doc(&doc);
        meals.retain(|m| m.id != id);
        put_meals(&mut doc, &meals)?;
        self.write_document(doc).await
    }

    async fn get_setting(&self, key: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.read_document().await.get(key).cloned())
    }

    async fn set_setting(&self, key: &str, value: Value) -> anyhow::Result<()> {
        let mut doc = self.read_document().await;
        doc.insert(key.to_string(), value);
        self.write_document(doc).await
    }
}

/// In-memory store with the same contract; backs `AppState::fake` and tests.
#[derive(Default)]
pub struct MemoryStore {
    doc: Mutex<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MealStore for MemoryStore {
    async fn get_all(&self) -> anyhow::Result<Vec<Meal>> {
        let doc = self.doc.lock().await;
        Ok(meals_from_doc(&doc))
    }

    async fn save(&self, meal: &Meal) -> anyhow::Result<()> {
        let mut doc = self.doc.lock().await;
        let mut meals = meals_from_doc(&doc);
        meals.insert(0, meal.clone());
        put_meals(&mut doc, &meals)
    }

    async fn delete_by_id(&self, id: &str) -> anyhow::Result<()> {
        let mut doc = self.doc.lock().await;
        let mut meals = meals_from_doc(&doc);
        meals.retain(|m| m.id != id);
        put_meals(&mut doc, &meals)
    }

    async fn get_setting(&self, key: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.doc.lock().await.get(key).cloned())
    }

    async fn set_setting(&self, key: &str, value: Value) -> anyhow::Result<()> {
        self.doc.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::meals::model::MealType;

    fn meal(at: time::OffsetDateTime) -> Meal {
        Meal::new(MealType::Lunch, Vec::new(), at)
    }

    #[tokio::test]
    async fn file_store_round_trips_newest_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("data.json"));

        assert!(store.get_all().await.expect("read").is_empty());

        let first = meal(datetime!(2025-08-06 08:00:00 UTC));
        let second = meal(datetime!(2025-08-06 12:00:00 UTC));
        store.save(&first).await.expect("save first");
        store.save(&second).await.expect("save second");

        let meals = store.get_all().await.expect("read");
        assert_eq!(meals, vec![second, first]);
    }

    #[tokio::test]
    async fn malformed_file_reads_empty_and_is_overwritten() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.json");
        tokio::fs::write(&path, b"{{{not json")
            .await
            .expect("write garbage");

        let store = FileStore::new(&path);
        assert!(store.get_all().await.expect("read").is_empty());

        let saved = meal(datetime!(2025-08-06 12:00:00 UTC));
        store.save(&saved).await.expect("save");
        assert_eq!(store.get_all().await.expect("read"), vec![saved]);
    }

    #[tokio::test]
    async fn non_array_meals_value_reads_empty() {
        let store = MemoryStore::new();
        store
            .set_setting(MEALS_KEY, serde_json::json!("oops"))
            .await
            .expect("set");
        assert!(store.get_all().await.expect("read").is_empty());
    }

    #[tokio::test]
    async fn delete_removes_by_id_and_ignores_unknown() {
        let store = MemoryStore::new();
        let keep = meal(datetime!(2025-08-06 08:00:00 UTC));
        let gone = meal(datetime!(2025-08-06 12:00:00 UTC));
        store.save(&keep).await.expect("save");
        store.save(&gone).await.expect("save");

        store.delete_by_id(&gone.id).await.expect("delete");
        assert_eq!(store.get_all().await.expect("read"), vec![keep.clone()]);

        store.delete_by_id("unknown").await.expect("delete unknown");
        assert_eq!(store.get_all().await.expect("read"), vec![keep]);
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("nested").join("data.json"));

        assert_eq!(store.get_setting("missing").await.expect("get"), None);
        store
            .set_setting("nutritrack.dailyCalorieGoal", serde_json::json!(1800))
            .await
            .expect("set");
        assert_eq!(
            store
                .get_setting("nutritrack.dailyCalorieGoal")
                .await
                .expect("get"),
            Some(serde_json::json!(1800))
        );
    }
}
