//! In-memory document store.
//!
//! Documents are JSON objects kept per collection. Filters evaluate against
//! top-level fields only, which is all the engine queries on.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use snapfeed_core::ports::{
    Collection, Document, DocumentStore, FieldUpdate, Filter, FilterOp, StoreError,
};

type Documents = BTreeMap<String, Value>;

/// Document store backed by a map of collections behind an async RwLock.
///
/// Note: Data is lost on process restart.
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Documents>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Number of documents in a collection.
    pub async fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }

    fn compare(left: &Value, right: &Value) -> Option<Ordering> {
        match (left, right) {
            (Value::Number(l), Value::Number(r)) => match (l.as_i64(), r.as_i64()) {
                (Some(l), Some(r)) => Some(l.cmp(&r)),
                _ => l.as_f64()?.partial_cmp(&r.as_f64()?),
            },
            (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
            _ => None,
        }
    }

    fn matches(data: &Value, filter: &Filter) -> Result<bool, StoreError> {
        let Some(field) = data.get(&filter.field) else {
            return Ok(false);
        };

        let matched = match filter.op {
            FilterOp::Eq => field == &filter.value,
            FilterOp::In => match &filter.value {
                Value::Array(candidates) => candidates.contains(field),
                _ => {
                    return Err(StoreError::Query(format!(
                        "'in' filter on {} needs an array value",
                        filter.field
                    )));
                }
            },
            FilterOp::ArrayContains => field
                .as_array()
                .is_some_and(|items| items.contains(&filter.value)),
            FilterOp::GreaterThan => {
                Self::compare(field, &filter.value) == Some(Ordering::Greater)
            }
        };

        Ok(matched)
    }

    fn merge(target: &mut Value, fields: Map<String, Value>) -> Result<(), StoreError> {
        let object = target
            .as_object_mut()
            .ok_or_else(|| StoreError::Write("document is not an object".to_string()))?;
        object.extend(fields);
        Ok(())
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;

        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    async fn query(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(&collection) else {
            return Ok(Vec::new());
        };

        let mut found = Vec::new();
        for (id, data) in docs {
            if Self::matches(data, &filter)? {
                found.push(Document {
                    id: id.clone(),
                    data: data.clone(),
                });
            }
        }

        tracing::debug!(
            collection = %collection,
            field = %filter.field,
            op = ?filter.op,
            hits = found.len(),
            "Query evaluated"
        );

        Ok(found)
    }

    async fn set(&self, collection: Collection, id: &str, data: Value) -> Result<(), StoreError> {
        if !data.is_object() {
            return Err(StoreError::Write(format!("{collection}/{id} is not an object")));
        }

        let mut collections = self.collections.write().await;
        collections
            .entry(collection)
            .or_default()
            .insert(id.to_string(), data);

        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound(format!("{collection}/{id}")))?;

        Self::merge(doc, fields)
    }

    async fn batch_update(
        &self,
        collection: Collection,
        updates: Vec<FieldUpdate>,
    ) -> Result<(), StoreError> {
        if updates.is_empty() {
            return Ok(());
        }

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        // Check every target before touching any of them
        for update in &updates {
            match docs.get(&update.id) {
                Some(doc) if doc.is_object() => {}
                Some(_) => {
                    return Err(StoreError::Write(format!(
                        "{collection}/{} is not an object",
                        update.id
                    )));
                }
                None => {
                    return Err(StoreError::NotFound(format!("{collection}/{}", update.id)));
                }
            }
        }

        let count = updates.len();
        for update in updates {
            if let Some(doc) = docs.get_mut(&update.id) {
                let mut fields = Map::new();
                fields.insert(update.field, update.value);
                Self::merge(doc, fields)?;
            }
        }

        tracing::debug!(collection = %collection, count, "Batch committed");
        Ok(())
    }
}
