//! Remote document store port.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Collections the engine reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Posts,
    Comments,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Posts => "posts",
            Collection::Comments => "comments",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored document: its id plus the JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    /// Decode the body into a typed entity.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| StoreError::Decode(format!("{}: {}", self.id, e)))
    }
}

/// Comparison applied by a query filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Field equals the value.
    Eq,
    /// Field equals any element of the array value.
    In,
    /// Array field contains the value.
    ArrayContains,
    /// Field is strictly greater than the value.
    GreaterThan,
}

/// Single-field query filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    pub fn is_in(field: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(field, FilterOp::In, values)
    }

    pub fn array_contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::ArrayContains, value)
    }

    pub fn greater_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::GreaterThan, value)
    }
}

/// One entry of an atomic batch: set `field` to `value` on document `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    pub id: String,
    pub field: String,
    pub value: Value,
}

/// Remote document store - collection-scoped reads and writes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document by id.
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;

    /// All documents matching a single-field filter, in no particular order.
    async fn query(&self, collection: Collection, filter: Filter)
    -> Result<Vec<Document>, StoreError>;

    /// Create or replace a document.
    async fn set(&self, collection: Collection, id: &str, data: Value) -> Result<(), StoreError>;

    /// Overwrite the given top-level fields of an existing document.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Apply every update or none of them. An empty batch is a no-op.
    async fn batch_update(
        &self,
        collection: Collection,
        updates: Vec<FieldUpdate>,
    ) -> Result<(), StoreError>;
}

/// Document store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Malformed document {0}")]
    Decode(String),

    #[error("Write rejected: {0}")]
    Write(String),
}
