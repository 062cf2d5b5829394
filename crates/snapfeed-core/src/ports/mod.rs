//! Ports - trait definitions for the remote collaborators.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod blob_storage;
mod document_store;

pub use auth::{AuthError, AuthProvider, PasswordService, SessionTokenService};
pub use blob_storage::{BlobStorage, StorageError, StoredRef};
pub use document_store::{
    Collection, Document, DocumentStore, FieldUpdate, Filter, FilterOp, StoreError,
};
