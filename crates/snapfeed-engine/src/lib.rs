//! # Snapfeed Engine
//!
//! Sits between the presentation layer and the remote collaborators. It owns
//! every piece of mutable client state, sequences the remote calls behind each
//! user intent and publishes the results through [`AppState`].
//!
//! The UI only ever talks to an [`Engine`]: it calls operations on the
//! component handles and subscribes to the observable fields.

pub mod config;
pub mod guard;
pub mod notification;
pub mod state;

mod comments;
mod context;
mod engine;
mod feed;
mod posts;
mod profile;
mod social;
mod upload;

pub use comments::CommentRepository;
pub use config::EngineConfig;
pub use engine::Engine;
pub use feed::FeedComposer;
pub use guard::Operation;
pub use notification::Event;
pub use posts::PostRepository;
pub use profile::ProfileManager;
pub use social::SocialGraph;
pub use state::{AppState, Observable, ProgressFlag};

pub use snapfeed_core::DomainError;
