//! # Snapfeed Sandbox
//!
//! Runs the engine against in-memory backends and walks through a full
//! session: two accounts, posting, search, feed, follows, likes and comments,
//! then an app restart that restores the session from its token.

use std::sync::Arc;

use anyhow::Context;
use tokio::task::JoinHandle;

use snapfeed_core::domain::ProfilePatch;
use snapfeed_engine::{Engine, Event};
use snapfeed_infra::{InMemoryAuthProvider, InMemoryBlobStorage, InMemoryDocumentStore};

mod config;
mod telemetry;

use config::SandboxConfig;
use telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = SandboxConfig::from_env();
    init_telemetry(&config.telemetry);

    let auth = Arc::new(InMemoryAuthProvider::from_env());
    let store = Arc::new(InMemoryDocumentStore::new());
    let blobs = Arc::new(InMemoryBlobStorage::from_env());

    let engine = Engine::new(
        auth.clone(),
        store.clone(),
        blobs.clone(),
        config.engine.clone(),
    );
    let notifications = spawn_notification_log(&engine);

    let restored = engine.start().await?;
    tracing::info!(restored = restored.is_some(), "Engine started");

    let friend = seed_friend(&engine).await?;
    walkthrough(&engine, &config, &friend).await?;

    let token = auth
        .session_token()
        .await
        .context("session should be active after the walkthrough")?;

    drop(engine);
    notifications.await?;

    // A fresh provider only knows the persisted token, as after a relaunch
    let relaunched_auth = Arc::new(InMemoryAuthProvider::from_env());
    relaunched_auth.restore_session(token).await;
    let relaunched = Engine::new(relaunched_auth, store, blobs, config.engine);

    let user = relaunched
        .start()
        .await?
        .context("session token was not accepted")?;
    tracing::info!(user_id = %user.user_id, handle = ?user.display_handle(), "Session restored");
    log_state(&relaunched);

    relaunched.profiles().sign_out().await;
    tracing::info!(
        signed_in = relaunched.state().signed_in.get(),
        "Sandbox finished"
    );
    Ok(())
}

/// Log every notification once, the way a toast would show it.
fn spawn_notification_log(engine: &Engine) -> JoinHandle<()> {
    let mut rx = engine.state().notification.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let event = rx.borrow_and_update().clone();
            if let Some(message) = event.as_deref().and_then(Event::consume) {
                tracing::info!(%message, "Notification");
            }
        }
    })
}

/// A second account with one post, so there is someone to follow.
async fn seed_friend(engine: &Engine) -> anyhow::Result<String> {
    let profiles = engine.profiles();
    let friend = profiles
        .sign_up("mira", "mira@snapfeed.test", "mira-password")
        .await?;

    engine
        .posts()
        .create_post(sample_image(1), "Golden hour at the beach", |post| {
            tracing::debug!(post_id = %post.post_id, "Friend post ready")
        })
        .await?;

    profiles.sign_out().await;
    Ok(friend.user_id)
}

async fn walkthrough(engine: &Engine, config: &SandboxConfig, friend: &str) -> anyhow::Result<()> {
    let profiles = engine.profiles();
    let posts = engine.posts();

    profiles
        .sign_up(&config.username, &config.email(), &config.password)
        .await?;
    profiles
        .create_or_update_profile(ProfilePatch {
            name: Some("Jonas".to_string()),
            bio: Some("Shooting film on weekends".to_string()),
            ..ProfilePatch::default()
        })
        .await?;
    let user = profiles.upload_profile_image(sample_image(2)).await?;
    tracing::info!(image_url = ?user.image_url, "Profile image set");

    posts
        .create_post(sample_image(3), "My first #beach sunset!", |post| {
            tracing::info!(terms = ?post.search_terms, "Post indexed")
        })
        .await?;
    posts
        .create_post(sample_image(4), "Coffee and a good book", |_| {})
        .await?;

    let found = posts.search_posts("Beach").await?;
    tracing::info!(matches = found.len(), "Searched for beach");

    let feed = engine.feed().get_personalized_feed().await?;
    tracing::info!(posts = feed.len(), "Feed before following anyone");

    engine.social().toggle_follow(friend).await?;
    let mut feed = engine.feed().get_personalized_feed().await?;
    tracing::info!(posts = feed.len(), "Feed after following");

    if let Some(post) = feed.first_mut() {
        posts.toggle_like(post).await?;
        tracing::info!(likes = post.likes.len(), "Liked friend's post");

        let comments = engine.comments();
        comments.add_comment(post.post_id, "Stunning light").await?;
        let thread = comments.get_comments(post.post_id).await?;
        tracing::info!(comments = thread.len(), "Comment thread loaded");
    }

    engine.social().refresh_followers().await?;
    log_state(engine);
    Ok(())
}

fn log_state(engine: &Engine) {
    let state = engine.state();
    tracing::info!(
        signed_in = state.signed_in.get(),
        user = ?state.current_user_id(),
        own_posts = state.posts.get().len(),
        feed = state.feed_posts.get().len(),
        followers = state.followers.get(),
        "State"
    );
}

/// Stand-in JPEG bytes; the in-memory storage only cares that they are non-empty.
fn sample_image(seed: u8) -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, seed]
}
