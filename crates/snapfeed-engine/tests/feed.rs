mod common;

use std::sync::{Arc, Mutex};

use chrono::TimeDelta;
use common::{Harness, StoreCall, post_ids};
use snapfeed_core::ports::FilterOp;
use snapfeed_engine::EngineConfig;

#[tokio::test]
async fn test_following_nobody_shows_general_feed() {
    let h = Harness::new();
    h.sign_up("jonas").await;
    let mira = h.seed_user("mira").await;
    let recent = h.seed_post(&mira, "fresh", 2).await;
    h.seed_post(&mira, "stale", 30).await;

    let personalized = h.engine.feed().get_personalized_feed().await.unwrap();
    let general = h.engine.feed().get_general_feed().await.unwrap();

    assert_eq!(personalized, general);
    assert_eq!(post_ids(&general), vec![recent.post_id]);
    assert_eq!(h.engine.state().feed_posts.get(), general);
}

#[tokio::test]
async fn test_followed_posts_preferred_even_when_old() {
    let h = Harness::new();
    h.sign_up("jonas").await;
    let mira = h.seed_user("mira").await;
    let stranger = h.seed_user("leo").await;
    let old = h.seed_post(&mira, "throwback", 72).await;
    let older = h.seed_post(&mira, "way back", 200).await;
    h.seed_post(&stranger, "brand new", 0).await;

    h.engine.social().toggle_follow(&mira).await.unwrap();
    let feed = h.engine.feed().get_personalized_feed().await.unwrap();

    assert_eq!(post_ids(&feed), vec![old.post_id, older.post_id]);
    assert_eq!(h.engine.state().feed_posts.get(), feed);
}

#[tokio::test]
async fn test_followed_users_without_posts_fall_back() {
    let h = Harness::new();
    h.sign_up("jonas").await;
    let mira = h.seed_user("mira").await;
    let leo = h.seed_user("leo").await;
    let recent = h.seed_post(&leo, "hello", 1).await;

    h.engine.social().toggle_follow(&mira).await.unwrap();
    let feed = h.engine.feed().get_personalized_feed().await.unwrap();

    assert_eq!(post_ids(&feed), vec![recent.post_id]);
}

#[tokio::test]
async fn test_loading_flag_spans_the_fallback() {
    let h = Harness::new();
    h.sign_up("jonas").await;
    let mira = h.seed_user("mira").await;
    h.engine.social().toggle_follow(&mira).await.unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let loading = h.engine.state().feed_loading.subscribe();
    let probe_seen = seen.clone();
    h.store.on_query(move |filter| {
        if matches!(filter.op, FilterOp::In | FilterOp::GreaterThan) {
            probe_seen.lock().unwrap().push(*loading.borrow());
        }
    });

    h.engine.feed().get_personalized_feed().await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![true, true]);
    assert!(!h.engine.state().feed_loading.get());
}

#[tokio::test]
async fn test_general_feed_respects_configured_window() {
    let h = Harness::with_config(EngineConfig {
        feed_window: TimeDelta::hours(2),
        ..EngineConfig::default()
    });
    h.sign_up("jonas").await;
    let mira = h.seed_user("mira").await;
    let inside = h.seed_post(&mira, "inside", 1).await;
    h.seed_post(&mira, "outside", 3).await;

    let feed = h.engine.feed().get_general_feed().await.unwrap();

    assert_eq!(post_ids(&feed), vec![inside.post_id]);
}

#[tokio::test]
async fn test_general_feed_failure_is_reported() {
    let h = Harness::new();
    h.sign_up("jonas").await;
    h.store.fail(StoreCall::Query);

    let result = h.engine.feed().get_general_feed().await;

    assert!(result.is_err());
    assert!(!h.engine.state().feed_loading.get());
    assert_eq!(
        h.notification().as_deref(),
        Some("Not possible to get general feed: Connection failed: store unreachable")
    );
}

#[tokio::test]
async fn test_personalized_failure_does_not_fall_back() {
    let h = Harness::new();
    h.sign_up("jonas").await;
    let mira = h.seed_user("mira").await;
    let post = h.seed_post(&mira, "kept", 1).await;
    h.engine.social().toggle_follow(&mira).await.unwrap();
    let queries = h.store.calls(StoreCall::Query);
    h.store.fail(StoreCall::Query);

    let result = h.engine.feed().get_personalized_feed().await;

    assert!(result.is_err());
    assert_eq!(h.store.calls(StoreCall::Query), queries + 1);
    assert_eq!(post_ids(&h.engine.state().feed_posts.get()), vec![post.post_id]);
    assert_eq!(
        h.notification().as_deref(),
        Some("Cannot get personalized feed: Connection failed: store unreachable")
    );
}
