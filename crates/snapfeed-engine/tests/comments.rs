mod common;

use uuid::Uuid;

use common::{Harness, StoreCall};
use snapfeed_core::domain::Comment;
use snapfeed_core::ports::{Collection, DocumentStore};
use snapfeed_engine::DomainError;

async fn seed_comment(h: &Harness, post_id: Uuid, text: &str, time: i64) -> Comment {
    let comment = Comment {
        time,
        ..Comment::new(post_id, Some("mira".to_string()), text.to_string())
    };
    h.store
        .inner
        .set(
            Collection::Comments,
            &comment.comment_id.to_string(),
            serde_json::to_value(&comment).unwrap(),
        )
        .await
        .unwrap();
    comment
}

fn texts(comments: &[Comment]) -> Vec<&str> {
    comments.iter().map(|c| c.text.as_str()).collect()
}

#[tokio::test]
async fn test_comments_are_listed_oldest_first() {
    let h = Harness::new();
    let post_id = Uuid::new_v4();
    seed_comment(&h, post_id, "third", 3_000).await;
    seed_comment(&h, post_id, "first", 1_000).await;
    seed_comment(&h, post_id, "second", 2_000).await;

    let comments = h.engine.comments().get_comments(post_id).await.unwrap();

    assert_eq!(texts(&comments), vec!["first", "second", "third"]);
    assert_eq!(h.engine.state().comments.get(), comments);
    assert!(!h.engine.state().comments_loading.get());
}

#[tokio::test]
async fn test_comments_are_filtered_by_post() {
    let h = Harness::new();
    let post_id = Uuid::new_v4();
    seed_comment(&h, post_id, "mine", 1_000).await;
    seed_comment(&h, Uuid::new_v4(), "elsewhere", 2_000).await;

    let comments = h.engine.comments().get_comments(post_id).await.unwrap();

    assert_eq!(texts(&comments), vec!["mine"]);
}

#[tokio::test]
async fn test_add_comment_appends_with_username() {
    let h = Harness::new();
    h.sign_up("jonas").await;
    let post_id = Uuid::new_v4();
    seed_comment(&h, post_id, "nice shot", 1_000).await;

    let comment = h
        .engine
        .comments()
        .add_comment(post_id, "  thanks!  ")
        .await
        .unwrap();

    assert_eq!(comment.text, "thanks!");
    assert_eq!(comment.username.as_deref(), Some("jonas"));
    assert_eq!(comment.post_id, post_id);
    assert_eq!(
        texts(&h.engine.state().comments.get()),
        vec!["nice shot", "thanks!"]
    );
}

#[tokio::test]
async fn test_empty_comment_is_rejected_without_calls() {
    let h = Harness::new();
    h.sign_up("jonas").await;
    let store_calls = h.store.total_calls();

    let result = h.engine.comments().add_comment(Uuid::new_v4(), "   ").await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert_eq!(h.store.total_calls(), store_calls);
    assert_eq!(h.notification().as_deref(), Some("Comment cannot be empty"));
}

#[tokio::test]
async fn test_comment_without_session_signs_out() {
    let h = Harness::new();

    let result = h.engine.comments().add_comment(Uuid::new_v4(), "hello").await;

    assert!(result.unwrap_err().is_auth());
    assert_eq!(h.store.calls(StoreCall::Set), 0);
    assert!(h.engine.state().current_user.get().is_none());
}

#[tokio::test]
async fn test_failed_comment_load_clears_loading() {
    let h = Harness::new();
    h.store.fail(StoreCall::Query);

    let result = h.engine.comments().get_comments(Uuid::new_v4()).await;

    assert!(result.is_err());
    assert!(!h.engine.state().comments_loading.get());
    assert_eq!(
        h.notification().as_deref(),
        Some("Cannot load comments: Connection failed: store unreachable")
    );
}
