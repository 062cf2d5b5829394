//! Observable application state.
//!
//! Every field is backed by a `tokio::sync::watch` channel. The presentation
//! layer reads the latest value or subscribes for changes; only the engine can
//! write.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

use snapfeed_core::domain::{Comment, Post, User};

use crate::notification::Event;

/// A single observable value.
#[derive(Debug)]
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> Observable<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Latest published value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Receive every future change.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    pub(crate) fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub(crate) fn modify(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Loading flag that stays `true` while at least one holder is active.
///
/// Nested work (a user load that triggers a feed refresh, a feed that falls
/// back to the general query) keeps the flag up without flickering.
#[derive(Debug, Default)]
pub struct ProgressFlag {
    active: Mutex<usize>,
    value: Observable<bool>,
}

impl ProgressFlag {
    pub fn get(&self) -> bool {
        self.value.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.value.subscribe()
    }

    pub(crate) fn begin(&self) -> ProgressGuard<'_> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        *active += 1;
        if *active == 1 {
            self.value.set(true);
        }
        ProgressGuard { flag: self }
    }

    fn end(&self) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        *active = active.saturating_sub(1);
        if *active == 0 {
            self.value.set(false);
        }
    }
}

/// Clears its flag when dropped, on success and failure paths alike.
#[must_use = "the flag resets as soon as the guard is dropped"]
pub(crate) struct ProgressGuard<'a> {
    flag: &'a ProgressFlag,
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        self.flag.end();
    }
}

/// Everything the presentation layer can observe.
#[derive(Debug, Default)]
pub struct AppState {
    pub signed_in: Observable<bool>,
    pub in_progress: ProgressFlag,
    pub current_user: Observable<Option<User>>,
    pub notification: Observable<Option<Arc<Event<String>>>>,

    pub posts: Observable<Vec<Post>>,
    pub posts_loading: ProgressFlag,

    pub searched_posts: Observable<Vec<Post>>,
    pub search_loading: ProgressFlag,

    pub feed_posts: Observable<Vec<Post>>,
    pub feed_loading: ProgressFlag,

    pub comments: Observable<Vec<Comment>>,
    pub comments_loading: ProgressFlag,

    pub followers: Observable<usize>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the loaded profile, if any.
    pub fn current_user_id(&self) -> Option<String> {
        self.current_user
            .get()
            .map(|user| user.user_id)
            .filter(|id| !id.is_empty())
    }

    /// Message of the latest notification, consumed or not.
    pub fn last_notification(&self) -> Option<String> {
        self.notification.get().map(|event| event.peek().clone())
    }

    /// Replace any unseen notification with a new one.
    pub(crate) fn notify(&self, message: impl Into<String>) {
        self.notification.set(Some(Arc::new(Event::new(message.into()))));
    }

    /// Apply a confirmed liker set to every cached copy of a post.
    pub(crate) fn apply_likes(&self, post: &Post) {
        for list in [&self.posts, &self.feed_posts, &self.searched_posts] {
            list.modify(|posts| {
                for cached in posts.iter_mut().filter(|p| p.post_id == post.post_id) {
                    cached.likes = post.likes.clone();
                }
            });
        }
    }

    /// Forget everything tied to the signed-in user.
    pub(crate) fn clear_session(&self) {
        self.signed_in.set(false);
        self.current_user.set(None);
        self.posts.set(Vec::new());
        self.searched_posts.set(Vec::new());
        self.feed_posts.set(Vec::new());
        self.comments.set(Vec::new());
        self.followers.set(0);
    }
}
