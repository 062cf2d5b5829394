//! Single-slot, consumable notification events.

use std::sync::atomic::{AtomicBool, Ordering};

/// A payload that is handed out once.
///
/// The same event is shared by every subscriber, so whichever reader consumes
/// it first wins and later reads see nothing. Use [`Event::peek`] to look
/// without consuming.
#[derive(Debug)]
pub struct Event<T> {
    content: T,
    handled: AtomicBool,
}

impl<T> Event<T> {
    pub fn new(content: T) -> Self {
        Self {
            content,
            handled: AtomicBool::new(false),
        }
    }

    /// Returns the content the first time only.
    pub fn consume(&self) -> Option<&T> {
        if self.handled.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(&self.content)
        }
    }

    pub fn peek(&self) -> &T {
        &self.content
    }

    pub fn is_handled(&self) -> bool {
        self.handled.load(Ordering::Acquire)
    }
}
