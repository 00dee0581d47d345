// SPDX-License-Identifier: GPL-3.0-or-later

//! Push subscriptions with explicit cancellation.
//!
//! A [`Subscription`] is a stream of full-replacement values: every item is
//! the complete, authoritative state of its source and must replace whatever
//! the consumer held before. Nothing is a delta.
//!
//! Cancellation goes through a [`SubscriptionHandle`], which is cheap to clone
//! and idempotent: the teardown runs at most once no matter how many clones
//! call [`SubscriptionHandle::unsubscribe`].

use futures::Stream;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::mpsc;

type Teardown = Box<dyn FnOnce() + Send + 'static>;

/// Idempotent cancellation handle for a live subscription.
#[derive(Clone)]
pub struct SubscriptionHandle {
    teardown: Arc<Mutex<Option<Teardown>>>,
}

impl SubscriptionHandle {
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Arc::new(Mutex::new(Some(Box::new(teardown)))),
        }
    }

    /// A handle with nothing to tear down.
    pub fn noop() -> Self {
        Self {
            teardown: Arc::new(Mutex::new(None)),
        }
    }

    /// Release the subscription. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        let teardown = self
            .teardown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(teardown) = teardown {
            teardown();
        }
    }

    pub fn is_active(&self) -> bool {
        self.teardown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Stream of full-replacement updates from one data source.
pub struct Subscription<T> {
    updates: mpsc::UnboundedReceiver<T>,
    handle: SubscriptionHandle,
}

impl<T> Subscription<T> {
    pub fn new(updates: mpsc::UnboundedReceiver<T>, handle: SubscriptionHandle) -> Self {
        Self { updates, handle }
    }

    /// Create a subscription fed through the returned sender. `teardown` runs
    /// once when the subscription is released.
    pub fn channel(
        teardown: impl FnOnce() + Send + 'static,
    ) -> (mpsc::UnboundedSender<T>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx, SubscriptionHandle::new(teardown)))
    }

    pub fn handle(&self) -> SubscriptionHandle {
        self.handle.clone()
    }

    /// Wait for the next update. `None` once the source has closed.
    pub async fn next_update(&mut self) -> Option<T> {
        self.updates.recv().await
    }

    pub fn into_parts(self) -> (mpsc::UnboundedReceiver<T>, SubscriptionHandle) {
        (self.updates, self.handle)
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.updates.poll_recv(cx)
    }
}
