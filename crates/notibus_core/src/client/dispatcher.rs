//! Registry of change callbacks.
//!
//! # Invariants
//! - Subscribers run in registration order, each once per dispatched batch.
//! - Every detailed subscriber of one batch sees the same op slice.
//! - Removal is by token, so two registrations of the same callback are
//!   always distinguishable.

use crate::model::noti::NotiType;
use crate::model::op::NotiOp;
use std::fmt;
use uuid::Uuid;

/// Opaque handle returned on registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(Uuid);

pub type SimpleCallback = Box<dyn FnMut(NotiType)>;
pub type DetailedCallback = Box<dyn FnMut(NotiType, &[NotiOp])>;

enum Subscriber {
    Simple(SimpleCallback),
    Detailed(DetailedCallback),
}

#[derive(Default)]
pub struct ChangeDispatcher {
    entries: Vec<(SubscriptionToken, Subscriber)>,
}

impl fmt::Debug for ChangeDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeDispatcher")
            .field("subscribers", &self.entries.len())
            .finish()
    }
}

impl ChangeDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_simple(&mut self, callback: impl FnMut(NotiType) + 'static) -> SubscriptionToken {
        self.push(Subscriber::Simple(Box::new(callback)))
    }

    pub fn register_detailed(
        &mut self,
        callback: impl FnMut(NotiType, &[NotiOp]) + 'static,
    ) -> SubscriptionToken {
        self.push(Subscriber::Detailed(Box::new(callback)))
    }

    /// Removes one registration; false when the token is unknown.
    pub fn unregister(&mut self, token: SubscriptionToken) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(registered, _)| *registered != token);
        self.entries.len() != before
    }

    /// Invokes every subscriber once; returns how many ran.
    pub fn dispatch(&mut self, kind: NotiType, ops: &[NotiOp]) -> usize {
        for (_, subscriber) in &mut self.entries {
            match subscriber {
                Subscriber::Simple(callback) => callback(kind),
                Subscriber::Detailed(callback) => callback(kind, ops),
            }
        }
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, subscriber: Subscriber) -> SubscriptionToken {
        let token = SubscriptionToken(Uuid::new_v4());
        self.entries.push((token, subscriber));
        token
    }
}
