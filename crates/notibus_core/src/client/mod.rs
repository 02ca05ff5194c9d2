//! Client side of the notification service.
//!
//! # Responsibility
//! - Hold per-client state in one [`NotiClient`] value instead of
//!   process-wide globals.
//! - Tolerate the service starting after the client through deferred tasks.

pub mod context;
pub mod deferred;
pub mod dispatcher;
pub mod monitor;
pub mod transport;

pub use context::NotiClient;
pub use deferred::{DeferredTaskQueue, TaskToken};
pub use dispatcher::{ChangeDispatcher, SubscriptionToken};
pub use monitor::ReadinessMonitor;
pub use transport::{Completion, ServiceEvent, ServiceReply, ServiceRequest, ServiceTransport};
