//! Core of the notification client library.
//!
//! Records are composed here, serialized with the wire codec for the
//! notification service, or persisted directly in the local SQLite store.

pub mod client;
pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod list;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use client::{NotiClient, ServiceEvent, ServiceReply, ServiceRequest, ServiceTransport};
pub use codec::tag::{decode_tag, encode_tag, TextTag};
pub use codec::wire::{decode, decode_list, encode, WireDict, WireValue};
pub use config::{ProcessIdentity, SimStatus, StoreConfig};
pub use error::{NotiError, NotiResult};
pub use list::{NodeId, NotiList};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::bundle::Bundle;
pub use model::noti::{
    DisplayApplist, ExecuteSlot, GroupId, ImageSlot, Layout, LedOperation, NotiType,
    Notification, PrivId, PropertyFlags, SoundType, TextSlot, VibrationType, GROUP_ID_DEFAULT,
    GROUP_ID_NONE, PRIV_ID_NONE,
};
pub use model::op::{NotiOp, OpData, OpDataKind, OpKind};
pub use model::text::{CountPosition, FormatArg, Localizer, NoLocalizer};
pub use repo::noti_repo::DeleteScope;
pub use store::NotiStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
