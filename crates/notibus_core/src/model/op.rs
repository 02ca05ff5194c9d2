//! Change-operation entries delivered to detailed subscribers.

use crate::model::noti::{Notification, PrivId};

raw_code_enum! {
    /// What happened to a stored notification.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum OpKind {
        Insert = 1,
        Update = 2,
        Delete = 3,
        Refresh = 4,
    }
}

/// Field selector for [`NotiOp::data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpDataKind {
    Kind,
    PrivId,
    Record,
    ExtraInfo1,
    ExtraInfo2,
}

/// Value returned by [`NotiOp::data`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpData<'a> {
    Kind(OpKind),
    Int(i32),
    Record(Option<&'a Notification>),
}

/// One entry of a service-reported change batch.
#[derive(Debug, Clone, PartialEq)]
pub struct NotiOp {
    pub kind: OpKind,
    pub priv_id: PrivId,
    /// Present for insert/update entries when the service ships the record.
    pub record: Option<Notification>,
    pub extra_info_1: i32,
    pub extra_info_2: i32,
}

impl NotiOp {
    pub fn new(kind: OpKind, priv_id: PrivId) -> Self {
        Self {
            kind,
            priv_id,
            record: None,
            extra_info_1: 0,
            extra_info_2: 0,
        }
    }

    pub fn with_record(mut self, record: Notification) -> Self {
        self.record = Some(record);
        self
    }

    /// Typed getter keyed on the data kind.
    pub fn data(&self, kind: OpDataKind) -> OpData<'_> {
        match kind {
            OpDataKind::Kind => OpData::Kind(self.kind),
            OpDataKind::PrivId => OpData::Int(self.priv_id),
            OpDataKind::Record => OpData::Record(self.record.as_ref()),
            OpDataKind::ExtraInfo1 => OpData::Int(self.extra_info_1),
            OpDataKind::ExtraInfo2 => OpData::Int(self.extra_info_2),
        }
    }
}

/// Builds delete entries for ids removed by a bulk delete.
pub fn delete_ops(priv_ids: &[PrivId]) -> Vec<NotiOp> {
    priv_ids
        .iter()
        .map(|priv_id| NotiOp::new(OpKind::Delete, *priv_id))
        .collect()
}
