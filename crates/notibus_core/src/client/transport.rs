//! Seam to the out-of-process notification service.

use crate::codec::wire::WireDict;
use crate::error::{NotiError, NotiResult};
use crate::model::noti::{GroupId, NotiType, PrivId};
use crate::model::op::NotiOp;

/// One request sent to the service. Records travel as wire dictionaries.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceRequest {
    Insert(WireDict),
    Update(WireDict),
    DeleteByPrivId {
        package: String,
        priv_id: PrivId,
    },
    DeleteAllByType {
        package: Option<String>,
        kind: NotiType,
    },
    Count {
        kind: Option<NotiType>,
        package: Option<String>,
        group_id: GroupId,
        priv_id: PrivId,
    },
    GroupingList {
        kind: Option<NotiType>,
        count: i32,
    },
    DetailList {
        package: String,
        group_id: GroupId,
        priv_id: PrivId,
        count: i32,
    },
    GetByPrivId {
        package: String,
        priv_id: PrivId,
    },
}

impl ServiceRequest {
    /// Stable name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::DeleteByPrivId { .. } => "delete_by_priv_id",
            Self::DeleteAllByType { .. } => "delete_all_by_type",
            Self::Count { .. } => "count",
            Self::GroupingList { .. } => "grouping_list",
            Self::DetailList { .. } => "detail_list",
            Self::GetByPrivId { .. } => "get_by_priv_id",
        }
    }
}

/// Successful service reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceReply {
    /// Id assigned by insert, or confirmed by update.
    PrivId(PrivId),
    Count(i64),
    Deleted(Vec<PrivId>),
    Records(Vec<WireDict>),
    Record(Option<WireDict>),
}

impl ServiceReply {
    pub(crate) fn into_priv_id(self) -> NotiResult<PrivId> {
        match self {
            Self::PrivId(priv_id) => Ok(priv_id),
            other => Err(unexpected("priv_id", &other)),
        }
    }

    pub(crate) fn into_count(self) -> NotiResult<i64> {
        match self {
            Self::Count(count) => Ok(count),
            other => Err(unexpected("count", &other)),
        }
    }

    pub(crate) fn into_deleted(self) -> NotiResult<Vec<PrivId>> {
        match self {
            Self::Deleted(priv_ids) => Ok(priv_ids),
            other => Err(unexpected("deleted", &other)),
        }
    }

    pub(crate) fn into_records(self) -> NotiResult<Vec<WireDict>> {
        match self {
            Self::Records(records) => Ok(records),
            other => Err(unexpected("records", &other)),
        }
    }

    pub(crate) fn into_record(self) -> NotiResult<Option<WireDict>> {
        match self {
            Self::Record(record) => Ok(record),
            other => Err(unexpected("record", &other)),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::PrivId(_) => "priv_id",
            Self::Count(_) => "count",
            Self::Deleted(_) => "deleted",
            Self::Records(_) => "records",
            Self::Record(_) => "record",
        }
    }
}

fn unexpected(expected: &str, reply: &ServiceReply) -> NotiError {
    NotiError::InvalidData(format!(
        "expected `{expected}` reply, got `{}`",
        reply.kind_name()
    ))
}

/// Presence and change events reported by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceEvent {
    Appeared,
    Vanished,
    Changed { kind: NotiType, ops: Vec<NotiOp> },
}

/// Completion for [`ServiceTransport::call_async`], run by the transport's
/// event loop.
pub type Completion = Box<dyn FnOnce(NotiResult<ServiceReply>)>;

/// Transport used by [`super::NotiClient`].
///
/// Delivery failures map to `Io`, authorization failures to
/// `PermissionDenied`.
pub trait ServiceTransport {
    /// Announces this client to a (re)appeared service.
    fn register_client(&mut self) -> NotiResult<()>;

    /// Starts or stops presence watching.
    fn watch_presence(&mut self, enabled: bool) -> NotiResult<()>;

    fn call(&mut self, request: ServiceRequest) -> NotiResult<ServiceReply>;

    fn call_async(&mut self, request: ServiceRequest, completion: Completion) -> NotiResult<()>;
}
