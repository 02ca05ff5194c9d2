//! Notification use-case service.
//!
//! # Responsibility
//! - Provide stable store entry points for core callers.
//! - Translate repository outcomes into change operations for subscribers.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Every successful write yields the ops a dispatcher needs to report it.

use crate::error::NotiResult;
use crate::model::noti::{GroupId, NotiType, Notification, PrivId};
use crate::model::op::{delete_ops, NotiOp, OpKind};
use crate::repo::noti_repo::{CountQuery, DeleteScope, DetailQuery, NotiFilter, NotiRepository};

/// Use-case service wrapper for notification persistence.
pub struct NotiService<R: NotiRepository> {
    repo: R,
}

impl<R: NotiRepository> NotiService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts `noti`, writing assigned ids back into it.
    ///
    /// Returns the insert op carrying a copy of the stored record.
    pub fn insert(&mut self, noti: &mut Notification) -> NotiResult<NotiOp> {
        let priv_id = self.repo.insert(noti)?;
        Ok(NotiOp::new(OpKind::Insert, priv_id).with_record(noti.clone()))
    }

    pub fn update(&mut self, noti: &Notification) -> NotiResult<NotiOp> {
        self.repo.update(noti)?;
        Ok(NotiOp::new(OpKind::Update, noti.priv_id()).with_record(noti.clone()))
    }

    pub fn delete_by_priv_id(
        &mut self,
        package: Option<&str>,
        priv_id: PrivId,
        scope: DeleteScope,
    ) -> NotiResult<Vec<NotiOp>> {
        let outcome = self.repo.delete_by_priv_id(package, priv_id, scope)?;
        Ok(delete_ops(&outcome.priv_ids))
    }

    pub fn delete_by_type(
        &mut self,
        package: Option<&str>,
        kind: Option<NotiType>,
    ) -> NotiResult<Vec<NotiOp>> {
        let outcome = self.repo.delete_by_type(package, kind)?;
        Ok(delete_ops(&outcome.priv_ids))
    }

    pub fn delete_by_group(&mut self, package: &str, group_id: GroupId) -> NotiResult<Vec<NotiOp>> {
        let outcome = self.repo.delete_by_group(package, group_id)?;
        Ok(delete_ops(&outcome.priv_ids))
    }

    pub fn count(&self, query: &CountQuery) -> NotiResult<i64> {
        self.repo.count(query)
    }

    pub fn grouping_list(&self, filter: &NotiFilter, count: i32) -> NotiResult<Vec<Notification>> {
        self.repo.grouping_list(filter, count)
    }

    pub fn detail_list(&self, query: &DetailQuery) -> NotiResult<Vec<Notification>> {
        self.repo.detail_list(query)
    }

    pub fn get_by_priv_id(
        &self,
        package: Option<&str>,
        priv_id: PrivId,
    ) -> NotiResult<Option<Notification>> {
        self.repo.get_by_priv_id(package, priv_id)
    }

    pub fn get_by_tag(&self, package: &str, tag: &str) -> NotiResult<Option<Notification>> {
        self.repo.get_by_tag(package, tag)
    }
}

#[cfg(test)]
mod tests {
    use super::NotiService;
    use crate::config::ProcessIdentity;
    use crate::db::open_db_in_memory;
    use crate::model::noti::{NotiType, Notification, TextSlot};
    use crate::model::op::OpKind;
    use crate::repo::noti_repo::{DeleteScope, SqliteNotiRepository};

    #[test]
    fn writes_report_matching_ops() {
        let mut conn = open_db_in_memory().unwrap();
        let mut service = NotiService::new(SqliteNotiRepository::new(&mut conn));
        let identity = ProcessIdentity::new("org.example.service", 0);
        let mut noti = Notification::new(NotiType::Transient, &identity);
        noti.set_text(TextSlot::Title, Some("hello"), None);

        let inserted = service.insert(&mut noti).unwrap();
        assert_eq!(inserted.kind, OpKind::Insert);
        assert_eq!(inserted.priv_id, noti.priv_id());
        assert_eq!(inserted.record.as_ref(), Some(&noti));

        let updated = service.update(&noti).unwrap();
        assert_eq!(updated.kind, OpKind::Update);

        let deleted = service
            .delete_by_priv_id(Some("org.example.service"), noti.priv_id(), DeleteScope::Single)
            .unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].kind, OpKind::Delete);
        assert_eq!(deleted[0].priv_id, noti.priv_id());
    }
}
