//! Local notification store façade.
//!
//! # Responsibility
//! - Open one connection per call from [`StoreConfig`], run the requested
//!   operation through the service layer, and close it again.
//! - Apply the configured SIM status and delete burst to every query.
//!
//! # Invariants
//! - No connection outlives the call that opened it.
//! - Multi-statement operations stay inside the repository transaction of
//!   their single call.

use crate::config::StoreConfig;
use crate::db::open_db;
use crate::error::NotiResult;
use crate::model::noti::{GroupId, NotiType, Notification, PrivId, TextSlot};
use crate::model::op::NotiOp;
use crate::model::text::Localizer;
use crate::repo::badge_repo::{BadgeRepository, SqliteBadgeRepository};
use crate::repo::noti_repo::{
    CountQuery, DeleteScope, DetailQuery, NotiFilter, SqliteNotiRepository,
};
use crate::service::noti_service::NotiService;
use rusqlite::Connection;

/// Store bound to one database file; cheap to clone and hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotiStore {
    config: StoreConfig,
}

impl NotiStore {
    pub fn new(config: StoreConfig) -> NotiResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn insert(&self, noti: &mut Notification) -> NotiResult<NotiOp> {
        self.with_service(|service| service.insert(noti))
    }

    pub fn update(&self, noti: &Notification) -> NotiResult<NotiOp> {
        self.with_service(|service| service.update(noti))
    }

    pub fn delete_by_priv_id(
        &self,
        package: Option<&str>,
        priv_id: PrivId,
        scope: DeleteScope,
    ) -> NotiResult<Vec<NotiOp>> {
        self.with_service(|service| service.delete_by_priv_id(package, priv_id, scope))
    }

    pub fn delete_by_type(
        &self,
        package: Option<&str>,
        kind: Option<NotiType>,
    ) -> NotiResult<Vec<NotiOp>> {
        self.with_service(|service| service.delete_by_type(package, kind))
    }

    pub fn delete_by_group(&self, package: &str, group_id: GroupId) -> NotiResult<Vec<NotiOp>> {
        self.with_service(|service| service.delete_by_group(package, group_id))
    }

    /// Counts rows by `(type, package, group_id, priv_id)`.
    pub fn count(
        &self,
        kind: Option<NotiType>,
        package: Option<&str>,
        group_id: GroupId,
        priv_id: PrivId,
    ) -> NotiResult<i64> {
        let query = CountQuery {
            filter: self.filter(kind, package),
            group_id,
            priv_id,
        };
        self.with_service(|service| service.count(&query))
    }

    /// Latest record of every display group; `count == -1` is unbounded.
    pub fn grouping_list(
        &self,
        kind: Option<NotiType>,
        package: Option<&str>,
        count: i32,
    ) -> NotiResult<Vec<Notification>> {
        let filter = self.filter(kind, package);
        self.with_service(|service| service.grouping_list(&filter, count))
    }

    pub fn detail_list(
        &self,
        package: &str,
        group_id: GroupId,
        priv_id: PrivId,
        count: i32,
    ) -> NotiResult<Vec<Notification>> {
        let query = DetailQuery {
            package: package.to_string(),
            group_id,
            priv_id,
            count,
            sim: self.config.sim,
        };
        self.with_service(|service| service.detail_list(&query))
    }

    pub fn get_by_priv_id(
        &self,
        package: Option<&str>,
        priv_id: PrivId,
    ) -> NotiResult<Option<Notification>> {
        self.with_service(|service| service.get_by_priv_id(package, priv_id))
    }

    pub fn get_by_tag(&self, package: &str, tag: &str) -> NotiResult<Option<Notification>> {
        self.with_service(|service| service.get_by_tag(package, tag))
    }

    pub fn set_badge(&self, package: &str, group_id: GroupId, badge: i32) -> NotiResult<()> {
        let mut conn = self.open()?;
        SqliteBadgeRepository::new(&mut conn).set_badge(package, group_id, badge)
    }

    pub fn get_badge(&self, package: &str, group_id: GroupId) -> NotiResult<Option<i32>> {
        let mut conn = self.open()?;
        SqliteBadgeRepository::new(&mut conn).get_badge(package, group_id)
    }

    pub fn refresh_badges(&self, package: &str) -> NotiResult<usize> {
        let mut conn = self.open()?;
        SqliteBadgeRepository::new(&mut conn).refresh_badges(package)
    }

    pub fn delete_badges(&self, package: &str) -> NotiResult<usize> {
        let mut conn = self.open()?;
        SqliteBadgeRepository::new(&mut conn).delete_badges(package)
    }

    /// Renders one text slot capped at the configured text limit.
    pub fn render_text(
        &self,
        noti: &Notification,
        slot: TextSlot,
        localizer: &dyn Localizer,
    ) -> Option<String> {
        noti.text_with_limit(slot, localizer, self.config.text_limit)
    }

    fn filter(&self, kind: Option<NotiType>, package: Option<&str>) -> NotiFilter {
        NotiFilter {
            package: package.map(str::to_string),
            kind,
            sim: self.config.sim,
        }
    }

    fn open(&self) -> NotiResult<Connection> {
        Ok(open_db(&self.config.db_path)?)
    }

    fn with_service<T>(
        &self,
        op: impl FnOnce(&mut NotiService<SqliteNotiRepository<'_>>) -> NotiResult<T>,
    ) -> NotiResult<T> {
        let mut conn = self.open()?;
        let repo = SqliteNotiRepository::with_delete_burst(&mut conn, self.config.delete_burst)?;
        let mut service = NotiService::new(repo);
        op(&mut service)
    }
}
