//! Per-group badge counters stored in `noti_group_data`.
//!
//! # Invariants
//! - At most one badge row exists per `(caller_package, group_id)`.
//! - `refresh_badges` replaces a package's rows atomically; any failure rolls
//!   the whole refresh back.

use crate::error::{NotiError, NotiResult};
use crate::model::noti::{GroupId, GROUP_ID_NONE};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

/// Repository interface for group badge rows.
pub trait BadgeRepository {
    fn set_badge(&mut self, package: &str, group_id: GroupId, badge: i32) -> NotiResult<()>;
    /// Stored badge, or `None` when the group has no row.
    fn get_badge(&self, package: &str, group_id: GroupId) -> NotiResult<Option<i32>>;
    fn delete_badges(&mut self, package: &str) -> NotiResult<usize>;
    /// Recomputes every badge of `package` from the stored notifications.
    fn refresh_badges(&mut self, package: &str) -> NotiResult<usize>;
}

pub struct SqliteBadgeRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteBadgeRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl BadgeRepository for SqliteBadgeRepository<'_> {
    fn set_badge(&mut self, package: &str, group_id: GroupId, badge: i32) -> NotiResult<()> {
        if group_id == GROUP_ID_NONE {
            return Err(NotiError::invalid("badge requires a group id"));
        }
        if badge < 0 {
            return Err(NotiError::invalid("badge cannot be negative"));
        }
        self.conn.execute(
            "INSERT INTO noti_group_data (caller_package, group_id, badge)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(caller_package, group_id) DO UPDATE SET badge = excluded.badge;",
            params![package, group_id, badge],
        )?;
        Ok(())
    }

    fn get_badge(&self, package: &str, group_id: GroupId) -> NotiResult<Option<i32>> {
        let badge = self
            .conn
            .query_row(
                "SELECT badge FROM noti_group_data WHERE caller_package = ?1 AND group_id = ?2;",
                params![package, group_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(badge)
    }

    fn delete_badges(&mut self, package: &str) -> NotiResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM noti_group_data WHERE caller_package = ?1;",
            [package],
        )?;
        Ok(deleted)
    }

    fn refresh_badges(&mut self, package: &str) -> NotiResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "DELETE FROM noti_group_data WHERE caller_package = ?1;",
            [package],
        )?;

        let counts: Vec<(GroupId, i32)> = {
            let mut stmt = tx.prepare(
                "SELECT group_id, COUNT(*)
                 FROM noti_list
                 WHERE caller_package = ?1 AND group_id != ?2
                 GROUP BY group_id
                 ORDER BY group_id ASC;",
            )?;
            let rows = stmt.query_map(params![package, GROUP_ID_NONE], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
            rows.collect::<Result<_, _>>()?
        };

        {
            let mut insert = tx.prepare(
                "INSERT INTO noti_group_data (caller_package, group_id, badge)
                 VALUES (?1, ?2, ?3);",
            )?;
            for (group_id, badge) in &counts {
                insert.execute(params![package, group_id, badge])?;
            }
        }
        tx.commit()?;

        info!(
            "event=badge_refresh module=repo status=ok package={} groups={}",
            package,
            counts.len()
        );
        Ok(counts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::{BadgeRepository, SqliteBadgeRepository};
    use crate::db::open_db_in_memory;

    #[test]
    fn set_badge_overwrites_existing_row() {
        let mut conn = open_db_in_memory().unwrap();
        let mut repo = SqliteBadgeRepository::new(&mut conn);
        repo.set_badge("org.example.badge", 3, 1).unwrap();
        repo.set_badge("org.example.badge", 3, 5).unwrap();
        assert_eq!(repo.get_badge("org.example.badge", 3).unwrap(), Some(5));
        assert_eq!(repo.get_badge("org.example.badge", 4).unwrap(), None);
    }

    #[test]
    fn negative_badge_is_rejected() {
        let mut conn = open_db_in_memory().unwrap();
        let mut repo = SqliteBadgeRepository::new(&mut conn);
        let err = repo.set_badge("org.example.badge", 1, -1).unwrap_err();
        assert_eq!(err.code(), "invalid_parameter");
    }
}
