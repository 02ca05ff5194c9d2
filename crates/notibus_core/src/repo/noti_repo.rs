//! Notification repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Insert/update/delete notification rows and resolve their display group.
//! - Build filtered count, grouping-list and detail-list queries.
//!
//! # Invariants
//! - `priv_id` is the row id; it is assigned once by insert and never reused.
//! - `caller_package`, `group_id`, `internal_group_id` and `insert_time` are
//!   written by insert only; update never touches them.
//! - A record that starts a new group anchors `internal_group_id` to its own
//!   `priv_id`.
//! - Bulk deletes select candidate ids and delete them in bursts inside one
//!   immediate transaction, so the select and the deletes see the same rows.

use crate::config::{SimStatus, DEFAULT_DELETE_BURST};
use crate::error::{NotiError, NotiResult};
use crate::model::bundle::{self, Bundle};
use crate::model::noti::{
    now_epoch_secs, DisplayApplist, ExecuteSlot, GroupId, LedOperation, Layout, NotiType,
    Notification, PrivId, PropertyFlags, SoundType, VibrationType, GROUP_ID_DEFAULT,
    GROUP_ID_NONE, PRIV_ID_NONE,
};
use crate::model::text::FormatArgs;
use log::{debug, error, info};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior,
};
use std::time::Instant;

const NOTI_SELECT_SQL: &str = "SELECT
    type,
    layout,
    caller_package,
    launch_package,
    image_path,
    group_id,
    internal_group_id,
    priv_id,
    text,
    key,
    format_args,
    domain,
    dir,
    time,
    insert_time,
    execute_labels,
    responding_bundle,
    single_launch_bundle,
    multi_launch_bundle,
    sound_type,
    sound_path,
    vibration_type,
    vibration_path,
    led_operation,
    led_argb,
    led_on_ms,
    led_off_ms,
    flags_for_property,
    display_applist,
    progress_size,
    progress_percentage,
    ongoing_flag,
    auto_remove,
    tag,
    uid
FROM noti_list";

/// Row filters shared by count and list queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotiFilter {
    pub package: Option<String>,
    pub kind: Option<NotiType>,
    /// With `SimStatus::Absent`, SIM-mode-only rows are excluded.
    pub sim: SimStatus,
}

/// Count request: by package/type, or by one resolved group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountQuery {
    pub filter: NotiFilter,
    /// `GROUP_ID_NONE` counts every matching row.
    pub group_id: GroupId,
    /// When set (with a group), the group is resolved from this row.
    pub priv_id: PrivId,
}

impl Default for CountQuery {
    fn default() -> Self {
        Self {
            filter: NotiFilter::default(),
            group_id: GROUP_ID_NONE,
            priv_id: PRIV_ID_NONE,
        }
    }
}

/// Detail-list request scoped to one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailQuery {
    pub package: String,
    pub group_id: GroupId,
    pub priv_id: PrivId,
    /// Maximum rows; `-1` means unbounded.
    pub count: i32,
    pub sim: SimStatus,
}

impl DetailQuery {
    pub fn for_package(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            group_id: GROUP_ID_NONE,
            priv_id: PRIV_ID_NONE,
            count: -1,
            sim: SimStatus::Present,
        }
    }
}

/// Whether a by-id delete removes one row or its whole display group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteScope {
    #[default]
    Single,
    Group,
}

/// Ids removed by a delete, in ascending order, and the statements used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub priv_ids: Vec<PrivId>,
    pub batches: usize,
}

impl DeleteOutcome {
    pub fn count(&self) -> usize {
        self.priv_ids.len()
    }
}

/// Repository interface for notification rows.
pub trait NotiRepository {
    /// Persists a new record and writes the assigned ids back into it.
    fn insert(&mut self, noti: &mut Notification) -> NotiResult<PrivId>;
    /// Rewrites the mutable columns of an existing row.
    fn update(&mut self, noti: &Notification) -> NotiResult<()>;
    fn delete_by_type(
        &mut self,
        package: Option<&str>,
        kind: Option<NotiType>,
    ) -> NotiResult<DeleteOutcome>;
    fn delete_by_group(&mut self, package: &str, group_id: GroupId) -> NotiResult<DeleteOutcome>;
    fn delete_by_priv_id(
        &mut self,
        package: Option<&str>,
        priv_id: PrivId,
        scope: DeleteScope,
    ) -> NotiResult<DeleteOutcome>;
    fn count(&self, query: &CountQuery) -> NotiResult<i64>;
    /// Latest row of each display group, newest group first.
    fn grouping_list(&self, filter: &NotiFilter, count: i32) -> NotiResult<Vec<Notification>>;
    fn detail_list(&self, query: &DetailQuery) -> NotiResult<Vec<Notification>>;
    fn get_by_priv_id(
        &self,
        package: Option<&str>,
        priv_id: PrivId,
    ) -> NotiResult<Option<Notification>>;
    fn get_by_tag(&self, package: &str, tag: &str) -> NotiResult<Option<Notification>>;
}

/// SQLite-backed notification repository.
pub struct SqliteNotiRepository<'conn> {
    conn: &'conn mut Connection,
    delete_burst: usize,
}

impl<'conn> SqliteNotiRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self {
            conn,
            delete_burst: DEFAULT_DELETE_BURST,
        }
    }

    /// Uses `delete_burst` ids per batched delete statement.
    pub fn with_delete_burst(conn: &'conn mut Connection, delete_burst: usize) -> NotiResult<Self> {
        if delete_burst == 0 {
            return Err(NotiError::invalid("delete burst must be positive"));
        }
        Ok(Self { conn, delete_burst })
    }

    fn delete_selected(
        &mut self,
        operation: &str,
        select_sql: &str,
        binds: Vec<Value>,
    ) -> NotiResult<DeleteOutcome> {
        let started_at = Instant::now();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let priv_ids = select_ids(&tx, select_sql, binds)?;
        let batches = delete_ids(&tx, &priv_ids, self.delete_burst)?;
        tx.commit()?;

        info!(
            "event=noti_delete module=repo status=ok op={} deleted={} batches={} duration_ms={}",
            operation,
            priv_ids.len(),
            batches,
            started_at.elapsed().as_millis()
        );
        Ok(DeleteOutcome { priv_ids, batches })
    }
}

impl NotiRepository for SqliteNotiRepository<'_> {
    fn insert(&mut self, noti: &mut Notification) -> NotiResult<PrivId> {
        let started_at = Instant::now();
        let package = noti
            .caller_package
            .clone()
            .filter(|package| !package.is_empty())
            .ok_or_else(|| NotiError::invalid("caller package is required to insert"))?;
        let title_key = noti.title_key().map(str::to_string);
        let insert_time = now_epoch_secs();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let matched_group = find_group(&tx, &package, noti.group_id, title_key.as_deref())?;
        let provisional_group = match matched_group {
            Some(internal_group_id) => internal_group_id,
            None => next_internal_group_id(&tx)?,
        };

        let mut columns = mutable_columns(noti, title_key.as_deref());
        columns.extend([
            ("caller_package", Value::Text(package.clone())),
            ("group_id", Value::Integer(i64::from(noti.group_id))),
            (
                "internal_group_id",
                Value::Integer(i64::from(provisional_group)),
            ),
            ("insert_time", Value::Integer(insert_time)),
        ]);
        let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        let sql = format!(
            "INSERT INTO noti_list ({}) VALUES ({});",
            names.join(", "),
            vec!["?"; names.len()].join(", ")
        );
        if let Err(err) = tx.execute(&sql, params_from_iter(columns.into_iter().map(|(_, v)| v)))
        {
            error!(
                "event=noti_insert module=repo status=error error_code=insert_failed error={}",
                err
            );
            let err = NotiError::from(err);
            if matches!(&err, NotiError::FromDb(db) if db.is_constraint_violation()) {
                return Err(NotiError::AlreadyExistsId(noti.priv_id));
            }
            return Err(err);
        }

        let priv_id = PrivId::try_from(tx.last_insert_rowid())
            .map_err(|_| NotiError::InvalidData("row id exceeds priv_id range".to_string()))?;
        let internal_group_id = match matched_group {
            Some(internal_group_id) => internal_group_id,
            None => {
                tx.execute(
                    "UPDATE noti_list SET internal_group_id = ?1 WHERE priv_id = ?1;",
                    [priv_id],
                )?;
                priv_id
            }
        };
        tx.commit()?;

        noti.priv_id = priv_id;
        noti.internal_group_id = internal_group_id;
        noti.insert_time = insert_time;

        info!(
            "event=noti_insert module=repo status=ok priv_id={} internal_group_id={} grouped={} duration_ms={}",
            priv_id,
            internal_group_id,
            matched_group.is_some(),
            started_at.elapsed().as_millis()
        );
        Ok(priv_id)
    }

    fn update(&mut self, noti: &Notification) -> NotiResult<()> {
        let package = noti
            .caller_package
            .as_deref()
            .ok_or_else(|| NotiError::invalid("caller package is required to update"))?;
        if noti.priv_id == PRIV_ID_NONE {
            return Err(NotiError::invalid("update requires an assigned priv_id"));
        }
        if !row_exists(self.conn, package, noti.priv_id)? {
            return Err(NotiError::NotExistId(noti.priv_id));
        }

        let title_key = noti.title_key().map(str::to_string);
        let columns = mutable_columns(noti, title_key.as_deref());
        let assignments: Vec<String> = columns
            .iter()
            .map(|(name, _)| format!("{name} = ?"))
            .collect();
        let sql = format!(
            "UPDATE noti_list SET {} WHERE caller_package = ? AND priv_id = ?;",
            assignments.join(", ")
        );
        let mut binds: Vec<Value> = columns.into_iter().map(|(_, value)| value).collect();
        binds.push(Value::Text(package.to_string()));
        binds.push(Value::Integer(i64::from(noti.priv_id)));

        let changed = self.conn.execute(&sql, params_from_iter(binds))?;
        if changed == 0 {
            return Err(NotiError::NotExistId(noti.priv_id));
        }
        info!(
            "event=noti_update module=repo status=ok priv_id={}",
            noti.priv_id
        );
        Ok(())
    }

    fn delete_by_type(
        &mut self,
        package: Option<&str>,
        kind: Option<NotiType>,
    ) -> NotiResult<DeleteOutcome> {
        let mut sql = String::from("SELECT priv_id FROM noti_list WHERE 1 = 1");
        let mut binds = Vec::new();
        if let Some(package) = package {
            sql.push_str(" AND caller_package = ?");
            binds.push(Value::Text(package.to_string()));
        }
        if let Some(kind) = kind {
            sql.push_str(" AND type = ?");
            binds.push(Value::Integer(i64::from(kind.as_raw())));
        }
        sql.push_str(" ORDER BY priv_id ASC");
        self.delete_selected("by_type", &sql, binds)
    }

    fn delete_by_group(&mut self, package: &str, group_id: GroupId) -> NotiResult<DeleteOutcome> {
        let Some(internal_group_id) = internal_group_of_group(self.conn, package, group_id)? else {
            return Ok(DeleteOutcome::default());
        };
        let (sql, binds) = group_members_query(Some(package), internal_group_id);
        self.delete_selected("by_group", &sql, binds)
    }

    fn delete_by_priv_id(
        &mut self,
        package: Option<&str>,
        priv_id: PrivId,
        scope: DeleteScope,
    ) -> NotiResult<DeleteOutcome> {
        if priv_id == PRIV_ID_NONE {
            return Err(NotiError::invalid("delete requires an assigned priv_id"));
        }
        let internal_group_id = internal_group_of_row(self.conn, package, priv_id)?
            .ok_or(NotiError::NotExistId(priv_id))?;
        match scope {
            DeleteScope::Single => self.delete_selected(
                "by_priv_id",
                "SELECT priv_id FROM noti_list WHERE priv_id = ?",
                vec![Value::Integer(i64::from(priv_id))],
            ),
            DeleteScope::Group => {
                let (sql, binds) = group_members_query(package, internal_group_id);
                self.delete_selected("by_priv_id_group", &sql, binds)
            }
        }
    }

    fn count(&self, query: &CountQuery) -> NotiResult<i64> {
        let mut sql = String::from("SELECT COUNT(*) FROM noti_list WHERE 1 = 1");
        let mut binds = Vec::new();

        if query.group_id != GROUP_ID_NONE {
            let package = query.filter.package.as_deref().ok_or_else(|| {
                NotiError::invalid("counting a group requires a caller package")
            })?;
            let internal_group_id = if query.priv_id != PRIV_ID_NONE {
                internal_group_of_row(self.conn, Some(package), query.priv_id)?
            } else {
                internal_group_of_group(self.conn, package, query.group_id)?
            };
            let Some(internal_group_id) = internal_group_id else {
                return Ok(0);
            };
            sql.push_str(" AND internal_group_id = ?");
            binds.push(Value::Integer(i64::from(internal_group_id)));
        }
        push_filter(&mut sql, &mut binds, &query.filter);

        let count = self
            .conn
            .query_row(&sql, params_from_iter(binds), |row| row.get(0))?;
        debug!("event=noti_count module=repo status=ok count={}", count);
        Ok(count)
    }

    fn grouping_list(&self, filter: &NotiFilter, count: i32) -> NotiResult<Vec<Notification>> {
        let mut inner = String::from("SELECT MAX(priv_id) FROM noti_list WHERE 1 = 1");
        let mut binds = Vec::new();
        push_filter(&mut inner, &mut binds, filter);
        inner.push_str(" GROUP BY internal_group_id");

        let mut sql = format!("{NOTI_SELECT_SQL} WHERE priv_id IN ({inner}) ORDER BY priv_id DESC");
        push_limit(&mut sql, &mut binds, count)?;
        let records = query_records(self.conn, &sql, binds)?;
        debug!(
            "event=noti_grouping_list module=repo status=ok rows={}",
            records.len()
        );
        Ok(records)
    }

    fn detail_list(&self, query: &DetailQuery) -> NotiResult<Vec<Notification>> {
        let package = query.package.as_str();
        let internal_group_id = if query.priv_id != PRIV_ID_NONE {
            Some(internal_group_of_row(self.conn, Some(package), query.priv_id)?)
        } else if query.group_id != GROUP_ID_NONE {
            Some(internal_group_of_group(self.conn, package, query.group_id)?)
        } else {
            None
        };

        let mut sql = format!("{NOTI_SELECT_SQL} WHERE caller_package = ?");
        let mut binds = vec![Value::Text(package.to_string())];
        match internal_group_id {
            Some(Some(internal_group_id)) => {
                sql.push_str(" AND internal_group_id = ?");
                binds.push(Value::Integer(i64::from(internal_group_id)));
            }
            Some(None) => return Ok(Vec::new()),
            None => {}
        }
        push_filter(
            &mut sql,
            &mut binds,
            &NotiFilter {
                package: None,
                kind: None,
                sim: query.sim,
            },
        );
        sql.push_str(" ORDER BY priv_id DESC");
        push_limit(&mut sql, &mut binds, query.count)?;
        query_records(self.conn, &sql, binds)
    }

    fn get_by_priv_id(
        &self,
        package: Option<&str>,
        priv_id: PrivId,
    ) -> NotiResult<Option<Notification>> {
        let mut sql = format!("{NOTI_SELECT_SQL} WHERE priv_id = ?");
        let mut binds = vec![Value::Integer(i64::from(priv_id))];
        if let Some(package) = package {
            sql.push_str(" AND caller_package = ?");
            binds.push(Value::Text(package.to_string()));
        }
        Ok(query_records(self.conn, &sql, binds)?.into_iter().next())
    }

    fn get_by_tag(&self, package: &str, tag: &str) -> NotiResult<Option<Notification>> {
        let sql = format!(
            "{NOTI_SELECT_SQL} WHERE caller_package = ? AND tag = ? ORDER BY priv_id DESC LIMIT 1"
        );
        let binds = vec![Value::Text(package.to_string()), Value::Text(tag.to_string())];
        Ok(query_records(self.conn, &sql, binds)?.into_iter().next())
    }
}

/// Internal group an insert joins, if an existing row already anchors it.
fn find_group(
    conn: &Connection,
    package: &str,
    group_id: GroupId,
    title_key: Option<&str>,
) -> NotiResult<Option<GroupId>> {
    match group_id {
        GROUP_ID_NONE => Ok(None),
        GROUP_ID_DEFAULT => {
            let Some(title_key) = title_key else {
                return Ok(None);
            };
            let found = conn
                .query_row(
                    "SELECT internal_group_id
                     FROM noti_list
                     WHERE title_key = ?1 AND group_id = ?2
                     ORDER BY priv_id ASC
                     LIMIT 1;",
                    params![title_key, GROUP_ID_DEFAULT],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found)
        }
        explicit if explicit > GROUP_ID_DEFAULT => internal_group_of_group(conn, package, explicit),
        other => Err(NotiError::invalid(format!("group id {other} is out of range"))),
    }
}

fn next_internal_group_id(conn: &Connection) -> NotiResult<GroupId> {
    let next = conn.query_row(
        "SELECT IFNULL(MAX(internal_group_id), 0) + 1 FROM noti_list;",
        [],
        |row| row.get(0),
    )?;
    Ok(next)
}

fn internal_group_of_group(
    conn: &Connection,
    package: &str,
    group_id: GroupId,
) -> NotiResult<Option<GroupId>> {
    let found = conn
        .query_row(
            "SELECT internal_group_id
             FROM noti_list
             WHERE caller_package = ?1 AND group_id = ?2
             ORDER BY priv_id ASC
             LIMIT 1;",
            params![package, group_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found)
}

fn internal_group_of_row(
    conn: &Connection,
    package: Option<&str>,
    priv_id: PrivId,
) -> NotiResult<Option<GroupId>> {
    let found = match package {
        Some(package) => conn
            .query_row(
                "SELECT internal_group_id FROM noti_list WHERE caller_package = ?1 AND priv_id = ?2;",
                params![package, priv_id],
                |row| row.get(0),
            )
            .optional()?,
        None => conn
            .query_row(
                "SELECT internal_group_id FROM noti_list WHERE priv_id = ?1;",
                [priv_id],
                |row| row.get(0),
            )
            .optional()?,
    };
    Ok(found)
}

fn row_exists(conn: &Connection, package: &str, priv_id: PrivId) -> NotiResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM noti_list WHERE caller_package = ?1 AND priv_id = ?2
        );",
        params![package, priv_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn select_ids(conn: &Connection, sql: &str, binds: Vec<Value>) -> NotiResult<Vec<PrivId>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(binds))?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}

/// Deletes `ids` in `IN (...)` batches of at most `burst`; returns batch count.
fn delete_ids(conn: &Connection, ids: &[PrivId], burst: usize) -> NotiResult<usize> {
    let mut batches = 0;
    for chunk in ids.chunks(burst) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        conn.execute(
            &format!("DELETE FROM noti_list WHERE priv_id IN ({placeholders});"),
            params_from_iter(chunk.iter()),
        )?;
        batches += 1;
    }
    Ok(batches)
}

/// Selects the rows of one internal group owned by `package`.
///
/// DEFAULT grouping spans packages, so the package predicate keeps a caller
/// from deleting rows it does not own.
fn group_members_query(package: Option<&str>, internal_group_id: GroupId) -> (String, Vec<Value>) {
    let mut sql = String::from("SELECT priv_id FROM noti_list WHERE internal_group_id = ?");
    let mut binds = vec![Value::Integer(i64::from(internal_group_id))];
    if let Some(package) = package {
        sql.push_str(" AND caller_package = ?");
        binds.push(Value::Text(package.to_string()));
    }
    sql.push_str(" ORDER BY priv_id ASC");
    (sql, binds)
}

fn push_filter(sql: &mut String, binds: &mut Vec<Value>, filter: &NotiFilter) {
    if let Some(package) = filter.package.as_ref() {
        sql.push_str(" AND caller_package = ?");
        binds.push(Value::Text(package.clone()));
    }
    if let Some(kind) = filter.kind {
        sql.push_str(" AND type = ?");
        binds.push(Value::Integer(i64::from(kind.as_raw())));
    }
    if filter.sim == SimStatus::Absent {
        sql.push_str(" AND flag_simmode = 0");
    }
}

fn push_limit(sql: &mut String, binds: &mut Vec<Value>, count: i32) -> NotiResult<()> {
    match count {
        -1 => Ok(()),
        count if count > 0 => {
            sql.push_str(" LIMIT ?");
            binds.push(Value::Integer(i64::from(count)));
            Ok(())
        }
        other => Err(NotiError::invalid(format!(
            "list count must be positive or -1, got {other}"
        ))),
    }
}

fn query_records(conn: &Connection, sql: &str, binds: Vec<Value>) -> NotiResult<Vec<Notification>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(binds))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(parse_noti_row(row)?);
    }
    Ok(records)
}

/// Columns rewritten by both insert and update, with their bound values.
fn mutable_columns(noti: &Notification, title_key: Option<&str>) -> Vec<(&'static str, Value)> {
    let payload = |slot| text_value(bundle::flatten_opt(noti.execute_payload(slot)));
    vec![
        ("type", int_value(noti.kind.as_raw())),
        ("layout", int_value(noti.layout.as_raw())),
        ("launch_package", text_value(noti.launch_package.clone())),
        ("image_path", text_value(bundle::flatten_opt(noti.images.as_ref()))),
        ("title_key", text_value(title_key.map(str::to_string))),
        ("text", text_value(bundle::flatten_opt(noti.texts.as_ref()))),
        ("key", text_value(bundle::flatten_opt(noti.text_keys.as_ref()))),
        (
            "format_args",
            text_value(noti.format_args.as_ref().map(FormatArgs::flatten)),
        ),
        ("num_format_args", Value::Integer(noti.num_format_args() as i64)),
        ("domain", text_value(noti.domain.clone())),
        ("dir", text_value(noti.dir.clone())),
        ("time", Value::Integer(noti.time)),
        (
            "execute_labels",
            text_value(bundle::flatten_opt(noti.execute_labels.as_ref())),
        ),
        ("responding_bundle", payload(ExecuteSlot::Responding)),
        ("single_launch_bundle", payload(ExecuteSlot::SingleLaunch)),
        ("multi_launch_bundle", payload(ExecuteSlot::MultiLaunch)),
        ("sound_type", int_value(noti.sound_type.as_raw())),
        ("sound_path", text_value(noti.sound_path.clone())),
        ("vibration_type", int_value(noti.vibration_type.as_raw())),
        ("vibration_path", text_value(noti.vibration_path.clone())),
        ("led_operation", int_value(noti.led_operation.as_raw())),
        ("led_argb", int_value(noti.led_argb)),
        ("led_on_ms", int_value(noti.led_on_ms)),
        ("led_off_ms", int_value(noti.led_off_ms)),
        ("flags_for_property", Value::Integer(i64::from(noti.property.bits()))),
        ("flag_simmode", bool_value(noti.is_sim_mode_only())),
        (
            "display_applist",
            Value::Integer(i64::from(noti.display_applist.bits())),
        ),
        ("progress_size", Value::Real(noti.progress_size)),
        ("progress_percentage", Value::Real(noti.progress_percentage)),
        ("ongoing_flag", bool_value(noti.ongoing_flag)),
        ("auto_remove", bool_value(noti.auto_remove)),
        ("tag", text_value(noti.tag.clone())),
        ("uid", int_value(noti.uid)),
    ]
}

fn parse_noti_row(row: &Row<'_>) -> NotiResult<Notification> {
    let kind = parse_code(row, "type", NotiType::from_raw)?;
    let layout = parse_code(row, "layout", Layout::from_raw)?;
    let sound_type = parse_code(row, "sound_type", SoundType::from_raw)?;
    let vibration_type = parse_code(row, "vibration_type", VibrationType::from_raw)?;
    let led_operation = parse_code(row, "led_operation", LedOperation::from_raw)?;
    let format_args = match row.get::<_, Option<String>>("format_args")? {
        Some(flattened) => FormatArgs::parse(&flattened)?,
        None => None,
    };

    Ok(Notification {
        kind,
        layout,
        group_id: row.get("group_id")?,
        internal_group_id: row.get("internal_group_id")?,
        priv_id: row.get("priv_id")?,
        caller_package: row.get("caller_package")?,
        launch_package: row.get("launch_package")?,
        texts: parse_bundle_column(row, "text")?,
        text_keys: parse_bundle_column(row, "key")?,
        format_args,
        domain: row.get("domain")?,
        dir: row.get("dir")?,
        images: parse_bundle_column(row, "image_path")?,
        execute_labels: parse_bundle_column(row, "execute_labels")?,
        execute_payloads: [
            parse_bundle_column(row, "responding_bundle")?,
            parse_bundle_column(row, "single_launch_bundle")?,
            parse_bundle_column(row, "multi_launch_bundle")?,
        ],
        sound_type,
        sound_path: row.get("sound_path")?,
        vibration_type,
        vibration_path: row.get("vibration_path")?,
        led_operation,
        led_argb: row.get("led_argb")?,
        led_on_ms: row.get("led_on_ms")?,
        led_off_ms: row.get("led_off_ms")?,
        time: row.get("time")?,
        insert_time: row.get("insert_time")?,
        property: PropertyFlags::from_bits_retain(row.get::<_, u32>("flags_for_property")?),
        display_applist: DisplayApplist::from_bits_retain(row.get::<_, u32>("display_applist")?),
        progress_size: row.get("progress_size")?,
        progress_percentage: row.get("progress_percentage")?,
        tag: row.get("tag")?,
        ongoing_flag: row.get::<_, i64>("ongoing_flag")? != 0,
        auto_remove: row.get::<_, i64>("auto_remove")? != 0,
        uid: row.get("uid")?,
        ..Notification::default()
    })
}

fn parse_code<T>(row: &Row<'_>, column: &str, parse: fn(i32) -> Option<T>) -> NotiResult<T> {
    let raw: i32 = row.get(column)?;
    parse(raw).ok_or_else(|| {
        NotiError::InvalidData(format!("invalid code `{raw}` in noti_list.{column}"))
    })
}

fn parse_bundle_column(row: &Row<'_>, column: &str) -> NotiResult<Option<Bundle>> {
    let flattened: Option<String> = row.get(column)?;
    bundle::parse_opt(flattened.as_deref())
}

fn int_value(value: i32) -> Value {
    Value::Integer(i64::from(value))
}

fn bool_value(value: bool) -> Value {
    Value::Integer(i64::from(value))
}

fn text_value(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::Text)
}
