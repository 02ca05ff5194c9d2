//! Client context owning all per-process client state.
//!
//! # Responsibility
//! - Forward record operations to the service through [`ServiceTransport`].
//! - Own the readiness monitor, deferred task queue and change dispatcher,
//!   and drive them from [`ServiceEvent`]s.
//!
//! # Invariants
//! - Local validation runs before any transport call.
//! - While the service is not ready, calls fail with `ServiceNotReady` and
//!   the transport is not touched. Failed calls are never retried here.
//! - Presence watching runs exactly while at least one change subscriber is
//!   registered.

use super::deferred::{DeferredTaskQueue, TaskToken};
use super::dispatcher::{ChangeDispatcher, SubscriptionToken};
use super::monitor::ReadinessMonitor;
use super::transport::{ServiceEvent, ServiceReply, ServiceRequest, ServiceTransport};
use crate::codec::wire::{decode, decode_list, encode};
use crate::config::ProcessIdentity;
use crate::error::{NotiError, NotiResult};
use crate::model::noti::{GroupId, NotiType, Notification, PrivId, PRIV_ID_NONE};
use crate::model::op::NotiOp;
use log::{debug, error, info, warn};
use std::time::Instant;

/// Client-side entry point to the notification service.
pub struct NotiClient<T: ServiceTransport> {
    transport: T,
    identity: ProcessIdentity,
    monitor: ReadinessMonitor,
    deferred: DeferredTaskQueue,
    dispatcher: ChangeDispatcher,
}

impl<T: ServiceTransport> NotiClient<T> {
    /// Creates a client for `identity`; the service starts out not ready.
    pub fn new(transport: T, identity: ProcessIdentity) -> Self {
        Self {
            transport,
            identity,
            monitor: ReadinessMonitor::new(),
            deferred: DeferredTaskQueue::new(),
            dispatcher: ChangeDispatcher::new(),
        }
    }

    pub fn identity(&self) -> &ProcessIdentity {
        &self.identity
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn is_ready(&self) -> bool {
        self.monitor.is_ready()
    }

    /// Sends a new record and writes the assigned `priv_id` back into it.
    pub fn post(&mut self, noti: &mut Notification) -> NotiResult<PrivId> {
        self.require_caller(noti)?;
        let priv_id = self
            .call(ServiceRequest::Insert(encode(noti)))?
            .into_priv_id()?;
        noti.priv_id = priv_id;
        Ok(priv_id)
    }

    pub fn update(&mut self, noti: &Notification) -> NotiResult<()> {
        let request = self.update_request(noti)?;
        self.call(request)?.into_priv_id()?;
        Ok(())
    }

    /// Sends an update whose result is delivered to `completion` by the
    /// transport's event loop.
    pub fn update_async(
        &mut self,
        noti: &Notification,
        completion: impl FnOnce(NotiResult<PrivId>) + 'static,
    ) -> NotiResult<()> {
        let request = self.update_request(noti)?;
        self.ensure_ready(request.name())?;
        self.transport.call_async(
            request,
            Box::new(move |reply: NotiResult<ServiceReply>| {
                completion(reply.and_then(ServiceReply::into_priv_id))
            }),
        )
    }

    /// Deletes the stored counterpart of `noti`; the record itself is kept.
    pub fn delete(&mut self, noti: &Notification) -> NotiResult<Vec<PrivId>> {
        self.require_caller(noti)?;
        self.delete_by_priv_id(noti.priv_id())
    }

    pub fn delete_by_priv_id(&mut self, priv_id: PrivId) -> NotiResult<Vec<PrivId>> {
        if priv_id == PRIV_ID_NONE {
            return Err(NotiError::invalid("delete requires an assigned priv_id"));
        }
        let request = ServiceRequest::DeleteByPrivId {
            package: self.identity.package.clone(),
            priv_id,
        };
        self.call(request)?.into_deleted()
    }

    /// Deletes every record of `kind` posted by this client.
    pub fn delete_all(&mut self, kind: NotiType) -> NotiResult<Vec<PrivId>> {
        let request = ServiceRequest::DeleteAllByType {
            package: Some(self.identity.package.clone()),
            kind,
        };
        self.call(request)?.into_deleted()
    }

    pub fn count(
        &mut self,
        kind: Option<NotiType>,
        group_id: GroupId,
        priv_id: PrivId,
    ) -> NotiResult<i64> {
        let request = ServiceRequest::Count {
            kind,
            package: Some(self.identity.package.clone()),
            group_id,
            priv_id,
        };
        self.call(request)?.into_count()
    }

    pub fn grouping_list(
        &mut self,
        kind: Option<NotiType>,
        count: i32,
    ) -> NotiResult<Vec<Notification>> {
        validate_count(count)?;
        let dicts = self
            .call(ServiceRequest::GroupingList { kind, count })?
            .into_records()?;
        decode_list(&dicts)
    }

    pub fn detail_list(
        &mut self,
        group_id: GroupId,
        priv_id: PrivId,
        count: i32,
    ) -> NotiResult<Vec<Notification>> {
        validate_count(count)?;
        let request = ServiceRequest::DetailList {
            package: self.identity.package.clone(),
            group_id,
            priv_id,
            count,
        };
        let dicts = self.call(request)?.into_records()?;
        decode_list(&dicts)
    }

    pub fn get_by_priv_id(&mut self, priv_id: PrivId) -> NotiResult<Option<Notification>> {
        let request = ServiceRequest::GetByPrivId {
            package: self.identity.package.clone(),
            priv_id,
        };
        match self.call(request)?.into_record()? {
            Some(dict) => decode(&dict).map(Some),
            None => Ok(None),
        }
    }

    /// Registers a callback invoked with the changed type only.
    pub fn register_changed(
        &mut self,
        callback: impl FnMut(NotiType) + 'static,
    ) -> NotiResult<SubscriptionToken> {
        self.start_watching()?;
        Ok(self.dispatcher.register_simple(callback))
    }

    /// Registers a callback invoked with the changed type and its op batch.
    pub fn register_detailed_changed(
        &mut self,
        callback: impl FnMut(NotiType, &[NotiOp]) + 'static,
    ) -> NotiResult<SubscriptionToken> {
        self.start_watching()?;
        Ok(self.dispatcher.register_detailed(callback))
    }

    /// Removes one subscription; the last removal stops presence watching.
    pub fn unregister_changed(&mut self, token: SubscriptionToken) -> NotiResult<()> {
        if !self.dispatcher.unregister(token) {
            return Err(NotiError::invalid("unknown subscription token"));
        }
        if self.dispatcher.is_empty() && self.monitor.stop() {
            self.transport.watch_presence(false)?;
            info!("event=presence_watch module=client status=ok watching=false");
        }
        Ok(())
    }

    /// Queues `task` until the service is ready; runs it now if it already is.
    pub fn add_deferred_task(&mut self, task: impl FnOnce() + 'static) -> TaskToken {
        let token = self.deferred.add(task);
        if self.monitor.is_ready() {
            self.deferred.flush();
        }
        token
    }

    pub fn del_deferred_task(&mut self, token: TaskToken) -> bool {
        self.deferred.del(token)
    }

    pub fn pending_deferred_tasks(&self) -> usize {
        self.deferred.len()
    }

    /// Feeds one transport event into the client state.
    ///
    /// On `Appeared` the client re-registers and then flushes deferred tasks;
    /// if re-registration fails the service stays not ready and tasks stay
    /// queued.
    pub fn handle_event(&mut self, event: ServiceEvent) -> NotiResult<()> {
        match event {
            ServiceEvent::Appeared => {
                if self.monitor.is_ready() {
                    debug!("event=service_appeared module=client status=ok duplicate=true");
                    return Ok(());
                }
                if let Err(err) = self.transport.register_client() {
                    error!(
                        "event=service_appeared module=client status=error error_code={} error={}",
                        err.code(),
                        err
                    );
                    return Err(err);
                }
                self.monitor.appeared();
                let flushed = self.deferred.flush();
                info!(
                    "event=service_appeared module=client status=ok flushed_tasks={}",
                    flushed
                );
            }
            ServiceEvent::Vanished => {
                if self.monitor.vanished() {
                    warn!("event=service_vanished module=client status=ok");
                }
            }
            ServiceEvent::Changed { kind, ops } => {
                let subscribers = self.dispatcher.dispatch(kind, &ops);
                debug!(
                    "event=change_dispatch module=client status=ok type={:?} ops={} subscribers={}",
                    kind,
                    ops.len(),
                    subscribers
                );
            }
        }
        Ok(())
    }

    fn call(&mut self, request: ServiceRequest) -> NotiResult<ServiceReply> {
        let name = request.name();
        self.ensure_ready(name)?;
        let started_at = Instant::now();
        match self.transport.call(request) {
            Ok(reply) => {
                debug!(
                    "event=service_call module=client status=ok request={} duration_ms={}",
                    name,
                    started_at.elapsed().as_millis()
                );
                Ok(reply)
            }
            Err(err) => {
                error!(
                    "event=service_call module=client status=error request={} error_code={} error={}",
                    name,
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn ensure_ready(&self, request: &str) -> NotiResult<()> {
        if self.monitor.is_ready() {
            return Ok(());
        }
        warn!(
            "event=service_call module=client status=error request={} error_code=service_not_ready",
            request
        );
        Err(NotiError::ServiceNotReady)
    }

    fn start_watching(&mut self) -> NotiResult<()> {
        if self.monitor.is_watching() {
            return Ok(());
        }
        self.transport.watch_presence(true)?;
        self.monitor.start();
        info!("event=presence_watch module=client status=ok watching=true");
        Ok(())
    }

    fn require_caller(&self, noti: &Notification) -> NotiResult<()> {
        match noti.caller_package() {
            Some(package) if !package.is_empty() => Ok(()),
            _ => Err(NotiError::invalid("record has no caller package")),
        }
    }

    fn update_request(&self, noti: &Notification) -> NotiResult<ServiceRequest> {
        self.require_caller(noti)?;
        if noti.priv_id() == PRIV_ID_NONE {
            return Err(NotiError::invalid("update requires an assigned priv_id"));
        }
        Ok(ServiceRequest::Update(encode(noti)))
    }
}

fn validate_count(count: i32) -> NotiResult<()> {
    if count == -1 || count > 0 {
        Ok(())
    } else {
        Err(NotiError::invalid(format!(
            "list count must be positive or -1, got {count}"
        )))
    }
}
