use notibus_core::client::{
    Completion, NotiClient, ServiceEvent, ServiceReply, ServiceRequest, ServiceTransport,
};
use notibus_core::codec::wire::encode;
use notibus_core::config::ProcessIdentity;
use notibus_core::model::noti::{NotiType, Notification, TextSlot, GROUP_ID_NONE, PRIV_ID_NONE};
use notibus_core::model::op::{NotiOp, OpKind};
use notibus_core::{NotiError, NotiResult};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

const PACKAGE: &str = "org.example.client";

#[derive(Default)]
struct MockTransport {
    requests: Vec<ServiceRequest>,
    replies: VecDeque<NotiResult<ServiceReply>>,
    pending_async: Vec<Completion>,
    registrations: usize,
    fail_registration: bool,
    watching: Vec<bool>,
}

impl MockTransport {
    fn reply(&mut self, reply: ServiceReply) {
        self.replies.push_back(Ok(reply));
    }

    fn next_reply(&mut self) -> NotiResult<ServiceReply> {
        self.replies
            .pop_front()
            .unwrap_or_else(|| Err(NotiError::Io("no scripted reply".to_string())))
    }
}

impl ServiceTransport for MockTransport {
    fn register_client(&mut self) -> NotiResult<()> {
        if self.fail_registration {
            return Err(NotiError::Io("service refused registration".to_string()));
        }
        self.registrations += 1;
        Ok(())
    }

    fn watch_presence(&mut self, enabled: bool) -> NotiResult<()> {
        self.watching.push(enabled);
        Ok(())
    }

    fn call(&mut self, request: ServiceRequest) -> NotiResult<ServiceReply> {
        self.requests.push(request);
        self.next_reply()
    }

    fn call_async(&mut self, request: ServiceRequest, completion: Completion) -> NotiResult<()> {
        self.requests.push(request);
        self.pending_async.push(completion);
        Ok(())
    }
}

fn client() -> NotiClient<MockTransport> {
    NotiClient::new(MockTransport::default(), ProcessIdentity::new(PACKAGE, 42))
}

fn ready_client() -> NotiClient<MockTransport> {
    let mut client = client();
    client.handle_event(ServiceEvent::Appeared).unwrap();
    client
}

fn record(title: &str) -> Notification {
    let mut noti = Notification::new(NotiType::Transient, &ProcessIdentity::new(PACKAGE, 42));
    noti.set_text(TextSlot::Title, Some(title), None);
    noti
}

#[test]
fn calls_before_ready_fail_without_touching_transport() {
    let mut client = client();
    let mut noti = record("early");

    let err = client.post(&mut noti).unwrap_err();
    assert!(matches!(err, NotiError::ServiceNotReady));
    assert!(client.count(None, GROUP_ID_NONE, PRIV_ID_NONE).is_err());
    assert!(client.transport().requests.is_empty());
    assert_eq!(noti.priv_id(), PRIV_ID_NONE);
}

#[test]
fn local_validation_runs_before_readiness() {
    let mut client = ready_client();
    let err = client.update(&record("never posted")).unwrap_err();
    assert_eq!(err.code(), "invalid_parameter");
    let err = client.grouping_list(None, 0).unwrap_err();
    assert_eq!(err.code(), "invalid_parameter");
    assert!(client.transport().requests.is_empty());
}

#[test]
fn deferred_task_runs_exactly_once_after_ready() {
    let runs = Rc::new(RefCell::new(0));
    let mut client = client();
    let counter = Rc::clone(&runs);
    client.add_deferred_task(move || *counter.borrow_mut() += 1);
    assert_eq!(*runs.borrow(), 0);
    assert_eq!(client.pending_deferred_tasks(), 1);

    client.handle_event(ServiceEvent::Appeared).unwrap();
    assert_eq!(*runs.borrow(), 1);

    client.handle_event(ServiceEvent::Vanished).unwrap();
    client.handle_event(ServiceEvent::Appeared).unwrap();
    assert_eq!(*runs.borrow(), 1);
    assert_eq!(client.transport().registrations, 2);
}

#[test]
fn removed_deferred_task_never_runs() {
    let runs = Rc::new(RefCell::new(Vec::new()));
    let mut client = client();
    let tokens: Vec<_> = ["first", "second"]
        .into_iter()
        .map(|name| {
            let runs = Rc::clone(&runs);
            client.add_deferred_task(move || runs.borrow_mut().push(name))
        })
        .collect();

    assert!(client.del_deferred_task(tokens[0]));
    client.handle_event(ServiceEvent::Appeared).unwrap();
    assert_eq!(*runs.borrow(), vec!["second"]);
}

#[test]
fn failed_registration_keeps_tasks_queued() {
    let runs = Rc::new(RefCell::new(0));
    let mut client = client();
    client.transport_mut().fail_registration = true;
    let counter = Rc::clone(&runs);
    client.add_deferred_task(move || *counter.borrow_mut() += 1);

    assert!(client.handle_event(ServiceEvent::Appeared).is_err());
    assert!(!client.is_ready());
    assert_eq!(*runs.borrow(), 0);

    client.transport_mut().fail_registration = false;
    client.handle_event(ServiceEvent::Appeared).unwrap();
    assert_eq!(*runs.borrow(), 1);
}

#[test]
fn task_added_while_ready_runs_immediately() {
    let runs = Rc::new(RefCell::new(0));
    let mut client = ready_client();
    let counter = Rc::clone(&runs);
    client.add_deferred_task(move || *counter.borrow_mut() += 1);
    assert_eq!(*runs.borrow(), 1);
    assert_eq!(client.pending_deferred_tasks(), 0);
}

#[test]
fn post_writes_assigned_id_back() {
    let mut client = ready_client();
    client.transport_mut().reply(ServiceReply::PrivId(17));
    let mut noti = record("hello");

    assert_eq!(client.post(&mut noti).unwrap(), 17);
    assert_eq!(noti.priv_id(), 17);
    match &client.transport().requests[0] {
        ServiceRequest::Insert(dict) => assert_eq!(dict, &encode(&record("hello"))),
        other => panic!("unexpected request: {other:?}"),
    }
}

#[test]
fn unexpected_reply_shape_is_invalid_data() {
    let mut client = ready_client();
    client.transport_mut().reply(ServiceReply::Count(3));
    let err = client.post(&mut record("x")).unwrap_err();
    assert_eq!(err.code(), "invalid_data");
}

#[test]
fn transport_errors_are_returned_verbatim() {
    let mut client = ready_client();
    client
        .transport_mut()
        .replies
        .push_back(Err(NotiError::PermissionDenied));
    let err = client.delete_all(NotiType::Ongoing).unwrap_err();
    assert!(matches!(err, NotiError::PermissionDenied));
    assert_eq!(client.transport().requests.len(), 1);
}

#[test]
fn update_async_delivers_result_through_completion() {
    let mut client = ready_client();
    let mut noti = record("async");
    client.transport_mut().reply(ServiceReply::PrivId(3));
    client.post(&mut noti).unwrap();

    let result = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&result);
    client
        .update_async(&noti, move |outcome| *sink.borrow_mut() = Some(outcome))
        .unwrap();
    assert!(result.borrow().is_none());

    let completion = client.transport_mut().pending_async.pop().unwrap();
    completion(Ok(ServiceReply::PrivId(3)));
    assert_eq!(result.borrow().as_ref().unwrap().as_ref().ok(), Some(&3));
}

#[test]
fn lists_decode_wire_records() {
    let mut client = ready_client();
    let mut stored = record("listed");
    stored.set_tag(Some("t1"));
    client
        .transport_mut()
        .reply(ServiceReply::Records(vec![encode(&stored), encode(&record("two"))]));
    client
        .transport_mut()
        .reply(ServiceReply::Record(Some(encode(&stored))));
    client.transport_mut().reply(ServiceReply::Record(None));

    let listed = client.grouping_list(Some(NotiType::Transient), -1).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0], stored);
    assert_eq!(client.get_by_priv_id(1).unwrap(), Some(stored));
    assert_eq!(client.get_by_priv_id(2).unwrap(), None);
}

#[test]
fn subscribers_drive_presence_watching_and_receive_changes() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut client = ready_client();

    let simple_seen = Rc::clone(&seen);
    let simple = client
        .register_changed(move |kind| simple_seen.borrow_mut().push(format!("simple {kind:?}")))
        .unwrap();
    let detailed_seen = Rc::clone(&seen);
    let detailed = client
        .register_detailed_changed(move |_, ops| {
            let ids: Vec<_> = ops.iter().map(|op| op.priv_id).collect();
            detailed_seen.borrow_mut().push(format!("detailed {ids:?}"));
        })
        .unwrap();
    assert_eq!(client.transport().watching, vec![true]);

    client
        .handle_event(ServiceEvent::Changed {
            kind: NotiType::Transient,
            ops: vec![NotiOp::new(OpKind::Insert, 5), NotiOp::new(OpKind::Delete, 6)],
        })
        .unwrap();
    assert_eq!(
        *seen.borrow(),
        vec!["simple Transient".to_string(), "detailed [5, 6]".to_string()]
    );

    client.unregister_changed(simple).unwrap();
    assert_eq!(client.transport().watching, vec![true]);
    client.unregister_changed(detailed).unwrap();
    assert_eq!(client.transport().watching, vec![true, false]);
    assert!(client.unregister_changed(detailed).is_err());
}
