//! Join-Request Workflow: the three-state approval protocol.
//!
//! `pending -> accepted` and `pending -> rejected` are the only transitions;
//! terminal states are immutable. Notification acknowledgement is a
//! precondition of persisting either the new request or a decision — a
//! requester is never told about an outcome that failed to record.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use gather_db::{Database, is_constraint_violation};
use gather_types::models::{Decision, RequestStatus};
use gather_types::notify::{AcceptNotice, JoinRequestNotice, Notice, RejectNotice};

use crate::error::Error;
use crate::notify::Notifier;
use crate::run_blocking;

#[derive(Clone)]
pub struct JoinRequestWorkflow {
    db: Arc<Database>,
    notifier: Arc<dyn Notifier>,
}

impl JoinRequestWorkflow {
    pub fn new(db: Arc<Database>, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, notifier }
    }

    /// Submit a join request for an event.
    ///
    /// The duplicate pre-check gives callers a clean domain error; the
    /// `UNIQUE(user_id, event_id)` constraint stays the backstop for the
    /// race two concurrent submits can produce.
    pub async fn submit(
        &self,
        event_id: Uuid,
        requester_id: Uuid,
    ) -> Result<RequestStatus, Error> {
        let db = self.db.clone();
        let (existing, event, manager, requester) = run_blocking(move || {
            let eid = event_id.to_string();
            let rid = requester_id.to_string();
            let existing = db.find_request(&rid, &eid)?;
            let event = db.get_event(&eid)?;
            let manager = db.get_event_owner(&eid)?;
            let requester = db.get_user_by_id(&rid)?;
            Ok((existing, event, manager, requester))
        })
        .await?;

        if existing.is_some() {
            return Err(Error::DuplicateRequest);
        }
        let event = event.ok_or(Error::NotFound)?;
        let manager = manager.ok_or(Error::NotFound)?;
        let requester = requester.ok_or(Error::NotFound)?;
        if manager.id == requester.id {
            return Err(Error::SelfRequest);
        }

        self.dispatch(Notice::JoinRequest(JoinRequestNotice {
            email: manager.email,
            name: manager.name,
            event_title: event.title,
            event_description: event.description,
            requester_email: requester.email,
            requester_name: requester.name,
        }))
        .await?;

        let db = self.db.clone();
        let id = Uuid::new_v4();
        run_blocking(move || {
            db.insert_request(&id.to_string(), &requester_id.to_string(), &event_id.to_string())
        })
        .await
        .map_err(|e| {
            if is_constraint_violation(&e) {
                Error::DuplicateRequest
            } else {
                Error::Storage(e)
            }
        })?;

        info!("Join request {} created for event {}", id, event_id);
        Ok(RequestStatus::Pending)
    }

    /// Accept or reject a pending request.
    ///
    /// One lookup covers existence, authorization and state: the request must
    /// belong to the event, the event to the deciding manager, and the status
    /// must still be pending. Any miss is `NotFound` — deliberately uniform.
    pub async fn decide(
        &self,
        event_id: Uuid,
        manager_id: Uuid,
        request_id: Uuid,
        decision: Decision,
    ) -> Result<String, Error> {
        let db = self.db.clone();
        let request = run_blocking(move || {
            db.find_pending_for_manager(
                &request_id.to_string(),
                &event_id.to_string(),
                &manager_id.to_string(),
            )
        })
        .await?
        .ok_or(Error::NotFound)?;

        let (notice, status, message) = match decision {
            Decision::Accept => (
                Notice::Accept(AcceptNotice {
                    email: request.requester_email,
                    name: request.requester_name,
                    event_title: request.event_title,
                    event_description: request.event_description,
                }),
                RequestStatus::Accepted,
                "Request Accepted Successfully!",
            ),
            Decision::Reject => (
                Notice::Reject(RejectNotice {
                    email: request.requester_email,
                    name: request.requester_name,
                    event_title: request.event_title,
                }),
                RequestStatus::Rejected,
                "Request Rejected Successfully!",
            ),
        };

        self.dispatch(notice).await?;

        let db = self.db.clone();
        let affected =
            run_blocking(move || db.set_request_status(&request_id.to_string(), status.as_str()))
                .await?;
        // a concurrent decide can win between lookup and update
        if affected == 0 {
            return Err(Error::NotFound);
        }

        info!("Request {} moved to {}", request_id, status.as_str());
        Ok(message.to_string())
    }

    /// Fail-fast dispatch: no retries, and anything but an acknowledged
    /// delivery aborts the operation before state is persisted.
    async fn dispatch(&self, notice: Notice) -> Result<(), Error> {
        let acked = match self.notifier.send(notice).await {
            Ok(acked) => acked,
            Err(e) => {
                warn!("Notification dispatch failed: {:#}", e);
                false
            }
        };
        if acked { Ok(()) } else { Err(Error::NotificationFailed) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every notice it acknowledges.
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<Notice>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, notice: Notice) -> anyhow::Result<bool> {
            self.sent.lock().unwrap().push(notice);
            Ok(true)
        }
    }

    /// Refuses every dispatch.
    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _notice: Notice) -> anyhow::Result<bool> {
            Err(anyhow::anyhow!("gateway unreachable"))
        }
    }

    struct Fixture {
        db: Arc<Database>,
        notifier: Arc<RecordingNotifier>,
        workflow: JoinRequestWorkflow,
        manager: Uuid,
        requester: Uuid,
        event: Uuid,
    }

    fn fixture() -> Fixture {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let manager = seed_user(&db, "Ana", "ana@example.com");
        let requester = seed_user(&db, "Bo", "bo@example.com");
        let event = seed_event(&db, manager, "Biban24", "Opportunities");
        let notifier = Arc::new(RecordingNotifier::default());
        let workflow = JoinRequestWorkflow::new(db.clone(), notifier.clone());
        Fixture { db, notifier, workflow, manager, requester, event }
    }

    fn seed_user(db: &Database, name: &str, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        db.insert_user(&id.to_string(), name, email, "$argon2id$stub")
            .unwrap();
        id
    }

    fn seed_event(db: &Database, owner: Uuid, title: &str, description: &str) -> Uuid {
        let id = Uuid::new_v4();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO events (id, title, description, date, user_id)
                 VALUES (?1, ?2, ?3, '2025-06-01T18:00:00+00:00', ?4)",
                (&id.to_string(), title, description, &owner.to_string()),
            )?;
            Ok(())
        })
        .unwrap();
        id
    }

    fn request_id(f: &Fixture) -> Uuid {
        f.db.find_request(&f.requester.to_string(), &f.event.to_string())
            .unwrap()
            .unwrap()
            .id
            .parse()
            .unwrap()
    }

    #[tokio::test]
    async fn submit_notifies_manager_and_creates_pending_request() {
        let f = fixture();
        let status = f.workflow.submit(f.event, f.requester).await.unwrap();
        assert_eq!(status, RequestStatus::Pending);

        let sent = f.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            Notice::JoinRequest(n) => {
                assert_eq!(n.email, "ana@example.com");
                assert_eq!(n.requester_email, "bo@example.com");
                assert_eq!(n.event_title, "Biban24");
            }
            other => panic!("unexpected notice {other:?}"),
        }

        let row = f
            .db
            .find_request(&f.requester.to_string(), &f.event.to_string())
            .unwrap()
            .unwrap();
        assert_eq!(row.status, "pending");
    }

    #[tokio::test]
    async fn second_submit_is_a_duplicate() {
        let f = fixture();
        f.workflow.submit(f.event, f.requester).await.unwrap();
        let err = f.workflow.submit(f.event, f.requester).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateRequest));
        // still exactly one notice and one row
        assert_eq!(f.notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn submit_for_unknown_event_or_requester_is_not_found() {
        let f = fixture();
        let err = f.workflow.submit(Uuid::new_v4(), f.requester).await.unwrap_err();
        assert!(matches!(err, Error::NotFound));

        let err = f.workflow.submit(f.event, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound));
        assert!(f.notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn owners_cannot_join_their_own_event() {
        let f = fixture();
        let err = f.workflow.submit(f.event, f.manager).await.unwrap_err();
        assert!(matches!(err, Error::SelfRequest));
        assert!(f.notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_dispatch_persists_nothing() {
        let f = fixture();
        let workflow = JoinRequestWorkflow::new(f.db.clone(), Arc::new(FailingNotifier));

        let err = workflow.submit(f.event, f.requester).await.unwrap_err();
        assert!(matches!(err, Error::NotificationFailed));
        assert!(f
            .db
            .find_request(&f.requester.to_string(), &f.event.to_string())
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn accept_transitions_and_notifies_requester() {
        let f = fixture();
        f.workflow.submit(f.event, f.requester).await.unwrap();
        let req = request_id(&f);

        let message = f
            .workflow
            .decide(f.event, f.manager, req, Decision::Accept)
            .await
            .unwrap();
        assert_eq!(message, "Request Accepted Successfully!");

        let sent = f.notifier.sent.lock().unwrap();
        match sent.last().unwrap() {
            Notice::Accept(n) => assert_eq!(n.email, "bo@example.com"),
            other => panic!("unexpected notice {other:?}"),
        }
        drop(sent);

        assert_eq!(
            f.db.get_request(&req.to_string()).unwrap().unwrap().status,
            "accepted"
        );

        // terminal: a second decision finds nothing
        let err = f
            .workflow
            .decide(f.event, f.manager, req, Decision::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[tokio::test]
    async fn reject_uses_the_reject_notice_and_message() {
        let f = fixture();
        f.workflow.submit(f.event, f.requester).await.unwrap();
        let req = request_id(&f);

        let message = f
            .workflow
            .decide(f.event, f.manager, req, Decision::Reject)
            .await
            .unwrap();
        assert_eq!(message, "Request Rejected Successfully!");

        let sent = f.notifier.sent.lock().unwrap();
        assert!(matches!(sent.last().unwrap(), Notice::Reject(_)));
    }

    #[tokio::test]
    async fn decide_is_scoped_to_the_owning_manager() {
        let f = fixture();
        f.workflow.submit(f.event, f.requester).await.unwrap();
        let req = request_id(&f);

        // a different user, even the requester, cannot decide
        let err = f
            .workflow
            .decide(f.event, f.requester, req, Decision::Accept)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound));

        // wrong event id also misses
        let err = f
            .workflow
            .decide(Uuid::new_v4(), f.manager, req, Decision::Accept)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound));

        // unknown request id
        let err = f
            .workflow
            .decide(f.event, f.manager, Uuid::new_v4(), Decision::Accept)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[tokio::test]
    async fn failed_dispatch_leaves_decision_unapplied() {
        let f = fixture();
        f.workflow.submit(f.event, f.requester).await.unwrap();
        let req = request_id(&f);

        let failing = JoinRequestWorkflow::new(f.db.clone(), Arc::new(FailingNotifier));
        let err = failing
            .decide(f.event, f.manager, req, Decision::Accept)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotificationFailed));
        assert_eq!(
            f.db.get_request(&req.to_string()).unwrap().unwrap().status,
            "pending"
        );
    }
}
