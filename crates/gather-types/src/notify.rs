//! Wire payloads exchanged with the mailer service. Each notice type maps to
//! one mailer route; the route returns a boolean acknowledgement.

use serde::{Deserialize, Serialize};

pub const JOIN_REQUEST_PATH: &str = "/notifications/join-request";
pub const ACCEPT_REQUEST_PATH: &str = "/notifications/accept-request";
pub const REJECT_REQUEST_PATH: &str = "/notifications/reject-request";

/// Sent to the event manager when someone asks to join their event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequestNotice {
    pub email: String,
    pub name: String,
    pub event_title: String,
    pub event_description: String,
    pub requester_email: String,
    pub requester_name: String,
}

/// Sent to the requester when the manager accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptNotice {
    pub email: String,
    pub name: String,
    pub event_title: String,
    pub event_description: String,
}

/// Sent to the requester when the manager rejects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectNotice {
    pub email: String,
    pub name: String,
    pub event_title: String,
}

#[derive(Debug, Clone)]
pub enum Notice {
    JoinRequest(JoinRequestNotice),
    Accept(AcceptNotice),
    Reject(RejectNotice),
}

impl Notice {
    pub const fn path(&self) -> &'static str {
        match self {
            Self::JoinRequest(_) => JOIN_REQUEST_PATH,
            Self::Accept(_) => ACCEPT_REQUEST_PATH,
            Self::Reject(_) => REJECT_REQUEST_PATH,
        }
    }
}
