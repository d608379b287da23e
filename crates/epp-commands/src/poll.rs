//! Service message queue: `<poll op="req"/>` and `<poll op="ack"/>`.

use epp_session::{Command, MessageQueue, ResultCode, Session};
use epp_transport::Dialer;
use serde::de::IgnoredAny;
use serde::Serialize;

use crate::error::Result;
use crate::execute::{execute_raw, inner_xml, Outcome};
use crate::validate::ValidationError;

/// One poll answer. `queue` is absent when the queue is empty (1300).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollMessage {
    #[serde(flatten)]
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<MessageQueue>,
    /// Raw `<resData>` content, left for the caller to interpret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub res_data: Option<String>,
}

impl PollMessage {
    pub fn is_empty_queue(&self) -> bool {
        self.outcome.code == ResultCode::SUCCESS_NO_MESSAGES
    }

    pub fn message_id(&self) -> Option<&str> {
        self.queue.as_ref().map(|q| q.id.as_str()).filter(|id| !id.is_empty())
    }
}

#[derive(Serialize)]
struct PollXml<'a> {
    #[serde(rename = "@op")]
    op: &'static str,
    #[serde(rename = "@msgID", skip_serializing_if = "Option::is_none")]
    msg_id: Option<&'a str>,
}

fn poll<D: Dialer>(session: &mut Session<D>, body: &PollXml<'_>) -> Result<PollMessage> {
    let (response, raw) = execute_raw::<_, IgnoredAny, IgnoredAny, _>(session, |id| {
        Command::new("poll", body, id).to_xml()
    })?;
    let res_data = std::str::from_utf8(&raw)
        .ok()
        .and_then(|xml| inner_xml(xml, "resData"))
        .map(str::to_owned);
    Ok(PollMessage {
        outcome: Outcome::from(&response),
        queue: response.message_queue,
        res_data,
    })
}

/// Fetch the oldest queued message without removing it.
pub fn request<D: Dialer>(session: &mut Session<D>) -> Result<PollMessage> {
    poll(
        session,
        &PollXml {
            op: "req",
            msg_id: None,
        },
    )
}

/// Remove a message from the queue.
pub fn ack<D: Dialer>(session: &mut Session<D>, msg_id: &str) -> Result<PollMessage> {
    if msg_id.trim().is_empty() {
        return Err(ValidationError::Empty {
            field: "message ID",
        }
        .into());
    }
    poll(
        session,
        &PollXml {
            op: "ack",
            msg_id: Some(msg_id),
        },
    )
}
