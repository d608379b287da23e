use bytes::Bytes;
use epp_session::{expect_success, EppError, Response, ResultCode, Session};
use epp_transport::Dialer;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;

/// What the server said about a command that returns no object data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub code: ResultCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_trid: Option<String>,
    pub server_trid: String,
}

impl<D, E> From<&Response<D, E>> for Outcome {
    fn from(response: &Response<D, E>) -> Self {
        Self {
            code: response.code(),
            message: response.message().to_string(),
            client_trid: response.tr_id.client.clone(),
            server_trid: response.tr_id.server.clone(),
        }
    }
}

/// Run one object command on a logged-in session.
///
/// `build` renders the request for the transaction ID it is handed. The
/// response must carry a success code; anything else comes back as the
/// registry's [`epp_session::EppError`] with its conditions.
pub fn execute<Dl, D, E, F>(session: &mut Session<Dl>, build: F) -> Result<Response<D, E>>
where
    Dl: Dialer,
    D: DeserializeOwned,
    E: DeserializeOwned,
    F: FnOnce(&str) -> epp_session::Result<String>,
{
    execute_raw(session, build).map(|(response, _)| response)
}

/// Like [`execute`], also handing back the raw response document.
pub fn execute_raw<Dl, D, E, F>(
    session: &mut Session<Dl>,
    build: F,
) -> Result<(Response<D, E>, Bytes)>
where
    Dl: Dialer,
    D: DeserializeOwned,
    E: DeserializeOwned,
    F: FnOnce(&str) -> epp_session::Result<String>,
{
    session.ensure_authenticated()?;
    let cl_trid = session.next_transaction_id();
    let xml = build(&cl_trid)?;
    let raw = session.send_command(xml.as_bytes())?;
    let response = expect_success(&raw)?;
    debug!(cl_trid = %cl_trid, code = %response.code(), "command completed");
    Ok((response, raw))
}

/// Unwrap `<resData>` a successful command is required to carry.
pub(crate) fn missing_res_data<T>(data: Option<T>) -> Result<T> {
    data.ok_or_else(|| EppError::new(ResultCode::COMMAND_FAILED, "response carried no resData").into())
}

/// The raw content between `<local>` and its end tag, namespace prefix
/// ignored. Used to hand through payloads this crate does not model.
pub fn inner_xml<'x>(xml: &'x str, local: &str) -> Option<&'x str> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) if start.local_name().as_ref() == local.as_bytes() => {
                let end = start.to_end();
                let span = reader.read_to_end(end.name()).ok()?;
                let range = usize::try_from(span.start).ok()?..usize::try_from(span.end).ok()?;
                return xml.get(range).map(str::trim);
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_xml_extracts_nested_content() {
        let xml = r#"<epp><response><resData>
            <domain:trnData xmlns:domain="urn:ietf:params:xml:ns:domain-1.0"><domain:name>a.at</domain:name></domain:trnData>
        </resData></response></epp>"#;
        let inner = inner_xml(xml, "resData").unwrap();
        assert!(inner.starts_with("<domain:trnData"));
        assert!(inner.ends_with("</domain:trnData>"));
    }

    #[test]
    fn inner_xml_missing_or_empty() {
        assert_eq!(inner_xml("<epp><response/></epp>", "resData"), None);
        assert_eq!(inner_xml("<epp><resData/></epp>", "resData"), None);
        assert_eq!(inner_xml("<epp><x:resData></x:resData></epp>", "resData"), Some(""));
    }
}
