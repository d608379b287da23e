//! The EPP XML envelope: `<epp>` documents carrying `<hello/>` or a
//! `<command>`, and the generic `<response>` shape every reply shares.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::result::{Condition, EppError, ResultCode};

/// EPP base namespace.
pub const EPP_NS: &str = "urn:ietf:params:xml:ns:epp-1.0";

/// Prepended to every outgoing document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

pub const DOMAIN_NS: &str = "urn:ietf:params:xml:ns:domain-1.0";
pub const CONTACT_NS: &str = "urn:ietf:params:xml:ns:contact-1.0";
pub const HOST_NS: &str = "urn:ietf:params:xml:ns:host-1.0";
pub const SECDNS_NS: &str = "urn:ietf:params:xml:ns:secDNS-1.1";

/// nic.at extensions announced at login by default.
pub const AT_EXT_EPP_NS: &str = "http://www.nic.at/xsd/at-ext-epp-1.0";
pub const AT_EXT_CONTACT_NS: &str = "http://www.nic.at/xsd/at-ext-contact-1.0";
pub const AT_EXT_DOMAIN_NS: &str = "http://www.nic.at/xsd/at-ext-domain-1.0";

/// One `<command>`: a verb element, an optional `<extension>`, and `<clTRID>`.
///
/// `body` serializes as the content of the verb element, so a unit body
/// yields `<logout/>` and an attribute-only struct yields `<poll op="req"/>`.
pub struct Command<'a, B: ?Sized, E: ?Sized = ()> {
    verb: &'static str,
    body: &'a B,
    extension: Option<&'a E>,
    cl_trid: &'a str,
}

impl<'a, B: Serialize + ?Sized> Command<'a, B> {
    pub fn new(verb: &'static str, body: &'a B, cl_trid: &'a str) -> Self {
        Self {
            verb,
            body,
            extension: None,
            cl_trid,
        }
    }
}

impl<'a, B: Serialize + ?Sized, E: Serialize + ?Sized> Command<'a, B, E> {
    /// Attach the content of the `<extension>` element.
    pub fn with_extension<X: Serialize + ?Sized>(self, extension: &'a X) -> Command<'a, B, X> {
        Command {
            verb: self.verb,
            body: self.body,
            extension: Some(extension),
            cl_trid: self.cl_trid,
        }
    }

    /// Client transaction identifier carried by this command.
    pub fn cl_trid(&self) -> &str {
        self.cl_trid
    }

    /// Render the full `<epp>` document.
    pub fn to_xml(&self) -> Result<String> {
        document(&CommandDocument {
            xmlns: EPP_NS,
            command: self,
        })
    }
}

impl<B: Serialize + ?Sized, E: Serialize + ?Sized> Serialize for Command<'_, B, E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("command", 3)?;
        s.serialize_field(self.verb, self.body)?;
        match self.extension {
            Some(extension) => s.serialize_field("extension", extension)?,
            None => s.skip_field("extension")?,
        }
        s.serialize_field("clTRID", self.cl_trid)?;
        s.end()
    }
}

/// A single named child element, for object wrappers such as
/// `<check><domain:check>..</domain:check></check>`.
pub struct Element<'a, T: ?Sized> {
    name: &'static str,
    content: &'a T,
}

impl<'a, T: Serialize + ?Sized> Element<'a, T> {
    pub fn new(name: &'static str, content: &'a T) -> Self {
        Self { name, content }
    }
}

impl<T: Serialize + ?Sized> Serialize for Element<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("element", 1)?;
        s.serialize_field(self.name, self.content)?;
        s.end()
    }
}

#[derive(Serialize)]
#[serde(rename = "epp")]
struct CommandDocument<'a, C: ?Sized> {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    command: &'a C,
}

#[derive(Serialize)]
#[serde(rename = "epp")]
struct HelloDocument {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    hello: (),
}

/// The `<hello/>` document.
pub fn hello_xml() -> Result<String> {
    document(&HelloDocument {
        xmlns: EPP_NS,
        hello: (),
    })
}

fn document<T: Serialize>(root: &T) -> Result<String> {
    let body = quick_xml::se::to_string(root)?;
    let mut xml = String::with_capacity(XML_DECLARATION.len() + body.len());
    xml.push_str(XML_DECLARATION);
    xml.push_str(&body);
    Ok(xml)
}

#[derive(Deserialize)]
struct ResponseDocument<D, E> {
    response: Response<D, E>,
}

/// `<result code="NNNN"><msg>..</msg></result>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultElement {
    #[serde(rename = "@code")]
    pub code: ResultCode,
    #[serde(default)]
    pub msg: String,
}

/// `<msgQ count=".." id="..">` announcing queued service messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MessageQueue {
    #[serde(rename = "@count")]
    pub count: u64,
    #[serde(rename = "@id", default)]
    pub id: String,
    #[serde(rename = "qDate", default, skip_serializing_if = "Option::is_none")]
    pub q_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

/// The client and server transaction identifiers echoed in every response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TransactionIds {
    #[serde(rename = "clTRID", default)]
    pub client: Option<String>,
    #[serde(rename = "svTRID", default)]
    pub server: String,
}

/// A parsed `<response>`, generic over the `<resData>` and `<extension>`
/// content. Use [`IgnoredAny`] for parts the caller does not need.
#[derive(Debug, Deserialize)]
pub struct Response<D = IgnoredAny, E = IgnoredAny> {
    #[serde(rename = "result")]
    results: Vec<ResultElement>,
    #[serde(rename = "msgQ", default)]
    pub message_queue: Option<MessageQueue>,
    #[serde(rename = "resData")]
    pub res_data: Option<D>,
    pub extension: Option<E>,
    #[serde(rename = "trID", default)]
    pub tr_id: TransactionIds,
}

impl<D, E> Response<D, E> {
    /// The first `<result>` element.
    pub fn result(&self) -> Option<&ResultElement> {
        self.results.first()
    }

    /// All `<result>` elements; failures may carry more than one.
    pub fn results(&self) -> &[ResultElement] {
        &self.results
    }

    /// Result code of the first `<result>`; a response without one is a
    /// command failure.
    pub fn code(&self) -> ResultCode {
        self.result()
            .map(|r| r.code)
            .unwrap_or(ResultCode::COMMAND_FAILED)
    }

    pub fn message(&self) -> &str {
        self.result().map(|r| r.msg.as_str()).unwrap_or_default()
    }

    pub fn is_success(&self) -> bool {
        self.code().is_success()
    }
}

/// `<extension><conditions>..</conditions></extension>` as sent by
/// registries that explain failures in structured form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConditionsExtension {
    #[serde(default)]
    pub conditions: Option<Conditions>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Conditions {
    #[serde(rename = "condition", default)]
    pub items: Vec<Condition>,
}

impl Response<IgnoredAny, ConditionsExtension> {
    /// Turn a failed response into the protocol error it describes.
    pub fn to_epp_error(&self) -> EppError {
        let conditions = self
            .extension
            .as_ref()
            .and_then(|ext| ext.conditions.as_ref())
            .map(|c| c.items.clone())
            .unwrap_or_default();
        EppError::new(self.code(), self.message()).with_conditions(conditions)
    }
}

/// Parse a response body.
pub fn parse_response<D: DeserializeOwned, E: DeserializeOwned>(
    xml: &[u8],
) -> Result<Response<D, E>> {
    let text = std::str::from_utf8(xml)?;
    let doc: ResponseDocument<D, E> = quick_xml::de::from_str(text)?;
    Ok(doc.response)
}

/// Parse only the outcome of a response: result, message queue,
/// transaction IDs and any registry conditions.
pub fn parse_status(xml: &[u8]) -> Result<Response<IgnoredAny, ConditionsExtension>> {
    parse_response(xml)
}

/// Parse a response and fail with [`EppError`] unless its code is a success.
pub fn expect_success<D: DeserializeOwned, E: DeserializeOwned>(
    xml: &[u8],
) -> Result<Response<D, E>> {
    let status = parse_status(xml)?;
    if !status.is_success() {
        return Err(status.to_epp_error().into());
    }
    parse_response(xml)
}
