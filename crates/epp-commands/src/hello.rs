//! `<hello/>` and the server `<greeting>`.

use epp_session::{hello_xml, Session};
use epp_transport::Dialer;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Data collection policy access level announced in the greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Access {
    All,
    None,
    Null,
    Other,
    Personal,
    PersonalAndOther,
}

/// What the server offers, from `<greeting>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Greeting {
    pub server_id: String,
    pub server_date: String,
    pub versions: Vec<String>,
    pub languages: Vec<String>,
    pub object_uris: Vec<String>,
    pub extension_uris: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
}

impl Greeting {
    /// Parse a greeting document, such as the one returned by
    /// [`Session::greeting`].
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(xml).map_err(epp_session::SessionError::from)?;
        let doc: GreetingDocument =
            quick_xml::de::from_str(text).map_err(epp_session::SessionError::from)?;
        let raw = doc.greeting;
        Ok(Self {
            server_id: raw.sv_id,
            server_date: raw.sv_date,
            versions: raw.menu.versions,
            languages: raw.menu.languages,
            object_uris: raw.menu.object_uris,
            extension_uris: raw.menu.extension.map(|e| e.uris).unwrap_or_default(),
            access: raw.dcp.map(|d| d.access.level),
        })
    }

    /// Whether the server announced the given object or extension namespace.
    pub fn supports(&self, uri: &str) -> bool {
        self.object_uris.iter().any(|u| u == uri) || self.extension_uris.iter().any(|u| u == uri)
    }
}

#[derive(Deserialize)]
struct GreetingDocument {
    greeting: RawGreeting,
}

#[derive(Deserialize)]
struct RawGreeting {
    #[serde(rename = "svID")]
    sv_id: String,
    #[serde(rename = "svDate", default)]
    sv_date: String,
    #[serde(rename = "svcMenu")]
    menu: ServiceMenu,
    #[serde(default)]
    dcp: Option<Dcp>,
}

#[derive(Deserialize)]
struct ServiceMenu {
    #[serde(rename = "version", default)]
    versions: Vec<String>,
    #[serde(rename = "lang", default)]
    languages: Vec<String>,
    #[serde(rename = "objURI", default)]
    object_uris: Vec<String>,
    #[serde(rename = "svcExtension", default)]
    extension: Option<ServiceExtension>,
}

#[derive(Deserialize)]
struct ServiceExtension {
    #[serde(rename = "extURI", default)]
    uris: Vec<String>,
}

#[derive(Deserialize)]
struct Dcp {
    access: AccessElement,
}

#[derive(Deserialize)]
struct AccessElement {
    #[serde(rename = "$value")]
    level: Access,
}

/// Send `<hello/>` and parse the greeting it provokes. Works before login.
pub fn hello<D: Dialer>(session: &mut Session<D>) -> Result<Greeting> {
    let xml = hello_xml()?;
    let raw = session.send_command(xml.as_bytes())?;
    Greeting::parse(&raw)
}
