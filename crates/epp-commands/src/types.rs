use serde::{Deserialize, Serialize};

/// An object status value such as `clientHold`, with optional free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    #[serde(rename = "@s")]
    pub value: String,
    #[serde(rename = "$text", default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Status {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Availability of one name or ID from a `<check>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub id: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `<chkData>` for any object type; the key element is `name` for domains
/// and `id` for contacts.
#[derive(Debug, Deserialize)]
pub(crate) struct CheckData {
    #[serde(rename = "chkData")]
    pub(crate) chk: CheckList,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckList {
    #[serde(rename = "cd", default)]
    pub(crate) items: Vec<CheckItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckItem {
    #[serde(alias = "name", alias = "id")]
    key: CheckKey,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckKey {
    #[serde(rename = "@avail")]
    avail: String,
    #[serde(rename = "$text")]
    value: String,
}

impl From<CheckItem> for Availability {
    fn from(item: CheckItem) -> Self {
        Self {
            available: matches!(item.key.avail.trim(), "1" | "true"),
            id: item.key.value,
            reason: item.reason,
        }
    }
}

impl CheckData {
    pub(crate) fn into_availability(self) -> Vec<Availability> {
        self.chk.items.into_iter().map(Availability::from).collect()
    }
}
