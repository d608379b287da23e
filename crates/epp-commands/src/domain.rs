//! Domain object commands (RFC 5731).

use std::net::IpAddr;

use epp_session::envelope::DOMAIN_NS;
use epp_session::{Command, Element, Session};
use epp_transport::Dialer;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::execute::{execute, missing_res_data, Outcome};
use crate::types::{Availability, CheckData, Status};
use crate::validate::{self, ValidationError};

/// Status added by [`hold`].
pub const CLIENT_HOLD: &str = "clientHold";

/// A contact linked to a domain in a given role (`admin`, `tech`, `billing`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainContact {
    #[serde(rename = "@type")]
    pub role: String,
    #[serde(rename = "$text")]
    pub id: String,
}

impl DomainContact {
    pub fn new(role: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            id: id.into(),
        }
    }
}

/// A name server given by host name plus optional glue addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostAttr {
    pub name: String,
    pub addresses: Vec<IpAddr>,
}

impl HostAttr {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            addresses: Vec::new(),
        }
    }

    pub fn with_address(mut self, address: IpAddr) -> Self {
        self.addresses.push(address);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PeriodUnit {
    Year,
    Month,
}

/// Registration period, 1-99 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub value: u8,
    pub unit: PeriodUnit,
}

impl Period {
    pub fn years(value: u8) -> Self {
        Self {
            value,
            unit: PeriodUnit::Year,
        }
    }

    pub fn months(value: u8) -> Self {
        Self {
            value,
            unit: PeriodUnit::Month,
        }
    }
}

/// Input to [`create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainCreate {
    pub name: String,
    pub period: Option<Period>,
    pub nameservers: Vec<HostAttr>,
    pub registrant: Option<String>,
    pub contacts: Vec<DomainContact>,
    pub auth_info: Option<String>,
}

/// `<domain:creData>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCreated {
    pub name: String,
    #[serde(rename = "crDate")]
    pub created: String,
    #[serde(rename = "exDate", default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

/// Parsed `<domain:infData>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DomainInfo {
    pub name: String,
    pub roid: String,
    pub statuses: Vec<Status>,
    pub registrant: Option<String>,
    pub contacts: Vec<DomainContact>,
    pub nameservers: Vec<String>,
    pub hosts: Vec<String>,
    pub client_id: String,
    pub creator_id: Option<String>,
    pub created: Option<String>,
    pub updater_id: Option<String>,
    pub updated: Option<String>,
    pub expires: Option<String>,
    pub transferred: Option<String>,
    pub auth_info: Option<String>,
}

/// Items added to or removed from a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainChanges {
    pub nameservers: Vec<HostAttr>,
    pub contacts: Vec<DomainContact>,
    pub statuses: Vec<Status>,
}

/// Replacement values for a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainChg {
    pub registrant: Option<String>,
    pub auth_info: Option<String>,
}

/// Input to [`update`]. Absent blocks are omitted; present but empty blocks
/// are sent as empty elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainUpdate {
    pub name: String,
    pub add: Option<DomainChanges>,
    pub rem: Option<DomainChanges>,
    pub chg: Option<DomainChg>,
}

impl DomainUpdate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOp {
    Request,
    Query,
    Cancel,
}

impl TransferOp {
    fn as_str(self) -> &'static str {
        match self {
            TransferOp::Request => "request",
            TransferOp::Query => "query",
            TransferOp::Cancel => "cancel",
        }
    }
}

/// `<domain:trnData>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferData {
    pub name: String,
    #[serde(rename = "trStatus")]
    pub status: String,
    #[serde(rename = "reID", default)]
    pub requested_by: String,
    #[serde(rename = "reDate", default)]
    pub requested_at: String,
    #[serde(rename = "acID", default)]
    pub action_by: String,
    #[serde(rename = "acDate", default)]
    pub action_at: String,
    #[serde(rename = "exDate", default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

/// Result of a transfer operation; 1001 means the request is pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub outcome: Outcome,
    pub data: Option<TransferData>,
}

// Wire shapes.

#[derive(Serialize)]
struct NameList<'a> {
    #[serde(rename = "@xmlns:domain")]
    xmlns: &'static str,
    #[serde(rename = "domain:name")]
    names: &'a [&'a str],
}

#[derive(Serialize)]
struct NameOnly<'a> {
    #[serde(rename = "@xmlns:domain")]
    xmlns: &'static str,
    #[serde(rename = "domain:name")]
    name: &'a str,
}

#[derive(Serialize)]
struct PeriodXml {
    #[serde(rename = "@unit")]
    unit: &'static str,
    #[serde(rename = "$text")]
    value: u8,
}

impl From<Period> for PeriodXml {
    fn from(period: Period) -> Self {
        Self {
            unit: match period.unit {
                PeriodUnit::Year => "y",
                PeriodUnit::Month => "m",
            },
            value: period.value,
        }
    }
}

#[derive(Serialize)]
struct NsXml<'a> {
    #[serde(rename = "domain:hostAttr")]
    hosts: Vec<HostAttrXml<'a>>,
}

#[derive(Serialize)]
struct HostAttrXml<'a> {
    #[serde(rename = "domain:hostName")]
    name: &'a str,
    #[serde(rename = "domain:hostAddr")]
    addresses: Vec<HostAddrXml>,
}

#[derive(Serialize)]
struct HostAddrXml {
    #[serde(rename = "@ip")]
    ip: &'static str,
    #[serde(rename = "$text")]
    address: String,
}

fn ns_xml(hosts: &[HostAttr]) -> Option<NsXml<'_>> {
    if hosts.is_empty() {
        return None;
    }
    Some(NsXml {
        hosts: hosts
            .iter()
            .map(|host| HostAttrXml {
                name: &host.name,
                addresses: host
                    .addresses
                    .iter()
                    .map(|addr| HostAddrXml {
                        ip: if addr.is_ipv6() { "v6" } else { "v4" },
                        address: addr.to_string(),
                    })
                    .collect(),
            })
            .collect(),
    })
}

#[derive(Serialize)]
struct AuthInfoXml<'a> {
    #[serde(rename = "domain:pw")]
    pw: &'a str,
}

#[derive(Serialize)]
struct CreateXml<'a> {
    #[serde(rename = "@xmlns:domain")]
    xmlns: &'static str,
    #[serde(rename = "domain:name")]
    name: &'a str,
    #[serde(rename = "domain:period", skip_serializing_if = "Option::is_none")]
    period: Option<PeriodXml>,
    #[serde(rename = "domain:ns", skip_serializing_if = "Option::is_none")]
    ns: Option<NsXml<'a>>,
    #[serde(rename = "domain:registrant", skip_serializing_if = "Option::is_none")]
    registrant: Option<&'a str>,
    #[serde(rename = "domain:contact")]
    contacts: &'a [DomainContact],
    #[serde(rename = "domain:authInfo", skip_serializing_if = "Option::is_none")]
    auth_info: Option<AuthInfoXml<'a>>,
}

#[derive(Serialize)]
struct ChangesXml<'a> {
    #[serde(rename = "domain:ns", skip_serializing_if = "Option::is_none")]
    ns: Option<NsXml<'a>>,
    #[serde(rename = "domain:contact")]
    contacts: &'a [DomainContact],
    #[serde(rename = "domain:status")]
    statuses: &'a [Status],
}

impl<'a> From<&'a DomainChanges> for ChangesXml<'a> {
    fn from(changes: &'a DomainChanges) -> Self {
        Self {
            ns: ns_xml(&changes.nameservers),
            contacts: &changes.contacts,
            statuses: &changes.statuses,
        }
    }
}

#[derive(Serialize)]
struct ChgXml<'a> {
    #[serde(rename = "domain:registrant", skip_serializing_if = "Option::is_none")]
    registrant: Option<&'a str>,
    #[serde(rename = "domain:authInfo", skip_serializing_if = "Option::is_none")]
    auth_info: Option<AuthInfoXml<'a>>,
}

#[derive(Serialize)]
pub(crate) struct UpdateXml<'a> {
    #[serde(rename = "@xmlns:domain")]
    xmlns: &'static str,
    #[serde(rename = "domain:name")]
    name: &'a str,
    #[serde(rename = "domain:add", skip_serializing_if = "Option::is_none")]
    add: Option<ChangesXml<'a>>,
    #[serde(rename = "domain:rem", skip_serializing_if = "Option::is_none")]
    rem: Option<ChangesXml<'a>>,
    #[serde(rename = "domain:chg", skip_serializing_if = "Option::is_none")]
    chg: Option<ChgXml<'a>>,
}

impl<'a> From<&'a DomainUpdate> for UpdateXml<'a> {
    fn from(update: &'a DomainUpdate) -> Self {
        Self {
            xmlns: DOMAIN_NS,
            name: &update.name,
            add: update.add.as_ref().map(ChangesXml::from),
            rem: update.rem.as_ref().map(ChangesXml::from),
            chg: update.chg.as_ref().map(|chg| ChgXml {
                registrant: chg.registrant.as_deref(),
                auth_info: chg.auth_info.as_deref().map(|pw| AuthInfoXml { pw }),
            }),
        }
    }
}

#[derive(Serialize)]
struct TransferVerb<'a> {
    #[serde(rename = "@op")]
    op: &'static str,
    #[serde(rename = "domain:transfer")]
    transfer: TransferXml<'a>,
}

#[derive(Serialize)]
struct TransferXml<'a> {
    #[serde(rename = "@xmlns:domain")]
    xmlns: &'static str,
    #[serde(rename = "domain:name")]
    name: &'a str,
    #[serde(rename = "domain:authInfo", skip_serializing_if = "Option::is_none")]
    auth_info: Option<AuthInfoXml<'a>>,
}

#[derive(Deserialize)]
struct CreData {
    #[serde(rename = "creData")]
    cre: DomainCreated,
}

#[derive(Deserialize)]
struct InfData {
    #[serde(rename = "infData")]
    inf: RawInfo,
}

#[derive(Deserialize)]
struct RawInfo {
    name: String,
    #[serde(default)]
    roid: String,
    #[serde(rename = "status", default)]
    statuses: Vec<Status>,
    #[serde(default)]
    registrant: Option<String>,
    #[serde(rename = "contact", default)]
    contacts: Vec<DomainContact>,
    #[serde(default)]
    ns: Option<RawNs>,
    #[serde(rename = "host", default)]
    hosts: Vec<String>,
    #[serde(rename = "clID", default)]
    client_id: String,
    #[serde(rename = "crID", default)]
    creator_id: Option<String>,
    #[serde(rename = "crDate", default)]
    created: Option<String>,
    #[serde(rename = "upID", default)]
    updater_id: Option<String>,
    #[serde(rename = "upDate", default)]
    updated: Option<String>,
    #[serde(rename = "exDate", default)]
    expires: Option<String>,
    #[serde(rename = "trDate", default)]
    transferred: Option<String>,
    #[serde(rename = "authInfo", default)]
    auth_info: Option<RawAuthInfo>,
}

#[derive(Deserialize)]
struct RawNs {
    #[serde(rename = "hostObj", default)]
    objects: Vec<String>,
    #[serde(rename = "hostAttr", default)]
    attrs: Vec<RawHostAttr>,
}

#[derive(Deserialize)]
struct RawHostAttr {
    #[serde(rename = "hostName")]
    name: String,
}

#[derive(Deserialize)]
struct RawAuthInfo {
    #[serde(default)]
    pw: Option<String>,
}

impl From<RawInfo> for DomainInfo {
    fn from(raw: RawInfo) -> Self {
        let nameservers = raw
            .ns
            .map(|ns| {
                let mut names = ns.objects;
                names.extend(ns.attrs.into_iter().map(|a| a.name));
                names
            })
            .unwrap_or_default();
        Self {
            name: raw.name,
            roid: raw.roid,
            statuses: raw.statuses,
            registrant: raw.registrant,
            contacts: raw.contacts,
            nameservers,
            hosts: raw.hosts,
            client_id: raw.client_id,
            creator_id: raw.creator_id,
            created: raw.created,
            updater_id: raw.updater_id,
            updated: raw.updated,
            expires: raw.expires,
            transferred: raw.transferred,
            auth_info: raw.auth_info.and_then(|a| a.pw),
        }
    }
}

#[derive(Deserialize)]
struct TrnData {
    #[serde(rename = "trnData")]
    trn: TransferData,
}

// Commands.

/// Check availability of one or more domain names.
pub fn check<D: Dialer>(session: &mut Session<D>, names: &[&str]) -> Result<Vec<Availability>> {
    if names.is_empty() {
        return Err(ValidationError::Empty {
            field: "domain names",
        }
        .into());
    }
    for name in names {
        validate::domain_name(name)?;
    }

    let body = NameList {
        xmlns: DOMAIN_NS,
        names,
    };
    let response = execute::<_, CheckData, IgnoredAny, _>(session, |id| {
        Command::new("check", &Element::new("domain:check", &body), id).to_xml()
    })?;
    Ok(response
        .res_data
        .map(CheckData::into_availability)
        .unwrap_or_default())
}

pub fn create<D: Dialer>(session: &mut Session<D>, domain: &DomainCreate) -> Result<DomainCreated> {
    validate::domain_name(&domain.name)?;
    if let Some(registrant) = &domain.registrant {
        validate::contact_id(registrant)?;
    }
    for contact in &domain.contacts {
        validate::contact_id(&contact.id)?;
    }
    for host in &domain.nameservers {
        validate::domain_name(&host.name)?;
    }
    if let Some(pw) = &domain.auth_info {
        validate::auth_info(pw)?;
    }
    if let Some(period) = domain.period {
        if !(1..=99).contains(&period.value) {
            return Err(ValidationError::Other("period must be between 1 and 99").into());
        }
    }

    let body = CreateXml {
        xmlns: DOMAIN_NS,
        name: &domain.name,
        period: domain.period.map(PeriodXml::from),
        ns: ns_xml(&domain.nameservers),
        registrant: domain.registrant.as_deref(),
        contacts: &domain.contacts,
        auth_info: domain.auth_info.as_deref().map(|pw| AuthInfoXml { pw }),
    };
    let response = execute::<_, CreData, IgnoredAny, _>(session, |id| {
        Command::new("create", &Element::new("domain:create", &body), id).to_xml()
    })?;
    missing_res_data(response.res_data.map(|d| d.cre))
}

pub fn info<D: Dialer>(session: &mut Session<D>, name: &str) -> Result<DomainInfo> {
    validate::domain_name(name)?;
    let body = NameOnly {
        xmlns: DOMAIN_NS,
        name,
    };
    let response = execute::<_, InfData, IgnoredAny, _>(session, |id| {
        Command::new("info", &Element::new("domain:info", &body), id).to_xml()
    })?;
    missing_res_data(response.res_data.map(|d| DomainInfo::from(d.inf)))
}

pub fn update<D: Dialer>(session: &mut Session<D>, update: &DomainUpdate) -> Result<Outcome> {
    validate_update(update)?;
    let body = UpdateXml::from(update);
    let response = execute::<_, IgnoredAny, IgnoredAny, _>(session, |id| {
        Command::new("update", &Element::new("domain:update", &body), id).to_xml()
    })?;
    Ok(Outcome::from(&response))
}

pub(crate) fn validate_update(update: &DomainUpdate) -> Result<()> {
    validate::domain_name(&update.name)?;
    for changes in [&update.add, &update.rem].into_iter().flatten() {
        for contact in &changes.contacts {
            validate::contact_id(&contact.id)?;
        }
        for host in &changes.nameservers {
            validate::domain_name(&host.name)?;
        }
    }
    if let Some(chg) = &update.chg {
        if let Some(registrant) = &chg.registrant {
            validate::contact_id(registrant)?;
        }
        if let Some(pw) = &chg.auth_info {
            validate::auth_info(pw)?;
        }
    }
    Ok(())
}

pub(crate) fn update_xml(update: &DomainUpdate) -> UpdateXml<'_> {
    UpdateXml::from(update)
}

pub fn delete<D: Dialer>(session: &mut Session<D>, name: &str) -> Result<Outcome> {
    validate::domain_name(name)?;
    let body = NameOnly {
        xmlns: DOMAIN_NS,
        name,
    };
    let response = execute::<_, IgnoredAny, IgnoredAny, _>(session, |id| {
        Command::new("delete", &Element::new("domain:delete", &body), id).to_xml()
    })?;
    Ok(Outcome::from(&response))
}

/// Run a transfer operation. `auth_info` is sent with requests only.
pub fn transfer<D: Dialer>(
    session: &mut Session<D>,
    name: &str,
    op: TransferOp,
    auth_info: Option<&str>,
) -> Result<Transfer> {
    validate::domain_name(name)?;
    let auth_info = match op {
        TransferOp::Request => {
            let pw = auth_info.ok_or(ValidationError::Empty { field: "auth info" })?;
            validate::auth_info(pw)?;
            Some(AuthInfoXml { pw })
        }
        TransferOp::Query | TransferOp::Cancel => None,
    };

    let body = TransferVerb {
        op: op.as_str(),
        transfer: TransferXml {
            xmlns: DOMAIN_NS,
            name,
            auth_info,
        },
    };
    let response = execute::<_, TrnData, IgnoredAny, _>(session, |id| {
        Command::new("transfer", &body, id).to_xml()
    })?;
    Ok(Transfer {
        outcome: Outcome::from(&response),
        data: response.res_data.map(|d| d.trn),
    })
}

pub fn transfer_request<D: Dialer>(
    session: &mut Session<D>,
    name: &str,
    auth_info: &str,
) -> Result<Transfer> {
    transfer(session, name, TransferOp::Request, Some(auth_info))
}

pub fn transfer_query<D: Dialer>(session: &mut Session<D>, name: &str) -> Result<Transfer> {
    transfer(session, name, TransferOp::Query, None)
}

pub fn transfer_cancel<D: Dialer>(session: &mut Session<D>, name: &str) -> Result<Transfer> {
    transfer(session, name, TransferOp::Cancel, None)
}

/// Put a domain on hold by adding the `clientHold` status.
pub fn hold<D: Dialer>(session: &mut Session<D>, name: &str) -> Result<Outcome> {
    let mut request = DomainUpdate::new(name);
    request.add = Some(DomainChanges {
        statuses: vec![Status::new(CLIENT_HOLD)],
        ..DomainChanges::default()
    });
    update(session, &request)
}


#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr};

    use super::*;
    use crate::testing::{self, reply};
    use crate::CommandError;

    const CHK: &str = concat!(
        r#"<domain:chkData xmlns:domain="urn:ietf:params:xml:ns:domain-1.0">"#,
        r#"<domain:cd><domain:name avail="1">free.at</domain:name></domain:cd>"#,
        r#"<domain:cd><domain:name avail="0">taken.at</domain:name>"#,
        "<domain:reason>In use</domain:reason></domain:cd>",
        "</domain:chkData>"
    );

    #[test]
    fn check_names() {
        let (mut session, server) = testing::logged_in(vec![reply(1000, "ok", CHK, "")]);

        let result = check(&mut session, &["free.at", "taken.at"]).unwrap();
        assert_eq!(
            result,
            vec![
                Availability {
                    id: "free.at".into(),
                    available: true,
                    reason: None
                },
                Availability {
                    id: "taken.at".into(),
                    available: false,
                    reason: Some("In use".into())
                },
            ]
        );

        let seen = server.join().unwrap();
        assert!(seen[0].contains(concat!(
            r#"<check><domain:check xmlns:domain="urn:ietf:params:xml:ns:domain-1.0">"#,
            "<domain:name>free.at</domain:name><domain:name>taken.at</domain:name>",
            "</domain:check></check><clTRID>T-2</clTRID>"
        )));
    }

    #[test]
    fn check_validates_before_sending() {
        let (mut session, server) = testing::logged_in(vec![]);
        let err = check(&mut session, &["ok.at", "bad_name.at"]).unwrap_err();
        assert!(matches!(err, CommandError::Validation(_)));
        assert!(matches!(
            check(&mut session, &[]).unwrap_err(),
            CommandError::Validation(ValidationError::Empty { .. })
        ));
        assert!(server.join().unwrap().is_empty());
    }

    #[test]
    fn commands_require_login() {
        let (mut session, server) = testing::connected(vec![]);
        let err = info(&mut session, "example.at").unwrap_err();
        assert!(matches!(
            err,
            CommandError::Session(epp_session::SessionError::NotAuthenticated)
        ));
        server.join().unwrap();
    }

    #[test]
    fn create_serializes_all_parts() {
        let cre = concat!(
            r#"<domain:creData xmlns:domain="urn:ietf:params:xml:ns:domain-1.0">"#,
            "<domain:name>new.at</domain:name><domain:crDate>2024-05-01T10:00:00Z</domain:crDate>",
            "<domain:exDate>2025-05-01T10:00:00Z</domain:exDate></domain:creData>"
        );
        let (mut session, server) = testing::logged_in(vec![reply(1000, "ok", cre, "")]);

        let request = DomainCreate {
            name: "new.at".into(),
            period: Some(Period::years(1)),
            nameservers: vec![
                HostAttr::new("ns1.new.at")
                    .with_address(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)))
                    .with_address(IpAddr::V6(Ipv6Addr::LOCALHOST)),
                HostAttr::new("ns.example.net"),
            ],
            registrant: Some("REG-1".into()),
            contacts: vec![DomainContact::new("tech", "TECH-1")],
            auth_info: Some("s3cr3t-pw".into()),
        };
        let created = create(&mut session, &request).unwrap();
        assert_eq!(created.name, "new.at");
        assert_eq!(created.expires.as_deref(), Some("2025-05-01T10:00:00Z"));

        let seen = server.join().unwrap();
        let xml = &seen[0];
        assert!(xml.contains(r#"<domain:period unit="y">1</domain:period>"#));
        assert!(xml.contains(concat!(
            "<domain:ns><domain:hostAttr><domain:hostName>ns1.new.at</domain:hostName>",
            r#"<domain:hostAddr ip="v4">192.0.2.1</domain:hostAddr>"#,
            r#"<domain:hostAddr ip="v6">::1</domain:hostAddr></domain:hostAttr>"#,
            "<domain:hostAttr><domain:hostName>ns.example.net</domain:hostName></domain:hostAttr></domain:ns>"
        )));
        assert!(xml.contains("<domain:registrant>REG-1</domain:registrant>"));
        assert!(xml.contains(r#"<domain:contact type="tech">TECH-1</domain:contact>"#));
        assert!(xml.contains("<domain:authInfo><domain:pw>s3cr3t-pw</domain:pw></domain:authInfo>"));
    }

    #[test]
    fn create_failure_is_protocol_error() {
        let (mut session, server) =
            testing::logged_in(vec![reply(2302, "Object exists", "", "")]);
        let err = create(
            &mut session,
            &DomainCreate {
                name: "taken.at".into(),
                ..DomainCreate::default()
            },
        )
        .unwrap_err();
        assert_eq!(err.result_code().map(|c| c.as_u16()), Some(2302));
        assert_eq!(err.epp_error().unwrap().message, "Object exists");
        // A registry rejection leaves the session usable.
        assert_eq!(session.state(), epp_session::SessionState::Authenticated);
        server.join().unwrap();
    }

    #[test]
    fn info_parses_inf_data() {
        let inf = concat!(
            r#"<domain:infData xmlns:domain="urn:ietf:params:xml:ns:domain-1.0">"#,
            "<domain:name>example.at</domain:name><domain:roid>EX-1</domain:roid>",
            r#"<domain:status s="ok"/><domain:status s="clientHold">payment</domain:status>"#,
            "<domain:registrant>REG-1</domain:registrant>",
            r#"<domain:contact type="admin">ADM-1</domain:contact>"#,
            r#"<domain:contact type="tech">TECH-1</domain:contact>"#,
            "<domain:ns><domain:hostAttr><domain:hostName>ns1.example.at</domain:hostName>",
            r#"<domain:hostAddr ip="v4">192.0.2.1</domain:hostAddr></domain:hostAttr>"#,
            "<domain:hostAttr><domain:hostName>ns2.example.net</domain:hostName></domain:hostAttr></domain:ns>",
            "<domain:clID>REG-TEST</domain:clID><domain:crID>REG-TEST</domain:crID>",
            "<domain:crDate>2020-01-01T00:00:00Z</domain:crDate>",
            "<domain:exDate>2030-01-01T00:00:00Z</domain:exDate>",
            "<domain:authInfo><domain:pw>abc123xyz</domain:pw></domain:authInfo>",
            "</domain:infData>"
        );
        let (mut session, server) = testing::logged_in(vec![reply(1000, "ok", inf, "")]);

        let info = info(&mut session, "example.at").unwrap();
        assert_eq!(info.name, "example.at");
        assert_eq!(info.roid, "EX-1");
        assert_eq!(info.statuses.len(), 2);
        assert_eq!(info.statuses[1].value, "clientHold");
        assert_eq!(info.statuses[1].text.as_deref(), Some("payment"));
        assert_eq!(info.registrant.as_deref(), Some("REG-1"));
        assert_eq!(info.contacts[0], DomainContact::new("admin", "ADM-1"));
        assert_eq!(info.nameservers, vec!["ns1.example.at", "ns2.example.net"]);
        assert_eq!(info.client_id, "REG-TEST");
        assert_eq!(info.expires.as_deref(), Some("2030-01-01T00:00:00Z"));
        assert_eq!(info.auth_info.as_deref(), Some("abc123xyz"));

        let seen = server.join().unwrap();
        assert!(seen[0].contains(concat!(
            r#"<info><domain:info xmlns:domain="urn:ietf:params:xml:ns:domain-1.0">"#,
            "<domain:name>example.at</domain:name></domain:info></info>"
        )));
    }

    #[test]
    fn update_keeps_absent_and_empty_blocks_apart() {
        let (mut session, server) = testing::logged_in(vec![testing::ok()]);

        let mut request = DomainUpdate::new("example.at");
        request.add = Some(DomainChanges {
            nameservers: vec![HostAttr::new("ns3.example.at")],
            contacts: vec![DomainContact::new("tech", "TECH-2")],
            statuses: vec![Status::new("clientTransferProhibited")],
        });
        request.rem = Some(DomainChanges::default());
        request.chg = Some(DomainChg {
            registrant: Some("REG-2".into()),
            auth_info: None,
        });
        let outcome = update(&mut session, &request).unwrap();
        assert_eq!(outcome.code, epp_session::ResultCode::SUCCESS);
        assert_eq!(outcome.server_trid, "SV-42");

        let seen = server.join().unwrap();
        let xml = &seen[0];
        assert!(xml.contains(concat!(
            "<domain:add><domain:ns><domain:hostAttr><domain:hostName>ns3.example.at</domain:hostName>",
            "</domain:hostAttr></domain:ns>",
            r#"<domain:contact type="tech">TECH-2</domain:contact>"#,
            r#"<domain:status s="clientTransferProhibited"/></domain:add>"#
        )));
        assert!(xml.contains("<domain:rem/>"));
        assert!(xml.contains("<domain:chg><domain:registrant>REG-2</domain:registrant></domain:chg>"));
    }

    #[test]
    fn hold_adds_client_hold() {
        let (mut session, server) = testing::logged_in(vec![testing::ok()]);
        hold(&mut session, "example.at").unwrap();

        let seen = server.join().unwrap();
        assert!(seen[0].contains(r#"<domain:add><domain:status s="clientHold"/></domain:add>"#));
        assert!(!seen[0].contains("<domain:chg"));
        assert!(!seen[0].contains("<domain:rem"));
    }

    #[test]
    fn delete_domain() {
        let (mut session, server) = testing::logged_in(vec![testing::ok()]);
        delete(&mut session, "gone.at").unwrap();
        let seen = server.join().unwrap();
        assert!(seen[0].contains("<delete><domain:delete"));
        assert!(seen[0].contains("<domain:name>gone.at</domain:name>"));
    }

    #[test]
    fn transfer_request_pending() {
        let trn = concat!(
            r#"<domain:trnData xmlns:domain="urn:ietf:params:xml:ns:domain-1.0">"#,
            "<domain:name>move.at</domain:name><domain:trStatus>pending</domain:trStatus>",
            "<domain:reID>REG-TEST</domain:reID><domain:reDate>2024-05-01T10:00:00Z</domain:reDate>",
            "<domain:acID>REG-OLD</domain:acID><domain:acDate>2024-05-06T10:00:00Z</domain:acDate>",
            "</domain:trnData>"
        );
        let (mut session, server) = testing::logged_in(vec![
            reply(1001, "Command completed successfully; action pending", trn, ""),
            reply(1000, "ok", trn, ""),
            testing::ok(),
        ]);

        let requested = transfer_request(&mut session, "move.at", "auth-code-1").unwrap();
        assert_eq!(requested.outcome.code, epp_session::ResultCode::SUCCESS_ACTION_PENDING);
        let data = requested.data.unwrap();
        assert_eq!(data.status, "pending");
        assert_eq!(data.action_by, "REG-OLD");

        let queried = transfer_query(&mut session, "move.at").unwrap();
        assert_eq!(queried.data.unwrap().requested_by, "REG-TEST");

        let cancelled = transfer_cancel(&mut session, "move.at").unwrap();
        assert!(cancelled.data.is_none());

        let seen = server.join().unwrap();
        assert!(seen[0].contains(r#"<transfer op="request"><domain:transfer"#));
        assert!(seen[0].contains("<domain:authInfo><domain:pw>auth-code-1</domain:pw></domain:authInfo>"));
        assert!(seen[1].contains(r#"<transfer op="query">"#));
        assert!(!seen[1].contains("authInfo"));
        assert!(seen[2].contains(r#"<transfer op="cancel">"#));
    }

    #[test]
    fn transfer_request_needs_auth_info() {
        let (mut session, server) = testing::logged_in(vec![]);
        let err = transfer(&mut session, "move.at", TransferOp::Request, None).unwrap_err();
        assert!(matches!(err, CommandError::Validation(_)));
        server.join().unwrap();
    }
}
