//! nic.at `<withdraw>`: give a domain back to the registry.

use epp_session::envelope::{AT_EXT_EPP_NS, DOMAIN_NS};
use epp_session::{Command, Element, Session};
use epp_transport::Dialer;
use serde::de::IgnoredAny;
use serde::Serialize;

use crate::error::Result;
use crate::execute::{execute, Outcome};
use crate::validate;

#[derive(Serialize)]
struct WithdrawXml<'a> {
    #[serde(rename = "@xmlns:domain")]
    xmlns: &'static str,
    #[serde(rename = "domain:name")]
    name: &'a str,
}

#[derive(Serialize)]
struct WithdrawExtension<'a> {
    #[serde(rename = "@xmlns:at-ext-epp")]
    xmlns: &'static str,
    #[serde(rename = "at-ext-epp:domain")]
    domain: &'a str,
}

pub fn withdraw<D: Dialer>(session: &mut Session<D>, name: &str) -> Result<Outcome> {
    validate::domain_name(name)?;
    let body = WithdrawXml {
        xmlns: DOMAIN_NS,
        name,
    };
    let extension = WithdrawExtension {
        xmlns: AT_EXT_EPP_NS,
        domain: name,
    };
    let response = execute::<_, IgnoredAny, IgnoredAny, _>(session, |id| {
        Command::new("withdraw", &Element::new("domain:withdraw", &body), id)
            .with_extension(&Element::new("at-ext-epp:withdraw", &extension))
            .to_xml()
    })?;
    Ok(Outcome::from(&response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, reply};

    #[test]
    fn withdraw_document() {
        let (mut session, server) = testing::logged_in(vec![testing::ok()]);
        let outcome = withdraw(&mut session, "example.at").unwrap();
        assert_eq!(outcome.client_trid.as_deref(), Some("T-x"));

        let seen = server.join().unwrap();
        assert!(seen[0].ends_with(concat!(
            r#"<command><withdraw><domain:withdraw xmlns:domain="urn:ietf:params:xml:ns:domain-1.0">"#,
            "<domain:name>example.at</domain:name></domain:withdraw></withdraw>",
            r#"<extension><at-ext-epp:withdraw xmlns:at-ext-epp="http://www.nic.at/xsd/at-ext-epp-1.0">"#,
            "<at-ext-epp:domain>example.at</at-ext-epp:domain></at-ext-epp:withdraw></extension>",
            "<clTRID>T-2</clTRID></command></epp>"
        )));
    }

    #[test]
    fn withdraw_rejected() {
        let (mut session, server) =
            testing::logged_in(vec![reply(2201, "Authorization error", "", "")]);
        let err = withdraw(&mut session, "other.at").unwrap_err();
        assert_eq!(
            err.result_code(),
            Some(epp_session::ResultCode::AUTHORIZATION_ERROR)
        );
        server.join().unwrap();
    }
}
