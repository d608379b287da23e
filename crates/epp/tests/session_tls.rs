//! Full stack over a real TLS connection: dial, greeting, login, commands
//! and logout.

mod common;

use std::time::Duration;

use common::Registry;
use epp::commands::domain;
use epp::{CommandError, ResultCode, RootStore, Session, SessionConfig, SessionError, SessionState, TlsConfig};

fn config(registry: &Registry, password: &str) -> SessionConfig {
    SessionConfig::new("localhost", "REG-TEST", password)
        .with_port(registry.port)
        .with_timeout(Duration::from_secs(5))
        .with_tls(TlsConfig {
            roots: RootStore::Custom(vec![registry.pki.ca_der.clone()]),
            client_identity: None,
        })
}

#[test]
fn check_over_tls() {
    let registry = Registry::start();
    let mut session = Session::new(config(&registry, "secret-pw")).unwrap();

    session.connect().unwrap();
    assert_eq!(session.state(), SessionState::Connected);
    let greeting = epp::Greeting::parse(session.greeting().unwrap()).unwrap();
    assert_eq!(greeting.server_id, "Scripted Registry");

    session.login().unwrap();
    assert_eq!(session.state(), SessionState::Authenticated);

    let result = domain::check(&mut session, &["free.at", "taken.at"]).unwrap();
    assert!(result[0].available);
    assert!(!result[1].available);
    assert_eq!(result[1].reason.as_deref(), Some("In use"));

    let err = domain::info(&mut session, "missing.at").unwrap_err();
    assert_eq!(err.result_code(), Some(ResultCode::OBJECT_DOES_NOT_EXIST));
    assert_eq!(session.state(), SessionState::Authenticated);

    session.logout().unwrap();
    assert_eq!(session.state(), SessionState::Disconnected);

    let requests = registry.requests();
    assert_eq!(requests.len(), 4);
    assert!(requests[0].contains("<clID>REG-TEST</clID>"));
    assert!(requests[1].contains("<domain:name>free.at</domain:name>"));
    assert!(requests[3].contains("<logout/>"));

    // Every command carried its own transaction ID.
    let ids: Vec<&str> = requests
        .iter()
        .filter_map(|r| r.split("<clTRID>").nth(1))
        .filter_map(|r| r.split("</clTRID>").next())
        .collect();
    assert_eq!(ids.len(), 4);
    for (i, id) in ids.iter().enumerate() {
        assert!(!ids[..i].contains(id), "duplicate transaction id {id}");
    }
}

#[test]
fn refused_login_keeps_connection() {
    let registry = Registry::start();
    let mut session = Session::new(config(&registry, "wrong-pw")).unwrap();
    session.connect().unwrap();

    let err = session.login().unwrap_err();
    assert!(matches!(
        err,
        SessionError::Authentication {
            code: ResultCode::AUTHENTICATION_ERROR,
            ..
        }
    ));
    assert_eq!(session.state(), SessionState::Connected);

    let err = domain::check(&mut session, &["free.at"]).unwrap_err();
    assert!(matches!(err, CommandError::Session(SessionError::NotAuthenticated)));

    session.close();
    assert_eq!(session.state(), SessionState::Disconnected);
    assert_eq!(registry.requests().len(), 1);
}
