//! Scripted registry for command tests.

use std::os::unix::net::UnixStream;
use std::thread::{self, JoinHandle};

use epp_frame::FramedStream;
use epp_session::{Session, SessionConfig};
use epp_transport::Preconnected;

pub(crate) type TestSession = Session<Preconnected<UnixStream>>;

pub(crate) const GREETING: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    r#"<epp xmlns="urn:ietf:params:xml:ns:epp-1.0"><greeting>"#,
    "<svID>Test Registry</svID><svDate>2024-05-01T10:00:00.0Z</svDate>",
    "<svcMenu><version>1.0</version><lang>en</lang><lang>de</lang>",
    "<objURI>urn:ietf:params:xml:ns:domain-1.0</objURI>",
    "<objURI>urn:ietf:params:xml:ns:contact-1.0</objURI>",
    "<svcExtension><extURI>urn:ietf:params:xml:ns:secDNS-1.1</extURI>",
    "<extURI>http://www.nic.at/xsd/at-ext-epp-1.0</extURI></svcExtension>",
    "</svcMenu><dcp><access><all/></access>",
    "<statement><purpose><admin/><prov/></purpose><recipient><ours/><public/></recipient>",
    "<retention><stated/></retention></statement></dcp>",
    "</greeting></epp>"
);

/// A response document with optional `<resData>` and `<extension>` content.
pub(crate) fn reply(code: u16, msg: &str, res_data: &str, extension: &str) -> String {
    let mut xml = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<epp xmlns="urn:ietf:params:xml:ns:epp-1.0"><response>"#,
            r#"<result code="{}"><msg>{}</msg></result>"#
        ),
        code, msg
    );
    if !res_data.is_empty() {
        xml.push_str(&format!("<resData>{res_data}</resData>"));
    }
    if !extension.is_empty() {
        xml.push_str(&format!("<extension>{extension}</extension>"));
    }
    xml.push_str("<trID><clTRID>T-x</clTRID><svTRID>SV-42</svTRID></trID></response></epp>");
    xml
}

pub(crate) fn ok() -> String {
    reply(1000, "Command completed successfully", "", "")
}

/// A logged-in session against a registry that answers each command with
/// the next reply. The handle yields every request seen after login.
pub(crate) fn logged_in(replies: Vec<String>) -> (TestSession, JoinHandle<Vec<String>>) {
    scripted(true, replies)
}

/// Connected but not logged in.
pub(crate) fn connected(replies: Vec<String>) -> (TestSession, JoinHandle<Vec<String>>) {
    scripted(false, replies)
}

fn scripted(login: bool, replies: Vec<String>) -> (TestSession, JoinHandle<Vec<String>>) {
    let (client, server) = UnixStream::pair().expect("socket pair");
    let mut server = FramedStream::new(server);

    let handle = thread::spawn(move || {
        server.send(GREETING.as_bytes()).expect("send greeting");
        if login {
            server.read_frame().expect("read login");
            server.send(ok().as_bytes()).expect("send login reply");
        }
        let mut seen = Vec::new();
        for reply in replies {
            let request = server.read_frame().expect("read request");
            seen.push(String::from_utf8(request.to_vec()).expect("utf-8 request"));
            server.send(reply.as_bytes()).expect("send reply");
        }
        seen
    });

    let mut n = 0u32;
    let config = SessionConfig::new("localhost", "REG-TEST", "secret-pw");
    let mut session = Session::with_dialer(config, Preconnected::new(client)).with_transaction_ids(
        move || {
            n += 1;
            format!("T-{n}")
        },
    );
    session.connect().expect("connect");
    if login {
        session.login().expect("login");
    }
    (session, handle)
}
