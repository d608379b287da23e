//! A scripted TLS registry for end-to-end tests.

#![allow(dead_code)]

use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use epp::frame::FramedStream;
use epp::transport::CertificateDer;
use rcgen::{BasicConstraints, CertificateParams, IsCa, KeyPair};
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{ServerConfig, ServerConnection, StreamOwned};

pub const GREETING: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    r#"<epp xmlns="urn:ietf:params:xml:ns:epp-1.0"><greeting>"#,
    "<svID>Scripted Registry</svID><svDate>2024-05-01T10:00:00.0Z</svDate>",
    "<svcMenu><version>1.0</version><lang>en</lang>",
    "<objURI>urn:ietf:params:xml:ns:domain-1.0</objURI>",
    "<objURI>urn:ietf:params:xml:ns:contact-1.0</objURI>",
    "</svcMenu></greeting></epp>"
);

pub struct TestPki {
    pub ca_pem: String,
    pub ca_der: CertificateDer<'static>,
    leaf_der: CertificateDer<'static>,
    leaf_key: Vec<u8>,
}

pub fn test_pki() -> TestPki {
    let ca_key = KeyPair::generate().unwrap();
    let mut ca_params = CertificateParams::new(Vec::<String>::new()).unwrap();
    ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let ca = ca_params.self_signed(&ca_key).unwrap();

    let leaf_key = KeyPair::generate().unwrap();
    let leaf = CertificateParams::new(vec!["localhost".to_string()])
        .unwrap()
        .signed_by(&leaf_key, &ca, &ca_key)
        .unwrap();

    TestPki {
        ca_pem: ca.pem(),
        ca_der: ca.der().clone(),
        leaf_der: leaf.der().clone(),
        leaf_key: leaf_key.serialize_der(),
    }
}

fn server_config(pki: &TestPki) -> Arc<ServerConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(pki.leaf_key.clone()));
    let config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![pki.leaf_der.clone()], key)
        .unwrap();
    Arc::new(config)
}

pub fn response(code: u16, msg: &str, res_data: &str) -> String {
    let res_data = if res_data.is_empty() {
        String::new()
    } else {
        format!("<resData>{res_data}</resData>")
    };
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<epp xmlns="urn:ietf:params:xml:ns:epp-1.0"><response>"#,
            r#"<result code="{}"><msg>{}</msg></result>{}"#,
            "<trID><svTRID>SRV-1</svTRID></trID></response></epp>"
        ),
        code, msg, res_data
    )
}

/// Answer a request the way a small registry would.
fn answer(request: &str) -> String {
    if request.contains("<login>") {
        if request.contains("<pw>wrong-pw</pw>") {
            return response(2200, "Authentication error", "");
        }
        return response(1000, "Command completed successfully", "");
    }
    if request.contains("<logout/>") {
        return response(1500, "Command completed successfully; ending session", "");
    }
    if request.contains("<check>") {
        return response(
            1000,
            "Command completed successfully",
            concat!(
                r#"<domain:chkData xmlns:domain="urn:ietf:params:xml:ns:domain-1.0">"#,
                r#"<domain:cd><domain:name avail="1">free.at</domain:name></domain:cd>"#,
                r#"<domain:cd><domain:name avail="0">taken.at</domain:name>"#,
                "<domain:reason>In use</domain:reason></domain:cd></domain:chkData>"
            ),
        );
    }
    if request.contains("<info>") {
        return response(2303, "Object does not exist", "");
    }
    if request.contains("<poll") {
        return response(1300, "Command completed successfully; no messages", "");
    }
    response(2101, "Unimplemented command", "")
}

pub struct Registry {
    pub port: u16,
    pub pki: TestPki,
    handle: JoinHandle<Vec<String>>,
}

impl Registry {
    /// Serve one TLS connection on localhost.
    pub fn start() -> Self {
        let pki = test_pki();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = server_config(&pki);

        let handle = thread::spawn(move || {
            let (tcp, _) = listener.accept().unwrap();
            let conn = ServerConnection::new(config).unwrap();
            let mut stream = FramedStream::new(StreamOwned::new(conn, tcp));
            stream.send(GREETING.as_bytes()).unwrap();

            let mut seen = Vec::new();
            while let Ok(frame) = stream.read_frame() {
                let request = String::from_utf8(frame.to_vec()).unwrap();
                let reply = answer(&request);
                let last = request.contains("<logout/>");
                seen.push(request);
                if stream.send(reply.as_bytes()).is_err() || last {
                    break;
                }
            }
            seen
        });

        Self { port, pki, handle }
    }

    /// Requests the registry saw, once the client has gone.
    pub fn requests(self) -> Vec<String> {
        self.handle.join().unwrap()
    }
}

pub fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "epp-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}
