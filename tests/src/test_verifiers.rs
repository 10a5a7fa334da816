use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose,
    IsCa, Issuer, KeyPair, KeyUsagePurpose, SanType,
};
use sfio_rfc2818::client::ClientAuth;
use sfio_rfc2818::{ClientNameVerification, ServerNameVerification};
use std::convert::TryInto;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, ServerConfig};
use tokio_rustls::{TlsAcceptor, TlsConnector};

/// Throw-away CA plus leaf certificates written as PEM files into a per-test directory
struct Pki {
    dir: PathBuf,
    issuer: Issuer<'static, KeyPair>,
}

impl Pki {
    fn new(test_name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "sfio-rfc2818-{}-{}",
            std::process::id(),
            test_name
        ));
        std::fs::create_dir_all(&dir).unwrap();

        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::default();
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![
            KeyUsagePurpose::KeyCertSign,
            KeyUsagePurpose::CrlSign,
            KeyUsagePurpose::DigitalSignature,
        ];
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, "Test CA");
        params.distinguished_name = dn;

        let cert = params.self_signed(&key).unwrap();
        std::fs::write(dir.join("ca.crt"), cert.pem()).unwrap();

        Self {
            dir,
            issuer: Issuer::new(params, key),
        }
    }

    fn issue(
        &self,
        stem: &str,
        dns_names: &[&str],
        common_name: &str,
        usage: ExtendedKeyUsagePurpose,
    ) {
        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::default();
        params.subject_alt_names = dns_names
            .iter()
            .map(|x| SanType::DnsName((*x).try_into().unwrap()))
            .collect();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, common_name);
        params.distinguished_name = dn;
        params.extended_key_usages = vec![usage];
        params.use_authority_key_identifier_extension = true;

        let cert = params.signed_by(&key, &self.issuer).unwrap();
        std::fs::write(self.path(&format!("{stem}.crt")), cert.pem()).unwrap();
        std::fs::write(self.path(&format!("{stem}.key")), key.serialize_pem()).unwrap();
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn server_config(&self, verification: ClientNameVerification) -> ServerConfig {
        sfio_rfc2818::server::authority(
            verification,
            &self.path("ca.crt"),
            &self.path("server.crt"),
            &self.path("server.key"),
            None,
        )
        .unwrap()
    }

    fn client_config(&self, verification: ServerNameVerification) -> ClientConfig {
        let cert_chain_path = self.path("client.crt");
        let private_key_path = self.path("client.key");

        sfio_rfc2818::client::authority(
            verification,
            &self.path("ca.crt"),
            Some(ClientAuth {
                cert_chain_path: &cert_chain_path,
                private_key_path: &private_key_path,
                private_key_password: None,
            }),
        )
        .unwrap()
    }
}

impl Drop for Pki {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

async fn connect() -> (tokio::net::TcpStream, tokio::net::TcpStream) {
    fn local_host(port: u16) -> SocketAddr {
        SocketAddrV4::new(Ipv4Addr::LOCALHOST, port).into()
    }

    let listener = tokio::net::TcpListener::bind(local_host(0)).await.unwrap();
    let assigned_port = listener.local_addr().unwrap().port();
    let client = tokio::net::TcpStream::connect(local_host(assigned_port))
        .await
        .unwrap();
    let (server, _) = listener.accept().await.unwrap();

    (client, server)
}

/// Run a handshake, returning whether the client and the server each succeeded
async fn handshake(
    client_config: ClientConfig,
    server_config: ServerConfig,
    name: &'static str,
) -> (bool, bool) {
    let (client, server) = connect().await;

    let connector = TlsConnector::from(Arc::new(client_config));
    let acceptor = TlsAcceptor::from(Arc::new(server_config));

    let server_task = tokio::spawn(acceptor.accept(server));

    let name: ServerName = name.try_into().unwrap();

    // keep the client stream open until the server is done
    let client_result = connector.connect(name, client).await;
    let server_result = server_task.await.unwrap();

    (client_result.is_ok(), server_result.is_ok())
}

fn pki(test_name: &str, server_names: &[&str], server_cn: &str) -> Pki {
    let pki = Pki::new(test_name);
    pki.issue(
        "server",
        server_names,
        server_cn,
        ExtendedKeyUsagePurpose::ServerAuth,
    );
    pki.issue(
        "client",
        &["client.example.com"],
        "client",
        ExtendedKeyUsagePurpose::ClientAuth,
    );
    pki
}

#[tokio::test]
async fn rfc2818_accepts_name_in_san_extension() {
    let pki = pki("san", &["server42.example.com"], "other");

    let (client_ok, server_ok) = handshake(
        pki.client_config(ServerNameVerification::Rfc2818),
        pki.server_config(ClientNameVerification::None),
        "server42.example.com",
    )
    .await;

    assert!(client_ok);
    assert!(server_ok);
}

#[tokio::test]
async fn rfc2818_accepts_wildcard_in_san_extension() {
    let pki = pki("wildcard", &["*.example.com"], "other");

    let (client_ok, _) = handshake(
        pki.client_config(ServerNameVerification::Rfc2818),
        pki.server_config(ClientNameVerification::None),
        "www.example.com",
    )
    .await;

    assert!(client_ok);
}

#[tokio::test]
async fn rfc2818_wildcard_does_not_cover_two_labels() {
    let pki = pki("wildcard-depth", &["*.example.com"], "other");

    let (client_ok, _) = handshake(
        pki.client_config(ServerNameVerification::Rfc2818),
        pki.server_config(ClientNameVerification::None),
        "a.b.example.com",
    )
    .await;

    assert!(!client_ok);
}

#[tokio::test]
async fn rfc2818_falls_back_to_common_name_without_san() {
    let pki = pki("cn", &[], "myserver");

    let (client_ok, server_ok) = handshake(
        pki.client_config(ServerNameVerification::Rfc2818),
        pki.server_config(ClientNameVerification::None),
        "myserver",
    )
    .await;

    assert!(client_ok);
    assert!(server_ok);
}

#[tokio::test]
async fn webpki_never_uses_common_name() {
    let pki = pki("webpki-cn", &[], "myserver");

    let (client_ok, _) = handshake(
        pki.client_config(ServerNameVerification::WebPki),
        pki.server_config(ClientNameVerification::None),
        "myserver",
    )
    .await;

    assert!(!client_ok);
}

#[tokio::test]
async fn rfc2818_ignores_common_name_when_san_present() {
    let pki = pki("san-disables-cn", &["mail.example.com"], "myserver");

    let (client_ok, _) = handshake(
        pki.client_config(ServerNameVerification::Rfc2818),
        pki.server_config(ClientNameVerification::None),
        "myserver",
    )
    .await;

    assert!(!client_ok);
}

#[tokio::test]
async fn disabled_name_verification_accepts_any_name() {
    let pki = pki("disabled", &["server42.example.com"], "other");

    let (client_ok, server_ok) = handshake(
        pki.client_config(ServerNameVerification::DisableNameVerification),
        pki.server_config(ClientNameVerification::None),
        "whatever",
    )
    .await;

    assert!(client_ok);
    assert!(server_ok);
}

#[tokio::test]
async fn server_can_verify_client_name() {
    let pki = pki("client-name", &["server42.example.com"], "other");

    let (client_ok, server_ok) = handshake(
        pki.client_config(ServerNameVerification::Rfc2818),
        pki.server_config(ClientNameVerification::Rfc2818(
            "client.example.com".to_string(),
        )),
        "server42.example.com",
    )
    .await;

    assert!(client_ok);
    assert!(server_ok);
}

#[tokio::test]
async fn server_rejects_wrong_client_name() {
    let pki = pki("wrong-client-name", &["server42.example.com"], "other");

    let (_, server_ok) = handshake(
        pki.client_config(ServerNameVerification::Rfc2818),
        pki.server_config(ClientNameVerification::Rfc2818(
            "someone-else.example.com".to_string(),
        )),
        "server42.example.com",
    )
    .await;

    assert!(!server_ok);
}

#[test]
fn missing_ca_file_is_reported() {
    let err = sfio_rfc2818::client::authority(
        ServerNameVerification::Rfc2818,
        &std::env::temp_dir().join("sfio-rfc2818-does-not-exist.crt"),
        None,
    )
    .unwrap_err();

    assert!(err.to_string().contains("sfio-rfc2818-does-not-exist.crt"));
}
