use rustls::client::danger::HandshakeSignatureValid;
use rustls::pki_types::{CertificateDer, UnixTime};
use rustls::server::danger::{ClientCertVerified, ClientCertVerifier};
use rustls::server::WebPkiClientVerifier;
use rustls::{CertificateError, DigitallySignedStruct, DistinguishedName, SignatureScheme};
use std::path::Path;
use std::sync::Arc;

use crate::{ClientNameVerification, Error};

/// Create a server configuration that requires client certificates issued by the CA(s) in
/// `ca_cert_path` and checks the client's name according to `name_verification`
pub fn authority(
    name_verification: ClientNameVerification,
    ca_cert_path: &Path,
    local_cert_chain_path: &Path,
    private_key_path: &Path,
    private_key_password: Option<&str>,
) -> Result<rustls::ServerConfig, Error> {
    let peer_certs = crate::pem::read_certificates(ca_cert_path)?;
    let local_cert_chain = crate::pem::read_certificates(local_cert_chain_path)?;
    let private_key = crate::pem::read_private_key(private_key_path, private_key_password)?;

    let provider = Arc::new(crate::default_crypto_provider());

    // create the base verifier
    let verifier = {
        let mut roots = rustls::RootCertStore::empty();
        for cert in peer_certs.into_iter() {
            roots.add(cert)?;
        }
        WebPkiClientVerifier::builder_with_provider(roots.into(), provider.clone()).build()?
    };

    let verifier = ClientNameVerifier {
        base_verifier: verifier,
        verification: name_verification,
    };

    let config = rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_client_cert_verifier(Arc::new(verifier))
        .with_single_cert(local_cert_chain, private_key)?;

    Ok(config)
}

#[derive(Debug)]
struct ClientNameVerifier {
    base_verifier: Arc<dyn ClientCertVerifier>,
    verification: ClientNameVerification,
}

impl ClientCertVerifier for ClientNameVerifier {
    fn offer_client_auth(&self) -> bool {
        self.base_verifier.offer_client_auth()
    }

    fn client_auth_mandatory(&self) -> bool {
        self.base_verifier.client_auth_mandatory()
    }

    fn root_hint_subjects(&self) -> &[DistinguishedName] {
        self.base_verifier.root_hint_subjects()
    }

    fn verify_client_cert(
        &self,
        end_entity: &CertificateDer,
        intermediates: &[CertificateDer],
        now: UnixTime,
    ) -> Result<ClientCertVerified, rustls::Error> {
        let verified = self
            .base_verifier
            .verify_client_cert(end_entity, intermediates, now)?;

        match &self.verification {
            ClientNameVerification::None => Ok(verified),
            ClientNameVerification::Rfc2818(name) => {
                if crate::verify_from_encoded(end_entity, name) {
                    Ok(verified)
                } else {
                    log::debug!("client certificate is not valid for {name}");
                    Err(rustls::Error::InvalidCertificate(
                        CertificateError::NotValidForName,
                    ))
                }
            }
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.base_verifier
            .verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.base_verifier
            .verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.base_verifier.supported_verify_schemes()
    }
}
