use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, DigitallySignedStruct, RootCertStore, SignatureScheme};
use std::path::Path;
use std::sync::Arc;

use crate::name::ServerNameVerification;
use crate::Error;

/// Certificate chain and private key the client presents when the server requests client authentication
#[derive(Copy, Clone, Debug)]
pub struct ClientAuth<'a> {
    /// PEM file containing the client's certificate chain, end-entity first
    pub cert_chain_path: &'a Path,
    /// PEM file containing the client's private key
    pub private_key_path: &'a Path,
    /// Password for a PKCS #8 encrypted private key
    pub private_key_password: Option<&'a str>,
}

/// Create a client configuration that trusts the CA certificates in `ca_cert_path` and checks
/// the server's name according to `name_verification`
pub fn authority(
    name_verification: ServerNameVerification,
    ca_cert_path: &Path,
    client_auth: Option<ClientAuth>,
) -> Result<rustls::ClientConfig, Error> {
    let ca_certs = crate::pem::read_certificates(ca_cert_path)?;

    let mut roots = RootCertStore::empty();
    for cert in ca_certs {
        roots.add(cert)?;
    }

    let provider = Arc::new(crate::default_crypto_provider());
    let verifier = build_verifier(name_verification, Arc::new(roots), provider.clone())?;

    let builder = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(verifier);

    let config = match client_auth {
        None => builder.with_no_client_auth(),
        Some(auth) => {
            let cert_chain = crate::pem::read_certificates(auth.cert_chain_path)?;
            let private_key =
                crate::pem::read_private_key(auth.private_key_path, auth.private_key_password)?;
            builder.with_client_auth_cert(cert_chain, private_key)?
        }
    };

    Ok(config)
}

/// Create a server certificate verifier that validates the chain against `roots` and checks
/// the server's name according to `name_verification`
///
/// Useful when building a [`rustls::ClientConfig`] by hand.
pub fn server_cert_verifier(
    name_verification: ServerNameVerification,
    roots: Arc<RootCertStore>,
) -> Result<Arc<dyn ServerCertVerifier>, Error> {
    build_verifier(
        name_verification,
        roots,
        Arc::new(crate::default_crypto_provider()),
    )
}

fn build_verifier(
    name_verification: ServerNameVerification,
    roots: Arc<RootCertStore>,
    provider: Arc<CryptoProvider>,
) -> Result<Arc<dyn ServerCertVerifier>, Error> {
    let webpki = WebPkiServerVerifier::builder_with_provider(roots, provider).build()?;

    let verifier: Arc<dyn ServerCertVerifier> = match name_verification {
        // we just use the standard verifier!
        ServerNameVerification::WebPki => webpki,
        ServerNameVerification::Rfc2818 => Arc::new(NameVerifier {
            inner: webpki,
            check: NameCheck::Rfc2818,
        }),
        ServerNameVerification::DisableNameVerification => Arc::new(NameVerifier {
            inner: webpki,
            check: NameCheck::Disabled,
        }),
    };

    Ok(verifier)
}

#[derive(Copy, Clone, Debug)]
enum NameCheck {
    Rfc2818,
    Disabled,
}

/// Wraps the WebPKI verifier and replaces its name check
#[derive(Debug)]
struct NameVerifier {
    inner: Arc<dyn ServerCertVerifier>,
    check: NameCheck,
}

fn is_name_error(err: &rustls::Error) -> bool {
    matches!(
        err,
        rustls::Error::InvalidCertificate(
            CertificateError::NotValidForName | CertificateError::NotValidForNameContext { .. }
        )
    )
}

impl ServerCertVerifier for NameVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        // Name verification is the LAST step inside WebPkiServerVerifier so we can safely trap it
        match self
            .inner
            .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
        {
            Ok(_) => {}
            Err(err) if is_name_error(&err) => {}
            Err(err) => return Err(err),
        }

        match self.check {
            NameCheck::Disabled => Ok(ServerCertVerified::assertion()),
            NameCheck::Rfc2818 => {
                let hostname = match server_name {
                    ServerName::DnsName(name) => name.as_ref(),
                    _ => {
                        log::debug!("RFC 2818 name verification only supports DNS names");
                        return Err(rustls::Error::InvalidCertificate(
                            CertificateError::NotValidForName,
                        ));
                    }
                };

                if crate::verify_from_encoded(end_entity, hostname) {
                    Ok(ServerCertVerified::assertion())
                } else {
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
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}
