use std::path::Path;

use rustls_pki_types::{
    CertificateDer, PrivateKeyDer, PrivatePkcs1KeyDer, PrivatePkcs8KeyDer, PrivateSec1KeyDer,
};

/// Error type used by the PEM layer that implements [`std::error::Error`]
#[derive(Debug)]
pub(crate) struct Error {
    details: ErrorDetails,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.details {
            ErrorDetails::InvalidPem(err) => write!(f, "invalid PEM: {err}"),
            ErrorDetails::DecryptionError(err) => write!(f, "PKCS#8 error: {err}"),
            ErrorDetails::NoPrivateKey => {
                f.write_str("PEM file does not contain a supported private key")
            }
            ErrorDetails::MoreThanOnePrivateKey => {
                f.write_str("PEM file contains more than one supported private key")
            }
            ErrorDetails::NoCertificate => f.write_str("PEM file does not contain a certificate"),
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug)]
enum ErrorDetails {
    InvalidPem(::pem::PemError),
    DecryptionError(pkcs8::Error),
    NoPrivateKey,
    MoreThanOnePrivateKey,
    NoCertificate,
}

/// Read at least 1 certificate from a PEM file
pub(crate) fn read_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>, crate::Error> {
    let bytes = read_file(path)?;
    parse_certificates(bytes).map_err(|err| crate::Error::pem(path, err))
}

/// Read a private key from a PEM file, decrypting it if a password is supplied
pub(crate) fn read_private_key(
    path: &Path,
    password: Option<&str>,
) -> Result<PrivateKeyDer<'static>, crate::Error> {
    let bytes = read_file(path)?;
    let key = match password {
        None => parse_private_key(bytes),
        Some(password) => decrypt_private_key(bytes, password),
    };
    key.map_err(|err| crate::Error::pem(path, err))
}

fn read_file(path: &Path) -> Result<Vec<u8>, crate::Error> {
    std::fs::read(path).map_err(|err| crate::Error::io(path, err))
}

fn parse_certificates<B: AsRef<[u8]>>(bytes: B) -> Result<Vec<CertificateDer<'static>>, Error> {
    let certs: Vec<CertificateDer<'static>> = ::pem::parse_many(bytes)?
        .into_iter()
        .filter(|x| x.tag() == "CERTIFICATE")
        .map(|x| CertificateDer::from(x.into_contents()))
        .collect();

    if certs.is_empty() {
        return Err(ErrorDetails::NoCertificate.into());
    }

    Ok(certs)
}

/// PKCS #8, PKCS #1 (RSA) or SEC1 (EC) plaintext key. The file may also contain certificates.
fn parse_private_key<B: AsRef<[u8]>>(bytes: B) -> Result<PrivateKeyDer<'static>, Error> {
    const PLAINTEXT_KEY_TAGS: &[&str] = &["PRIVATE KEY", "RSA PRIVATE KEY", "EC PRIVATE KEY"];

    let sections = ::pem::parse_many(bytes)?;
    let section = find_only_section_with_tags(&sections, PLAINTEXT_KEY_TAGS)?;
    let contents = section.contents().to_vec();

    let key = match section.tag() {
        "RSA PRIVATE KEY" => PrivateKeyDer::Pkcs1(PrivatePkcs1KeyDer::from(contents)),
        "EC PRIVATE KEY" => PrivateKeyDer::Sec1(PrivateSec1KeyDer::from(contents)),
        _ => PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(contents)),
    };

    Ok(key)
}

/// PKCS #8 key in an 'ENCRYPTED PRIVATE KEY' section
fn decrypt_private_key<B: AsRef<[u8]>>(
    bytes: B,
    password: &str,
) -> Result<PrivateKeyDer<'static>, Error> {
    let sections = ::pem::parse_many(bytes)?;
    let section = find_only_section_with_tags(&sections, &["ENCRYPTED PRIVATE KEY"])?;
    let encrypted = pkcs8::EncryptedPrivateKeyInfo::try_from(section.contents())?;
    let document = encrypted.decrypt(password)?;
    Ok(PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
        document.as_bytes().to_vec(),
    )))
}

fn find_only_section_with_tags<'a>(
    sections: &'a [::pem::Pem],
    allowed_tags: &[&str],
) -> Result<&'a ::pem::Pem, Error> {
    let mut iter = sections.iter().filter(|x| allowed_tags.contains(&x.tag()));

    let first = match iter.next() {
        Some(x) => x,
        None => return Err(ErrorDetails::NoPrivateKey.into()),
    };

    if iter.next().is_some() {
        return Err(ErrorDetails::MoreThanOnePrivateKey.into());
    }

    Ok(first)
}

impl From<::pem::PemError> for Error {
    fn from(err: ::pem::PemError) -> Self {
        ErrorDetails::InvalidPem(err).into()
    }
}

impl From<pkcs8::Error> for Error {
    fn from(err: pkcs8::Error) -> Self {
        ErrorDetails::DecryptionError(err).into()
    }
}

impl From<ErrorDetails> for Error {
    fn from(details: ErrorDetails) -> Self {
        Error { details }
    }
}
