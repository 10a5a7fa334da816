use std::path::{Path, PathBuf};

use rustls::client::VerifierBuilderError;

/// Opaque error type used by the library that implements [`std::error::Error`].
#[derive(Debug)]
pub struct Error {
    details: Details,
}

impl Error {
    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        Self {
            details: Details::Io(path.to_owned(), err),
        }
    }

    pub(crate) fn pem(path: &Path, err: crate::pem::Error) -> Self {
        Self {
            details: Details::Pem(path.to_owned(), err),
        }
    }
}

impl std::error::Error for Error {}

impl From<rustls::Error> for Error {
    fn from(err: rustls::Error) -> Self {
        Self {
            details: Details::Tls(err),
        }
    }
}

impl From<VerifierBuilderError> for Error {
    fn from(err: VerifierBuilderError) -> Self {
        Self {
            details: Details::BuilderError(err),
        }
    }
}

#[derive(Debug)]
enum Details {
    /// Error reading a file
    Io(PathBuf, std::io::Error),
    /// Bad PEM file
    Pem(PathBuf, crate::pem::Error),
    /// Error returned by Rustls
    Tls(rustls::Error),
    /// Error building a certificate verifier
    BuilderError(VerifierBuilderError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.details {
            Details::Io(path, err) => write!(f, "I/O error reading {}: {err}", path.display()),
            Details::Pem(path, err) => write!(f, "PEM error in {}: {err}", path.display()),
            Details::Tls(err) => write!(f, "Rustls error: {err}"),
            Details::BuilderError(err) => write!(f, "Error building certificate verifier: {err}"),
        }
    }
}
