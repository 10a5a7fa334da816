/// Outcome of requesting a single subjectAltName entry by index
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SanEntry<'a> {
    /// Entry is a dNSName
    DnsName(&'a str),
    /// Entry exists but is not a dNSName, or could not be decoded. Traversal continues.
    Other,
    /// No entry exists at this index or any later index
    EndOfList,
}

/// Source of the identity claims needed to verify a hostname against a certificate
///
/// Implementations only extract names. All of the matching and fallback policy lives in
/// [`verify`](crate::verify).
pub trait IdentitySource {
    /// Retrieve the subjectAltName entry at `index` in certificate-encoded order.
    ///
    /// Must eventually return [`SanEntry::EndOfList`] as the index increases.
    fn san_entry(&self, index: usize) -> SanEntry<'_>;

    /// Retrieve the common name (CN) of the subject distinguished name, if one is available
    fn common_name(&self) -> Option<&str>;
}

/// A subjectAltName entry extracted by some other certificate parser
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubjectAltName {
    /// dNSName entry
    Dns(String),
    /// Any other name type (e-mail, IP address, URI, ...)
    Other,
    /// Entry that could not be decoded
    Malformed,
}

/// Identity claims already extracted from a certificate
///
/// Useful when certificates are decoded by something other than `x509-parser`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CertificateIdentity {
    subject_alt_names: Vec<SubjectAltName>,
    common_name: Option<String>,
}

impl CertificateIdentity {
    /// Construct an identity with no SAN entries and no common name
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct an identity from a list of SAN entries and an optional common name
    pub fn from_parts(subject_alt_names: Vec<SubjectAltName>, common_name: Option<String>) -> Self {
        Self {
            subject_alt_names,
            common_name,
        }
    }

    /// Append a dNSName SAN entry
    pub fn with_dns_name<S: Into<String>>(mut self, name: S) -> Self {
        self.subject_alt_names
            .push(SubjectAltName::Dns(name.into()));
        self
    }

    /// Append a SAN entry of some other type
    pub fn with_other_name(mut self) -> Self {
        self.subject_alt_names.push(SubjectAltName::Other);
        self
    }

    /// Append a SAN entry that failed to decode
    pub fn with_malformed_name(mut self) -> Self {
        self.subject_alt_names.push(SubjectAltName::Malformed);
        self
    }

    /// Set the subject common name
    pub fn with_common_name<S: Into<String>>(self, name: S) -> Self {
        Self {
            common_name: Some(name.into()),
            ..self
        }
    }

    /// SAN entries in the order they were added
    pub fn subject_alt_names(&self) -> &[SubjectAltName] {
        &self.subject_alt_names
    }
}

impl IdentitySource for CertificateIdentity {
    fn san_entry(&self, index: usize) -> SanEntry<'_> {
        match self.subject_alt_names.get(index) {
            None => SanEntry::EndOfList,
            Some(SubjectAltName::Dns(name)) => SanEntry::DnsName(name.as_str()),
            Some(SubjectAltName::Other) | Some(SubjectAltName::Malformed) => SanEntry::Other,
        }
    }

    fn common_name(&self) -> Option<&str> {
        self.common_name.as_deref()
    }
}
