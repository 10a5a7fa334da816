/// Specifies how name verification should or should not be performed on the server's name
///
/// Server names get passed in when connecting, so no name is present in this enum
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ServerNameVerification {
    /// Use the RFC 2818 rules: match against dNSName SAN entries (with wildcards) and only
    /// fall back to the common name when the certificate contains no dNSName entries
    Rfc2818,
    /// Use the standard WebPKI name verification (SAN extension only)
    WebPki,
    /// DANGER: Don't perform any name verification
    DisableNameVerification,
}

/// Specifies how name verification should or should not be performed on the client's name
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientNameVerification {
    /// Don't perform any client name verification (which is the default for mTLS)
    None,
    /// Check that the client's certificate is valid for this name using the RFC 2818 rules
    Rfc2818(String),
}
