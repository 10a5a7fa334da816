/// Compare a single name presented in a certificate (SAN DNS entry or CN) against a hostname.
///
/// A name of the form `*.domain.tld` is a left-most label wildcard: everything from the
/// hostname's first `.` onwards must equal the name with its leading `*` removed. This is the
/// basic RFC 2818 behavior. It does not check that the replaced label is non-empty, does not
/// reject wildcards that span public suffixes, and performs no case folding.
///
/// Returns `false` if either string is empty.
pub fn wildcard_compare(cert_name: &str, hostname: &str) -> bool {
    if cert_name.is_empty() || hostname.is_empty() {
        return false;
    }

    if cert_name.len() > 2 && cert_name.starts_with("*.") {
        // keep the leading '.' so that "*.example.com" can't match "wwwexample.com"
        let cert_suffix = &cert_name[1..];

        return match hostname.find('.') {
            Some(pos) => cert_suffix == &hostname[pos..],
            // a wildcard never matches a single label host
            None => false,
        };
    }

    cert_name == hostname
}
