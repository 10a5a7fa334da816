use x509_parser::certificate::X509Certificate;

use crate::compare::wildcard_compare;
use crate::identity::{IdentitySource, SanEntry};

/// Check that a certificate's identity is valid for `hostname` using the RFC 2818 policy.
///
/// Every dNSName subjectAltName entry is compared against the hostname (wildcards allowed)
/// and the first match wins. The subject common name is only consulted if the certificate
/// contains no dNSName entries at all: a certificate that lists DNS names, none of which
/// match, is rejected even if its common name would match.
///
/// Never fails. Missing or undecodable identity information results in `false`.
pub fn verify<S>(source: &S, hostname: &str) -> bool
where
    S: IdentitySource + ?Sized,
{
    let mut found_dns_name = false;

    for index in 0.. {
        match source.san_entry(index) {
            SanEntry::EndOfList => break,
            SanEntry::DnsName(name) => {
                found_dns_name = true;
                if wildcard_compare(name, hostname) {
                    log::debug!("{hostname} matches subjectAltName entry {name}");
                    return true;
                }
                log::trace!("{hostname} does not match subjectAltName entry {name}");
            }
            SanEntry::Other => {
                log::trace!("skipping subjectAltName entry {index}");
            }
        }
    }

    if found_dns_name {
        log::debug!("{hostname} does not match any subjectAltName dNSName entry");
        return false;
    }

    let common_name = match source.common_name() {
        Some(x) => x,
        None => {
            log::debug!("certificate has no dNSName entries and no common name");
            return false;
        }
    };

    let matched = wildcard_compare(common_name, hostname);
    log::debug!("no dNSName entries, {hostname} vs common name {common_name}: {matched}");
    matched
}

/// Check that a DER encoded certificate is valid for `hostname`.
///
/// Returns `false` if the certificate cannot be decoded. See [`verify`] for the matching rules.
pub fn verify_from_encoded(certificate: &[u8], hostname: &str) -> bool {
    match x509_parser::parse_x509_certificate(certificate) {
        Ok((_, parsed)) => verify_from_handle(&parsed, hostname),
        Err(err) => {
            log::warn!("unable to decode certificate for hostname verification: {err}");
            false
        }
    }
}

/// Check that an already decoded certificate is valid for `hostname`.
///
/// See [`verify`] for the matching rules.
pub fn verify_from_handle(certificate: &X509Certificate<'_>, hostname: &str) -> bool {
    verify(certificate, hostname)
}
