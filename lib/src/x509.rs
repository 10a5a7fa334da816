use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::GeneralName;

use crate::identity::{IdentitySource, SanEntry};

impl IdentitySource for X509Certificate<'_> {
    fn san_entry(&self, index: usize) -> SanEntry<'_> {
        let san = match self.subject_alternative_name() {
            Ok(Some(ext)) => ext.value,
            Ok(None) => return SanEntry::EndOfList,
            Err(err) => {
                // duplicate or undecodable extension, nothing can be extracted from it
                log::debug!("unable to extract subjectAltName extension: {err}");
                return SanEntry::EndOfList;
            }
        };

        match san.general_names.get(index) {
            None => SanEntry::EndOfList,
            Some(GeneralName::DNSName(name)) => SanEntry::DnsName(*name),
            Some(GeneralName::Invalid(tag, _)) => {
                log::trace!("skipping undecodable subjectAltName entry {index} with tag {tag:?}");
                SanEntry::Other
            }
            Some(_) => SanEntry::Other,
        }
    }

    fn common_name(&self) -> Option<&str> {
        let attr = self.subject().iter_common_name().next()?;
        match attr.as_str() {
            Ok(name) => Some(name),
            Err(err) => {
                log::debug!("subject common name is not a string: {err}");
                None
            }
        }
    }
}
