use crate::services::storage::StorageObject;
use url::Url;

/// Classified form of a paper's `file_url`. Parsed once, consumed everywhere
/// a paper is rendered, so the download/validity rules live in one place.
#[derive(Debug, Clone, PartialEq)]
pub enum FileReference {
    /// Backed by the service's object store; existence must be confirmed
    /// against a bucket listing before the row is shown.
    Stored { object_name: String },
    /// Hosted on an allowed external document host; accepted without a
    /// network check as long as the URL itself is well-formed.
    External(Url),
    /// Malformed, relative, or on a host that is not allowed.
    Invalid,
}

impl FileReference {
    pub fn parse(file_url: &str, storage_public_prefix: &str, allowed_hosts: &[String]) -> Self {
        if let Some(rest) = file_url.strip_prefix(storage_public_prefix) {
            let raw_name = rest.split(['?', '#']).next().unwrap_or("");
            let object_name = urlencoding::decode(raw_name)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| raw_name.to_string());
            if object_name.is_empty() {
                return FileReference::Invalid;
            }
            return FileReference::Stored { object_name };
        }

        match Url::parse(file_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => match url.host_str() {
                Some(host)
                    if allowed_hosts
                        .iter()
                        .any(|allowed| allowed.eq_ignore_ascii_case(host)) =>
                {
                    FileReference::External(url)
                }
                _ => FileReference::Invalid,
            },
            _ => FileReference::Invalid,
        }
    }
}

/// Single source of truth for "is this paper still retrievable". Stored
/// references need an exact-name hit in the store listing; external
/// references were already validated at parse time.
pub fn reference_is_live(reference: &FileReference, listing: &[StorageObject]) -> bool {
    match reference {
        FileReference::Stored { object_name } => {
            listing.iter().any(|object| object.name == *object_name)
        }
        FileReference::External(_) => true,
        FileReference::Invalid => false,
    }
}
