//! Link resolution: maps a stored key to the externally consumable URL forms.

use crate::models::link::LinkSet;

/// URI scheme that opens a share link directly in a VLC-compatible player.
pub const PLAYER_SCHEME: &str = "vlc://";

/// Outcome of resolving a key. Either a permanent redirect to a single URL,
/// or the full set of links as a JSON-serializable body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkResolution {
    Redirect(String),
    Links(LinkSet),
}

/// Pure link construction over static configuration (base link + key prefix).
///
/// Resolution is total and purely syntactic: no check that the key refers to
/// an existing object, so an unknown key yields a valid but dead link.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    base_link: String,
    prefix: String,
}

impl LinkResolver {
    pub fn new(base_link: String, prefix: String) -> Self {
        Self { base_link, prefix }
    }

    /// Full object key as stored in the backend: `prefix + key`.
    pub fn object_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Fully qualified share link: `base_link + prefix + key`.
    pub fn share_link(&self, key: &str) -> String {
        format!("{}{}{}", self.base_link, self.prefix, key)
    }

    /// Resolve a key under the fixed precedence `ios` > `stream` > JSON.
    pub fn resolve(&self, key: &str, ios: bool, stream: bool) -> LinkResolution {
        let sharing_link = self.share_link(key);
        if ios {
            return LinkResolution::Redirect(format!("{}{}", PLAYER_SCHEME, sharing_link));
        }
        if stream {
            return LinkResolution::Redirect(sharing_link);
        }
        LinkResolution::Links(LinkSet {
            key: key.to_string(),
            stream: sharing_link.clone(),
            ios_vlc: format!("{}{}", PLAYER_SCHEME, sharing_link),
        })
    }
}
