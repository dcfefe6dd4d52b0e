//! Serialized link set returned by the link-resolution endpoint.

use serde::Serialize;

/// All consumable URL forms for one stored key, returned together when the
/// caller asked for neither redirect.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct LinkSet {
    /// Bare key as supplied by the caller.
    pub key: String,

    /// Direct stream URL (`base_link + prefix + key`).
    pub stream: String,

    /// Player-scheme deep link for iOS VLC.
    #[serde(rename = "iosVlc")]
    pub ios_vlc: String,
}
