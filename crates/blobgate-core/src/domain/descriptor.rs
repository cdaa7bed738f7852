use serde::{Deserialize, Serialize};

use super::Digest;

/// Describes a stored blob: what it is, how big it is, and its address.
///
/// A provisional descriptor (caller-supplied on commit) may leave
/// `media_type` empty; the backend then falls back to the create-time hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub media_type: String,
    pub size: u64,
    pub digest: Digest,
}

impl Descriptor {
    pub fn new(media_type: impl Into<String>, size: u64, digest: Digest) -> Self {
        Self {
            media_type: media_type.into(),
            size,
            digest,
        }
    }
}

/// Options for starting a new upload.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Expected media type of the content; used when the committing
    /// descriptor leaves `media_type` empty.
    pub media_type: Option<String>,
}
