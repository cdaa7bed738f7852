use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DigestAlgorithm {
    Sha256,
}

impl DigestAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
        }
    }
}

/// Content address of a blob: algorithm plus raw hash bytes.
///
/// The canonical string form is `sha256:<lowercase hex>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest {
    pub alg: DigestAlgorithm,
    pub bytes: [u8; 32],
}

impl Digest {
    /// Compute the digest of `data`.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Digest {
            alg: DigestAlgorithm::Sha256,
            bytes: hasher.finalize().into(),
        }
    }
}

impl Display for Digest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.alg.as_str(), hex::encode(self.bytes))
    }
}

#[derive(Debug, Error)]
pub enum DigestParseError {
    #[error("missing algorithm prefix")]
    MissingAlgorithm,

    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("digest must be 32 bytes, got {0}")]
    InvalidLength(usize),
}

impl FromStr for Digest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (alg, hex_part) = s.split_once(':').ok_or(DigestParseError::MissingAlgorithm)?;
        if alg != "sha256" {
            return Err(DigestParseError::UnsupportedAlgorithm(alg.to_string()));
        }
        let raw = hex::decode(hex_part)?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|raw: Vec<u8>| DigestParseError::InvalidLength(raw.len()))?;
        Ok(Digest {
            alg: DigestAlgorithm::Sha256,
            bytes,
        })
    }
}
