mod descriptor;
mod digest;
mod upload;

pub use descriptor::{CreateOptions, Descriptor};
pub use digest::{Digest, DigestAlgorithm, DigestParseError};
pub use upload::UploadId;
