use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown checksum algorithm {0}")]
pub struct UnknownAlgorithm(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumAlgorithm {
    Sha256,
    Sha512,
}

impl ChecksumAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Sha256 => "sha256",
            ChecksumAlgorithm::Sha512 => "sha512",
        }
    }

    /// Lowercase hex digest of `data`.
    pub fn digest(&self, data: &[u8]) -> String {
        match self {
            ChecksumAlgorithm::Sha256 => format!("{:x}", Sha256::digest(data)),
            ChecksumAlgorithm::Sha512 => format!("{:x}", Sha512::digest(data)),
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" => Ok(ChecksumAlgorithm::Sha256),
            "sha512" => Ok(ChecksumAlgorithm::Sha512),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}
