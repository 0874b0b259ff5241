// src/hash.rs

//! Package checksums
//!
//! updateinfo `<sum>` elements carry a checksum type name and a hex digest.
//! This module computes those digests for the algorithms repositories use:
//!
//! | Name(s)          | Algorithm |
//! |------------------|-----------|
//! | `md5`            | MD5       |
//! | `sha`, `sha1`    | SHA-1     |
//! | `sha256`         | SHA-256   |
//! | `sha512`         | SHA-512   |

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;

use crate::error::Error;

/// Checksum algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChecksumType {
    Md5,
    Sha1,
    /// Default for newly inspected packages
    #[default]
    Sha256,
    Sha512,
}

impl ChecksumType {
    /// Canonical name as written in `<sum type="...">`
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for ChecksumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ChecksumType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "md5" => Ok(Self::Md5),
            "sha" | "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            _ => Err(Error::UnsupportedChecksum(s.to_string())),
        }
    }
}

/// Incremental hasher over any supported algorithm
///
/// Also a [`Write`] sink, so `io::copy` can feed it and count the bytes.
pub struct Hasher {
    state: HasherState,
}

enum HasherState {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha512(Sha512),
}

impl Hasher {
    /// Create a new hasher with the specified algorithm
    pub fn new(algorithm: ChecksumType) -> Self {
        let state = match algorithm {
            ChecksumType::Md5 => HasherState::Md5(Md5::new()),
            ChecksumType::Sha1 => HasherState::Sha1(Sha1::new()),
            ChecksumType::Sha256 => HasherState::Sha256(Sha256::new()),
            ChecksumType::Sha512 => HasherState::Sha512(Sha512::new()),
        };
        Self { state }
    }

    /// Update the hasher with more data
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            HasherState::Md5(h) => h.update(data),
            HasherState::Sha1(h) => h.update(data),
            HasherState::Sha256(h) => h.update(data),
            HasherState::Sha512(h) => h.update(data),
        }
    }

    /// Finalize and return the lowercase hex digest
    pub fn finalize(self) -> String {
        match self.state {
            HasherState::Md5(h) => hex::encode(h.finalize()),
            HasherState::Sha1(h) => hex::encode(h.finalize()),
            HasherState::Sha256(h) => hex::encode(h.finalize()),
            HasherState::Sha512(h) => hex::encode(h.finalize()),
        }
    }
}

impl Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Compute the hex digest of a byte slice
pub fn hash_bytes(algorithm: ChecksumType, data: &[u8]) -> String {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    hasher.finalize()
}

/// Compute the hex digest of data from a reader
pub fn hash_reader<R: Read>(algorithm: ChecksumType, reader: &mut R) -> io::Result<String> {
    let mut hasher = Hasher::new(algorithm);
    io::copy(reader, &mut hasher)?;
    Ok(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digests() {
        let data = b"hello world";
        assert_eq!(
            hash_bytes(ChecksumType::Md5, data),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
        assert_eq!(
            hash_bytes(ChecksumType::Sha1, data),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
        assert_eq!(
            hash_bytes(ChecksumType::Sha256, data),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_digest_lengths() {
        for (algo, hex_len) in [
            (ChecksumType::Md5, 32),
            (ChecksumType::Sha1, 40),
            (ChecksumType::Sha256, 64),
            (ChecksumType::Sha512, 128),
        ] {
            assert_eq!(hash_bytes(algo, b"x").len(), hex_len);
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("sha".parse::<ChecksumType>().unwrap(), ChecksumType::Sha1);
        assert_eq!("sha1".parse::<ChecksumType>().unwrap(), ChecksumType::Sha1);
        assert_eq!("sha512".parse::<ChecksumType>().unwrap(), ChecksumType::Sha512);
        assert!(matches!(
            "crc32".parse::<ChecksumType>(),
            Err(Error::UnsupportedChecksum(name)) if name == "crc32"
        ));
    }

    #[test]
    fn test_reader_matches_bytes() {
        let data = vec![7u8; 20_000];
        let mut cursor = std::io::Cursor::new(&data);
        let streamed = hash_reader(ChecksumType::Sha512, &mut cursor).unwrap();
        assert_eq!(streamed, hash_bytes(ChecksumType::Sha512, &data));

        let mut hasher = Hasher::new(ChecksumType::Sha1);
        let copied = io::copy(&mut data.as_slice(), &mut hasher).unwrap();
        assert_eq!(copied, 20_000);
        assert_eq!(hasher.finalize(), hash_bytes(ChecksumType::Sha1, &data));
    }
}
