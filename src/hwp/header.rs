//! The `FileHeader` stream.
//!
//! A fixed 256-byte preamble holding the signature, the format version and
//! the property bits that decide how every other stream is stored.

use std::fmt;

use bitflags::bitflags;
use zerocopy::{FromBytes, LE, U32};
use zerocopy_derive::FromBytes as DeriveFromBytes;

use super::consts::{FILE_HEADER_SIZE, SIGNATURE};
use crate::common::binary::trim_nul_padded;
use crate::common::{Error, Result};

/// On-disk layout of the FileHeader stream.
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawFileHeader {
    signature: [u8; 32],
    version: U32<LE>,
    properties: U32<LE>,
    second_flags: U32<LE>,
    encrypt_version: U32<LE>,
    kogl_license: u8,
    reserved: [u8; 207],
}

bitflags! {
    /// Document property bits of the FileHeader.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileProperties: u32 {
        /// Streams are raw-DEFLATE compressed
        const COMPRESSED = 0x0001;
        /// Document is encrypted with a user password
        const PASSWORD_ENCRYPTED = 0x0002;
        /// Distribution document: body lives in ViewText, encrypted with an embedded key
        const DISTRIBUTION = 0x0004;
        /// Script is stored
        const SCRIPT = 0x0008;
        /// DRM security document
        const DRM = 0x0010;
        /// XMLTemplate storage present
        const XML_TEMPLATE = 0x0020;
        /// Document history is kept
        const HISTORY = 0x0040;
        /// Electronic signature present
        const SIGNATURE = 0x0080;
        /// Encrypted with a public certificate
        const CERT_ENCRYPTED = 0x0100;
        /// Spare electronic signature
        const SIGNATURE_SPARE = 0x0200;
        /// Certificate DRM document
        const CERT_DRM = 0x0400;
        /// CCL document
        const CCL = 0x0800;
    }
}

/// Four-part version number `MM.nn.PP.rr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    pub revision: u8,
}

impl Version {
    /// Unpack the stored u32 (major in the most significant byte).
    pub fn from_u32(raw: u32) -> Self {
        let [revision, patch, minor, major] = raw.to_le_bytes();
        Self {
            major,
            minor,
            patch,
            revision,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.patch, self.revision
        )
    }
}

/// Parsed FileHeader. Read once per document and never modified.
#[derive(Debug, Clone)]
pub struct FileHeader {
    pub signature: String,
    pub version: Version,
    pub properties: FileProperties,
    pub second_flags: u32,
    pub encrypt_version: u32,
    /// KOGL (Korea Open Government License) country code
    pub kogl_license: u8,
}

impl FileHeader {
    /// Parse the FileHeader stream.
    ///
    /// Fails with [`Error::MalformedContainer`] when the stream is shorter than
    /// 256 bytes or the signature does not match.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < FILE_HEADER_SIZE {
            return Err(Error::malformed(format!(
                "FileHeader is {} bytes, expected {}",
                data.len(),
                FILE_HEADER_SIZE
            )));
        }
        let (raw, _) = RawFileHeader::read_from_prefix(data)
            .map_err(|_| Error::malformed("failed to parse FileHeader"))?;

        let signature = trim_nul_padded(&raw.signature);
        if signature != SIGNATURE {
            return Err(Error::malformed(format!(
                "unexpected signature {:?}",
                signature
            )));
        }

        Ok(Self {
            signature,
            version: Version::from_u32(raw.version.get()),
            properties: FileProperties::from_bits_retain(raw.properties.get()),
            second_flags: raw.second_flags.get(),
            encrypt_version: raw.encrypt_version.get(),
            kogl_license: raw.kogl_license,
        })
    }

    /// Whether streams are DEFLATE compressed.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.properties.contains(FileProperties::COMPRESSED)
    }

    /// Whether the document is protected by a user password.
    #[inline]
    pub fn is_password_encrypted(&self) -> bool {
        self.properties.contains(FileProperties::PASSWORD_ENCRYPTED)
    }

    /// Whether this is a distribution document (body in ViewText).
    #[inline]
    pub fn is_distribution(&self) -> bool {
        self.properties.contains(FileProperties::DISTRIBUTION)
    }

    /// Serialize a header with the given version and property bits.
    ///
    /// Used to build FileHeader streams for documents assembled in memory.
    pub fn encode(version: Version, properties: FileProperties) -> Vec<u8> {
        let mut buf = vec![0u8; FILE_HEADER_SIZE];
        buf[..SIGNATURE.len()].copy_from_slice(SIGNATURE.as_bytes());
        let raw_version = u32::from_le_bytes([
            version.revision,
            version.patch,
            version.minor,
            version.major,
        ]);
        buf[32..36].copy_from_slice(&raw_version.to_le_bytes());
        buf[36..40].copy_from_slice(&properties.bits().to_le_bytes());
        buf
    }
}
