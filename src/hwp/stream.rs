//! Layered stream access.
//!
//! Section streams are unwrapped in a fixed order: distribution decryption
//! first (ViewText only), then raw DEFLATE when the document is compressed.

use std::io::{Cursor, Read};

use flate2::read::DeflateDecoder;
use log::debug;

use super::consts::{
    BODY_TEXT_STORAGE, DISTRIBUTE_DATA_SIZE, HWPTAG_DISTRIBUTE_DOC_DATA, VIEW_TEXT_STORAGE,
};
use super::crypto::{EcbDecryptReader, derive_key};
use super::header::FileHeader;
use super::record::RecordHeader;
use crate::common::{Error, Result};

/// Storage path of section `index`.
pub fn section_path(index: usize, distribution: bool) -> [String; 2] {
    let storage = if distribution {
        VIEW_TEXT_STORAGE
    } else {
        BODY_TEXT_STORAGE
    };
    [storage.to_string(), format!("Section{}", index)]
}

/// Wrap raw section bytes in the decryption and decompression layers the
/// header calls for.
pub fn open_section_stream(raw: Vec<u8>, header: &FileHeader) -> Result<Box<dyn Read>> {
    let mut source = Cursor::new(raw);

    let decrypted: Box<dyn Read> = if header.is_distribution() {
        let key = read_distribution_key(&mut source)?;
        Box::new(EcbDecryptReader::new(source, &key)?)
    } else {
        Box::new(source)
    };

    Ok(decompress(decrypted, header))
}

/// Wrap a DocInfo stream. DocInfo is never distribution encrypted.
pub fn open_doc_info_stream(raw: Vec<u8>, header: &FileHeader) -> Box<dyn Read> {
    decompress(Box::new(Cursor::new(raw)), header)
}

fn decompress(inner: Box<dyn Read>, header: &FileHeader) -> Box<dyn Read> {
    if header.is_compressed() {
        Box::new(DeflateDecoder::new(inner))
    } else {
        inner
    }
}

/// Consume the DISTRIBUTE_DOC_DATA record at the head of a ViewText section
/// and derive the section key from it.
fn read_distribution_key<R: Read>(source: &mut R) -> Result<[u8; 16]> {
    let mut word = [0u8; 4];
    source
        .read_exact(&mut word)
        .map_err(|e| Error::malformed(format!("failed to read distribution header: {}", e)))?;

    let header = RecordHeader::from_u32(u32::from_le_bytes(word));
    if header.tag != HWPTAG_DISTRIBUTE_DOC_DATA || header.size as usize != DISTRIBUTE_DATA_SIZE {
        return Err(Error::malformed(format!(
            "invalid distribution document stream (tag=0x{:X}, size={})",
            header.tag, header.size
        )));
    }

    let mut data = [0u8; DISTRIBUTE_DATA_SIZE];
    source
        .read_exact(&mut data)
        .map_err(|e| Error::malformed(format!("failed to read distribution data: {}", e)))?;

    let key = derive_key(&data)?;
    debug!("derived distribution key");
    Ok(key)
}
