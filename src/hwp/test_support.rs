//! Builders for HWP streams assembled in memory.

use std::io::Write;

use aes::Aes128;
use aes::cipher::{BlockEncrypt, KeyInit, generic_array::GenericArray};
use flate2::Compression;
use flate2::write::DeflateEncoder;

use super::consts::*;
use super::crypto::derive_key;
use super::header::{FileHeader, FileProperties, Version};
use super::record::{CtrlId, RecordHeader};
use crate::ole::MemoryStorage;

/// Writes framed records into a section or DocInfo stream.
#[derive(Default)]
pub struct StreamBuilder {
    pub data: Vec<u8>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, tag: u16, level: u16, payload: &[u8]) -> &mut Self {
        RecordHeader {
            tag,
            level,
            size: payload.len() as u32,
        }
        .write_to(&mut self.data)
        .unwrap();
        self.data.extend_from_slice(payload);
        self
    }

    /// PARA_TEXT payload from code units.
    pub fn para_text(&mut self, level: u16, units: &[u16]) -> &mut Self {
        let payload: Vec<u8> = units.iter().flat_map(|u| u.to_le_bytes()).collect();
        self.record(HWPTAG_PARA_TEXT, level, &payload)
    }

    /// Complete paragraph: header, text, char shape and line segments.
    pub fn paragraph(&mut self, level: u16, text: &str) -> &mut Self {
        let units: Vec<u16> = text
            .encode_utf16()
            .map(|u| if u == u16::from(b'\n') { 10 } else { u })
            .collect();
        self.record(HWPTAG_PARA_HEADER, level, &[0; 22]);
        if !units.is_empty() {
            self.para_text(level + 1, &units);
        }
        self.record(HWPTAG_PARA_CHAR_SHAPE, level + 1, &[0; 8])
            .record(HWPTAG_PARA_LINE_SEG, level + 1, &[0; 36])
    }

    pub fn ctrl(&mut self, level: u16, id: CtrlId) -> &mut Self {
        let mut payload = id.0.to_le_bytes().to_vec();
        payload.extend_from_slice(&[0; 42]);
        self.record(HWPTAG_CTRL_HEADER, level, &payload)
    }

    pub fn table(&mut self, level: u16, rows: u16, cols: u16) -> &mut Self {
        let mut payload = vec![0u8; 22];
        payload[4..6].copy_from_slice(&rows.to_le_bytes());
        payload[6..8].copy_from_slice(&cols.to_le_bytes());
        self.record(HWPTAG_TABLE, level, &payload)
    }

    pub fn cell(&mut self, level: u16, row: u8, col: u8, row_span: u8, col_span: u8) -> &mut Self {
        let mut payload = vec![0u8; 46];
        payload[0..2].copy_from_slice(&1i16.to_le_bytes());
        payload[8] = col;
        payload[10] = row;
        payload[12] = col_span;
        payload[14] = row_span;
        self.record(HWPTAG_LIST_HEADER, level, &payload)
    }

    pub fn build(&self) -> Vec<u8> {
        self.data.clone()
    }
}

pub fn doc_info(section_count: u16) -> Vec<u8> {
    let mut payload = vec![0u8; 26];
    payload[0..2].copy_from_slice(&section_count.to_le_bytes());
    StreamBuilder::new()
        .record(HWPTAG_DOCUMENT_PROPERTIES, 0, &payload)
        .build()
}

pub fn header_bytes(properties: FileProperties) -> Vec<u8> {
    FileHeader::encode(Version::from_u32(0x0501_0001), properties)
}

/// Storage holding a FileHeader and DocInfo, ready for sections.
pub fn storage(properties: FileProperties, doc_info: Vec<u8>) -> MemoryStorage {
    let mut storage = MemoryStorage::new();
    storage.insert(FILE_HEADER_STREAM, header_bytes(properties));
    storage.insert(DOC_INFO_STREAM, doc_info);
    storage
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// AES-128 ECB with zero padding to the block size.
pub fn encrypt_ecb(key: &[u8; 16], data: &[u8]) -> Vec<u8> {
    let cipher = Aes128::new_from_slice(key).unwrap();
    let mut padded = data.to_vec();
    padded.resize(data.len().div_ceil(16) * 16, 0);
    for chunk in padded.chunks_mut(16) {
        cipher.encrypt_block(GenericArray::from_mut_slice(chunk));
    }
    padded
}

/// A ViewText section: distribution record followed by the encrypted body.
pub fn distribution_section(dist_data: &[u8; 256], body: &[u8]) -> Vec<u8> {
    let key = derive_key(dist_data).unwrap();
    let mut out = StreamBuilder::new()
        .record(HWPTAG_DISTRIBUTE_DOC_DATA, 0, dist_data)
        .build();
    out.extend(encrypt_ecb(&key, body));
    out
}
