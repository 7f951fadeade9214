//! Minimal compound file writer for building fixtures in memory.
//!
//! Version 3 layout (512-byte sectors). Streams under the 4096-byte cutoff go
//! to the mini stream, larger ones get regular sector chains. Siblings are
//! linked as a right-leaning chain, which readers accept as a valid tree.

use super::consts::*;

const SECTOR_SIZE: usize = 512;
const MINI_SECTOR_SIZE: usize = 64;
const FATSECT: u32 = 0xFFFF_FFFD;

struct Node {
    name: String,
    kind: u8,
    child: u32,
    right: u32,
    start: u32,
    size: u64,
}

#[derive(Default)]
pub struct CompoundFileBuilder {
    streams: Vec<(String, Vec<u8>)>,
}

impl CompoundFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stream at a `/`-separated path; intermediate storages are created.
    pub fn add_stream(&mut self, path: &str, data: Vec<u8>) -> &mut Self {
        self.streams.push((path.to_string(), data));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut nodes = vec![Node {
            name: "Root Entry".to_string(),
            kind: STGTY_ROOT,
            child: NOSTREAM,
            right: NOSTREAM,
            start: ENDOFCHAIN,
            size: 0,
        }];

        let mut sectors: Vec<Vec<u8>> = Vec::new();
        let mut fat: Vec<u32> = Vec::new();
        let mut ministream: Vec<u8> = Vec::new();
        let mut minifat: Vec<u32> = Vec::new();

        for (path, data) in &self.streams {
            let parts: Vec<&str> = path.split('/').collect();
            let mut parent = 0;
            for storage in &parts[..parts.len() - 1] {
                parent = child(&mut nodes, parent, storage, STGTY_STORAGE);
            }
            let index = child(&mut nodes, parent, parts[parts.len() - 1], STGTY_STREAM);

            let start = if data.is_empty() {
                ENDOFCHAIN
            } else if data.len() < MINI_STREAM_CUTOFF as usize {
                let start = minifat.len() as u32;
                let count = data.len().div_ceil(MINI_SECTOR_SIZE);
                for (i, chunk) in data.chunks(MINI_SECTOR_SIZE).enumerate() {
                    ministream.extend_from_slice(chunk);
                    ministream.resize(ministream.len() + MINI_SECTOR_SIZE - chunk.len(), 0);
                    minifat.push(if i + 1 < count { start + i as u32 + 1 } else { ENDOFCHAIN });
                }
                start
            } else {
                push_chain(&mut sectors, &mut fat, data)
            };
            nodes[index].start = start;
            nodes[index].size = data.len() as u64;
        }

        nodes[0].start = push_chain(&mut sectors, &mut fat, &ministream);
        nodes[0].size = ministream.len() as u64;

        let num_minifat_sectors = minifat.len().div_ceil(SECTOR_SIZE / 4);
        minifat.resize(num_minifat_sectors * (SECTOR_SIZE / 4), FREESECT);
        let minifat_bytes: Vec<u8> = minifat.iter().flat_map(|v| v.to_le_bytes()).collect();
        let first_minifat = push_chain(&mut sectors, &mut fat, &minifat_bytes);

        let mut directory = Vec::new();
        for node in &nodes {
            directory.extend(encode_entry(node));
        }
        while directory.len() % SECTOR_SIZE != 0 {
            directory.extend(encode_entry(&Node {
                name: String::new(),
                kind: 0,
                child: NOSTREAM,
                right: NOSTREAM,
                start: 0,
                size: 0,
            }));
        }
        let first_dir = push_chain(&mut sectors, &mut fat, &directory);

        let entries_per_fat = SECTOR_SIZE / 4;
        let mut num_fat = 1;
        while sectors.len() + num_fat > num_fat * entries_per_fat {
            num_fat += 1;
        }
        let first_fat = sectors.len() as u32;
        fat.extend(std::iter::repeat_n(FATSECT, num_fat));
        fat.resize(num_fat * entries_per_fat, FREESECT);
        for chunk in fat.chunks(entries_per_fat) {
            sectors.push(chunk.iter().flat_map(|v| v.to_le_bytes()).collect());
        }

        let mut header = vec![0u8; SECTOR_SIZE];
        header[0..8].copy_from_slice(MAGIC);
        header[24..26].copy_from_slice(&0x3Eu16.to_le_bytes());
        header[26..28].copy_from_slice(&3u16.to_le_bytes());
        header[28..30].copy_from_slice(&0xFFFEu16.to_le_bytes());
        header[30..32].copy_from_slice(&9u16.to_le_bytes());
        header[32..34].copy_from_slice(&6u16.to_le_bytes());
        header[44..48].copy_from_slice(&(num_fat as u32).to_le_bytes());
        header[48..52].copy_from_slice(&first_dir.to_le_bytes());
        header[56..60].copy_from_slice(&MINI_STREAM_CUTOFF.to_le_bytes());
        header[60..64].copy_from_slice(&first_minifat.to_le_bytes());
        header[64..68].copy_from_slice(&(num_minifat_sectors as u32).to_le_bytes());
        header[68..72].copy_from_slice(&ENDOFCHAIN.to_le_bytes());
        for i in 0..HEADER_DIFAT_ENTRIES {
            let value = if i < num_fat { first_fat + i as u32 } else { FREESECT };
            let offset = 76 + i * 4;
            header[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        }

        let mut out = header;
        for sector in sectors {
            out.extend(sector);
        }
        out
    }
}

/// Find or create the child `name` of `parent`.
fn child(nodes: &mut Vec<Node>, parent: usize, name: &str, kind: u8) -> usize {
    let mut sid = nodes[parent].child;
    while sid != NOSTREAM {
        if nodes[sid as usize].name == name {
            return sid as usize;
        }
        sid = nodes[sid as usize].right;
    }
    let index = nodes.len();
    nodes.push(Node {
        name: name.to_string(),
        kind,
        child: NOSTREAM,
        right: nodes[parent].child,
        start: ENDOFCHAIN,
        size: 0,
    });
    nodes[parent].child = index as u32;
    index
}

/// Append `data` as a sector chain and return its first sector.
fn push_chain(sectors: &mut Vec<Vec<u8>>, fat: &mut Vec<u32>, data: &[u8]) -> u32 {
    if data.is_empty() {
        return ENDOFCHAIN;
    }
    let start = sectors.len() as u32;
    let count = data.len().div_ceil(SECTOR_SIZE);
    for (i, chunk) in data.chunks(SECTOR_SIZE).enumerate() {
        let mut sector = chunk.to_vec();
        sector.resize(SECTOR_SIZE, 0);
        sectors.push(sector);
        fat.push(if i + 1 < count { start + i as u32 + 1 } else { ENDOFCHAIN });
    }
    start
}

fn encode_entry(node: &Node) -> Vec<u8> {
    let mut entry = vec![0u8; DIRENTRY_SIZE];
    let name: Vec<u8> = node.name.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
    entry[..name.len()].copy_from_slice(&name);
    let name_len = if node.name.is_empty() { 0 } else { name.len() as u16 + 2 };
    entry[64..66].copy_from_slice(&name_len.to_le_bytes());
    entry[66] = node.kind;
    entry[67] = 1;
    entry[68..72].copy_from_slice(&NOSTREAM.to_le_bytes());
    entry[72..76].copy_from_slice(&node.right.to_le_bytes());
    entry[76..80].copy_from_slice(&node.child.to_le_bytes());
    entry[116..120].copy_from_slice(&node.start.to_le_bytes());
    entry[120..128].copy_from_slice(&node.size.to_le_bytes());
    entry
}
