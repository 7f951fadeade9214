use super::consts::*;
use std::collections::HashSet;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use zerocopy::{FromBytes, LE, U16, U32, U64};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Raw compound file header (512 bytes)
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawHeader {
    /// Magic signature `D0 CF 11 E0 A1 B1 1A E1`
    signature: [u8; 8],
    /// Reserved class id
    clsid: [u8; 16],
    minor_version: U16<LE>,
    /// Major version (3 = 512-byte sectors, 4 = 4096-byte sectors)
    dll_version: U16<LE>,
    /// Must be 0xFFFE (little-endian)
    byte_order: U16<LE>,
    sector_shift: U16<LE>,
    mini_sector_shift: U16<LE>,
    reserved: [u8; 6],
    num_dir_sectors: U32<LE>,
    num_fat_sectors: U32<LE>,
    first_dir_sector: U32<LE>,
    transaction_signature: U32<LE>,
    /// Streams smaller than this live in the mini stream
    mini_stream_cutoff: U32<LE>,
    first_minifat_sector: U32<LE>,
    num_minifat_sectors: U32<LE>,
    first_difat_sector: U32<LE>,
    num_difat_sectors: U32<LE>,
    /// First 109 FAT sector locations
    difat: [U32<LE>; HEADER_DIFAT_ENTRIES],
}

/// Raw directory entry structure (128 bytes)
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawDirectoryEntry {
    /// Entry name in UTF-16LE (64 bytes, null-padded)
    name: [u8; 64],
    /// Length of name in bytes (including null terminator)
    name_len: U16<LE>,
    /// Entry type (1 = storage, 2 = stream, 5 = root)
    entry_type: u8,
    node_color: u8,
    sid_left: U32<LE>,
    sid_right: U32<LE>,
    sid_child: U32<LE>,
    clsid: [u8; 16],
    state_bits: U32<LE>,
    creation_time: U64<LE>,
    modified_time: U64<LE>,
    start_sector: U32<LE>,
    stream_size: U64<LE>,
}

/// A stream or storage entry in the container directory.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// Storage ID (index in directory)
    pub sid: u32,
    /// Entry name
    pub name: String,
    /// Entry type (stream, storage, root)
    pub entry_type: u8,
    /// Left sibling in the red-black tree
    pub sid_left: u32,
    /// Right sibling in the red-black tree
    pub sid_right: u32,
    /// First child (storages only)
    pub sid_child: u32,
    /// First sector of the stream
    pub start_sector: u32,
    /// Size of the stream in bytes
    pub size: u64,
    /// Whether this stream is stored in the mini stream
    pub is_minifat: bool,
}

/// Error types for compound file parsing
#[derive(Debug)]
pub enum OleError {
    Io(io::Error),
    InvalidFormat(String),
    NotOleFile,
    CorruptedFile(String),
    StreamNotFound(String),
}

impl From<io::Error> for OleError {
    fn from(err: io::Error) -> Self {
        // A short read inside the container means the file is truncated.
        if err.kind() == io::ErrorKind::UnexpectedEof {
            OleError::CorruptedFile("unexpected end of file".to_string())
        } else {
            OleError::Io(err)
        }
    }
}

impl fmt::Display for OleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OleError::Io(e) => write!(f, "IO error: {}", e),
            OleError::InvalidFormat(s) => write!(f, "Invalid format: {}", s),
            OleError::NotOleFile => write!(f, "Not a compound file"),
            OleError::CorruptedFile(s) => write!(f, "Corrupted file: {}", s),
            OleError::StreamNotFound(s) => write!(f, "Stream not found: {}", s),
        }
    }
}

impl std::error::Error for OleError {}

/// Compound file (OLE2 structured storage) reader.
///
/// The directory and allocation tables are loaded eagerly on open; stream
/// contents are read on demand through [`OleFile::open_stream`].
#[derive(Debug)]
pub struct OleFile<R: Read + Seek> {
    reader: R,
    sector_size: usize,
    mini_sector_size: usize,
    mini_stream_cutoff: u32,
    /// File Allocation Table - maps sector to next sector in chain
    fat: Vec<u32>,
    /// Mini FAT - for streams smaller than the cutoff size
    minifat: Vec<u32>,
    root: Option<DirectoryEntry>,
    /// All directory entries indexed by SID
    dir_entries: Vec<Option<DirectoryEntry>>,
    /// Mini stream data (loaded on first use)
    ministream: Option<Vec<u8>>,
}

impl<R: Read + Seek> OleFile<R> {
    /// Open and parse a compound file from a reader.
    pub fn open(mut reader: R) -> Result<Self, OleError> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        if file_size < MINIMAL_OLEFILE_SIZE as u64 {
            return Err(OleError::NotOleFile);
        }

        let mut header_bytes = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header_bytes)?;
        let header = RawHeader::read_from_bytes(&header_bytes[..])
            .map_err(|_| OleError::InvalidFormat("Failed to parse header".to_string()))?;

        if &header.signature != MAGIC {
            return Err(OleError::NotOleFile);
        }
        if header.byte_order.get() != 0xFFFE {
            return Err(OleError::InvalidFormat("Invalid byte order".to_string()));
        }

        let sector_shift = header.sector_shift.get();
        let mini_sector_shift = header.mini_sector_shift.get();
        if sector_shift != 9 && sector_shift != 12 {
            return Err(OleError::InvalidFormat(format!(
                "Unsupported sector shift {}",
                sector_shift
            )));
        }
        if mini_sector_shift == 0 || mini_sector_shift >= sector_shift {
            return Err(OleError::InvalidFormat(format!(
                "Unsupported mini sector shift {}",
                mini_sector_shift
            )));
        }

        let sector_size = 1usize << sector_shift;
        let dll_version = header.dll_version.get();
        if (dll_version == 3 && sector_size != 512) || (dll_version == 4 && sector_size != 4096) {
            return Err(OleError::InvalidFormat("Sector size mismatch".to_string()));
        }

        let mini_stream_cutoff = header.mini_stream_cutoff.get();
        if mini_stream_cutoff != MINI_STREAM_CUTOFF {
            return Err(OleError::InvalidFormat(format!(
                "Unsupported mini stream cutoff {}",
                mini_stream_cutoff
            )));
        }

        // Sectors that fit in the file after the header sector
        let max_sectors = (file_size / sector_size as u64).saturating_sub(1) as usize;
        if header.num_fat_sectors.get() as usize > max_sectors {
            return Err(OleError::CorruptedFile(format!(
                "{} FAT sectors declared in a file of {} sectors",
                header.num_fat_sectors.get(),
                max_sectors
            )));
        }

        let mut ole = OleFile {
            reader,
            sector_size,
            mini_sector_size: 1usize << mini_sector_shift,
            mini_stream_cutoff,
            fat: Vec::new(),
            minifat: Vec::new(),
            root: None,
            dir_entries: Vec::new(),
            ministream: None,
        };

        ole.load_fat(&header, max_sectors)?;
        ole.load_directory(header.first_dir_sector.get())?;
        if header.num_minifat_sectors.get() > 0 {
            ole.load_minifat(header.first_minifat_sector.get())?;
        }

        Ok(ole)
    }

    /// Load the File Allocation Table from the header DIFAT and any DIFAT sectors.
    fn load_fat(&mut self, header: &RawHeader, max_sectors: usize) -> Result<(), OleError> {
        let mut fat_sectors: Vec<u32> = header
            .difat
            .iter()
            .map(|v| v.get())
            .take_while(|&s| s != FREESECT && s != ENDOFCHAIN)
            .collect();

        let mut difat_sector = header.first_difat_sector.get();
        let entries_per_sector = (self.sector_size / 4) - 1; // last slot chains to the next DIFAT sector
        let mut visited = HashSet::new();
        for _ in 0..header.num_difat_sectors.get() {
            if difat_sector > MAXREGSECT {
                break;
            }
            if !visited.insert(difat_sector) {
                return Err(OleError::CorruptedFile("Cyclic DIFAT chain".to_string()));
            }
            let sector_data = self.read_sector(difat_sector)?;
            let entries = read_u32_array(&sector_data);

            fat_sectors.extend(
                entries[..entries_per_sector]
                    .iter()
                    .copied()
                    .take_while(|&s| s != FREESECT && s != ENDOFCHAIN),
            );
            difat_sector = entries[entries_per_sector];
        }

        if fat_sectors.len() > max_sectors {
            return Err(OleError::CorruptedFile(format!(
                "{} FAT sectors listed in a file of {} sectors",
                fat_sectors.len(),
                max_sectors
            )));
        }

        self.fat.reserve(fat_sectors.len() * (self.sector_size / 4));
        for sector_id in fat_sectors {
            let sector_data = self.read_sector(sector_id)?;
            self.fat.extend(read_u32_array(&sector_data));
        }

        Ok(())
    }

    /// Load the Mini FAT (allocation table for small streams).
    fn load_minifat(&mut self, first_minifat_sector: u32) -> Result<(), OleError> {
        let minifat_data = self.read_stream_from_fat(first_minifat_sector)?;
        self.minifat = read_u32_array(&minifat_data);
        Ok(())
    }

    /// Load all directory entries reachable from the root.
    fn load_directory(&mut self, first_dir_sector: u32) -> Result<(), OleError> {
        let dir_data = self.read_stream_from_fat(first_dir_sector)?;
        let num_entries = dir_data.len() / DIRENTRY_SIZE;
        if num_entries == 0 {
            return Err(OleError::CorruptedFile("Empty directory".to_string()));
        }
        self.dir_entries = vec![None; num_entries];

        let root = self.parse_directory_entry(&dir_data[0..DIRENTRY_SIZE], 0)?;
        let root_child = root.sid_child;
        self.root = Some(root);

        // Iterative walk; a visited check guards against cyclic sibling links.
        let mut pending = vec![root_child];
        while let Some(sid) = pending.pop() {
            if sid == NOSTREAM {
                continue;
            }
            let index = sid as usize;
            if index == 0 || index >= num_entries {
                return Err(OleError::CorruptedFile(
                    "Invalid directory entry index".to_string(),
                ));
            }
            if self.dir_entries[index].is_some() {
                continue;
            }

            let offset = index * DIRENTRY_SIZE;
            let entry = self.parse_directory_entry(&dir_data[offset..offset + DIRENTRY_SIZE], sid)?;
            pending.extend([entry.sid_left, entry.sid_right, entry.sid_child]);
            self.dir_entries[index] = Some(entry);
        }

        Ok(())
    }

    fn parse_directory_entry(&self, data: &[u8], sid: u32) -> Result<DirectoryEntry, OleError> {
        let raw = RawDirectoryEntry::read_from_bytes(data)
            .map_err(|_| OleError::InvalidFormat("Failed to parse directory entry".to_string()))?;

        let name_len = (raw.name_len.get() as usize).saturating_sub(2).min(64);
        let name = decode_utf16le(&raw.name[..name_len]);

        // 512-byte sector files only use the low 32 bits of the size
        let size = if self.sector_size == 512 {
            raw.stream_size.get() & 0xFFFF_FFFF
        } else {
            raw.stream_size.get()
        };

        Ok(DirectoryEntry {
            sid,
            name,
            entry_type: raw.entry_type,
            sid_left: raw.sid_left.get(),
            sid_right: raw.sid_right.get(),
            sid_child: raw.sid_child.get(),
            start_sector: raw.start_sector.get(),
            size,
            is_minifat: raw.entry_type == STGTY_STREAM && size < self.mini_stream_cutoff as u64,
        })
    }

    fn read_sector(&mut self, sector_id: u32) -> Result<Vec<u8>, OleError> {
        // Sector N starts right after the header-sized sector 0
        let position = ((sector_id as u64) + 1) * (self.sector_size as u64);
        self.reader.seek(SeekFrom::Start(position))?;

        let mut buffer = vec![0u8; self.sector_size];
        self.reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Read a stream by following the FAT chain.
    fn read_stream_from_fat(&mut self, start_sector: u32) -> Result<Vec<u8>, OleError> {
        let mut data = Vec::new();
        let mut sector = start_sector;
        let mut remaining = self.fat.len() + 1;

        while sector != ENDOFCHAIN {
            if sector as usize >= self.fat.len() {
                return Err(OleError::CorruptedFile(
                    "Invalid sector index in FAT".to_string(),
                ));
            }
            if remaining == 0 {
                return Err(OleError::CorruptedFile("Cyclic FAT chain".to_string()));
            }
            remaining -= 1;

            data.extend_from_slice(&self.read_sector(sector)?);
            sector = self.fat[sector as usize];
        }

        Ok(data)
    }

    /// Read a stream by following the MiniFAT chain inside the mini stream.
    fn read_stream_from_minifat(&mut self, start_sector: u32, size: u64) -> Result<Vec<u8>, OleError> {
        if self.ministream.is_none() {
            let root_start = self
                .root
                .as_ref()
                .map(|root| root.start_sector)
                .ok_or_else(|| OleError::CorruptedFile("No root entry".to_string()))?;
            self.ministream = Some(self.read_stream_from_fat(root_start)?);
        }

        let ministream = self.ministream.as_deref().unwrap_or_default();
        let mut data = Vec::with_capacity(size as usize);
        let mut sector = start_sector;
        let mut remaining = self.minifat.len() + 1;

        while sector != ENDOFCHAIN {
            if sector as usize >= self.minifat.len() {
                return Err(OleError::CorruptedFile(
                    "Invalid sector index in MiniFAT".to_string(),
                ));
            }
            if remaining == 0 {
                return Err(OleError::CorruptedFile("Cyclic MiniFAT chain".to_string()));
            }
            remaining -= 1;

            let position = (sector as usize) * self.mini_sector_size;
            let chunk = ministream
                .get(position..position + self.mini_sector_size)
                .ok_or_else(|| OleError::CorruptedFile("Mini sector out of bounds".to_string()))?;
            data.extend_from_slice(chunk);
            sector = self.minifat[sector as usize];
        }

        data.truncate(size as usize);
        Ok(data)
    }

    /// List every stream in the container as a path of storage/stream names.
    pub fn list_streams(&self) -> Vec<Vec<String>> {
        let mut streams = Vec::new();
        if let Some(root) = &self.root {
            self.collect_streams(root.sid_child, 0, &mut Vec::new(), &mut streams);
        }
        streams
    }

    fn collect_streams(
        &self,
        sid: u32,
        depth: usize,
        path: &mut Vec<String>,
        streams: &mut Vec<Vec<String>>,
    ) {
        // Depth bound: a well-formed tree never nests deeper than its entry count.
        if depth > self.dir_entries.len() {
            return;
        }
        let Some(entry) = self.entry(sid) else {
            return;
        };

        self.collect_streams(entry.sid_left, depth + 1, path, streams);

        path.push(entry.name.clone());
        match entry.entry_type {
            STGTY_STREAM => streams.push(path.clone()),
            STGTY_STORAGE => self.collect_streams(entry.sid_child, depth + 1, path, streams),
            _ => {},
        }
        path.pop();

        self.collect_streams(entry.sid_right, depth + 1, path, streams);
    }

    /// Read the full contents of the stream at `path`.
    pub fn open_stream(&mut self, path: &[&str]) -> Result<Vec<u8>, OleError> {
        let entry = self.find_entry(path)?;
        if entry.entry_type != STGTY_STREAM {
            return Err(OleError::InvalidFormat(format!(
                "'{}' is not a stream",
                path.join("/")
            )));
        }

        if entry.is_minifat {
            self.read_stream_from_minifat(entry.start_sector, entry.size)
        } else {
            let mut data = self.read_stream_from_fat(entry.start_sector)?;
            if (data.len() as u64) < entry.size {
                return Err(OleError::CorruptedFile(format!(
                    "Stream '{}' shorter than its declared size",
                    path.join("/")
                )));
            }
            data.truncate(entry.size as usize);
            Ok(data)
        }
    }

    /// Check whether an entry exists at `path`.
    pub fn exists(&self, path: &[&str]) -> bool {
        self.find_entry(path).is_ok()
    }

    fn entry(&self, sid: u32) -> Option<&DirectoryEntry> {
        if sid == NOSTREAM {
            return None;
        }
        self.dir_entries.get(sid as usize)?.as_ref()
    }

    fn find_entry(&self, path: &[&str]) -> Result<DirectoryEntry, OleError> {
        let not_found = || OleError::StreamNotFound(path.join("/"));
        let root = self.root.as_ref().ok_or_else(not_found)?;
        if path.is_empty() {
            return Ok(root.clone());
        }

        let mut current = root;
        for &name in path {
            if current.entry_type != STGTY_STORAGE && current.entry_type != STGTY_ROOT {
                return Err(not_found());
            }
            current = self
                .find_child_by_name(current.sid_child, name)
                .ok_or_else(not_found)?;
        }
        Ok(current.clone())
    }

    /// Search a sibling tree for `name` (case-insensitive).
    fn find_child_by_name(&self, sid: u32, name: &str) -> Option<&DirectoryEntry> {
        let mut pending = vec![sid];
        let mut visited = 0usize;
        while let Some(sid) = pending.pop() {
            let Some(entry) = self.entry(sid) else {
                continue;
            };
            visited += 1;
            if visited > self.dir_entries.len() {
                return None;
            }
            if entry.name.to_lowercase() == name.to_lowercase() {
                return Some(entry);
            }
            pending.push(entry.sid_left);
            pending.push(entry.sid_right);
        }
        None
    }
}

fn read_u32_array(data: &[u8]) -> Vec<u32> {
    data.chunks_exact(4)
        .map(|chunk| U32::<LE>::read_from_bytes(chunk).map(|v| v.get()).unwrap_or(FREESECT))
        .collect()
}

/// Decode UTF-16LE bytes to String
fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| U16::<LE>::read_from_bytes(chunk).map(|v| v.get()).unwrap_or(0))
        .collect();

    String::from_utf16_lossy(&units)
        .trim_end_matches('\0')
        .to_string()
}

/// Check if data starts like a compound file
pub fn is_ole_file(data: &[u8]) -> bool {
    data.len() >= MINIMAL_OLEFILE_SIZE && &data[0..8] == MAGIC
}
