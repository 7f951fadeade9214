//! Distribution document decryption.
//!
//! ViewText sections carry a 256-byte distribution data block whose bytes,
//! mixed with the output of the MSVC `rand()` generator, yield an AES-128 key.
//! The section body that follows is AES-128 ECB encrypted.

use std::io::{self, Read};

use aes::Aes128;
use aes::cipher::{BlockDecrypt, KeyInit, generic_array::GenericArray};

use super::consts::DISTRIBUTE_DATA_SIZE;
use crate::common::binary::read_u32_le;
use crate::common::{Error, Result};

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Linear-congruential generator matching MSVC `rand()`.
#[derive(Debug, Clone)]
pub struct MsvcRand {
    state: u32,
}

impl MsvcRand {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next draw in `0..=0x7FFF`.
    #[inline]
    pub fn next_value(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(214013).wrapping_add(2531011);
        (self.state >> 16) & 0x7FFF
    }
}

/// Derive the 16-byte AES key from a distribution data block.
///
/// The block must be exactly 256 bytes.
pub fn derive_key(dist_data: &[u8]) -> Result<[u8; 16]> {
    if dist_data.len() != DISTRIBUTE_DATA_SIZE {
        return Err(Error::malformed(format!(
            "distribution data is {} bytes, expected {}",
            dist_data.len(),
            DISTRIBUTE_DATA_SIZE
        )));
    }

    let seed = read_u32_le(dist_data, 0)?;
    let mut rng = MsvcRand::new(seed);

    let mut random = [0u8; DISTRIBUTE_DATA_SIZE];
    let mut i = 0;
    while i < DISTRIBUTE_DATA_SIZE {
        let value = (rng.next_value() & 0xFF) as u8;
        let run = ((rng.next_value() & 0x0F) + 1) as usize;
        let end = (i + run).min(DISTRIBUTE_DATA_SIZE);
        random[i..end].fill(value);
        i = end;
    }

    let offset = ((seed & 0x0F) + 4) as usize;
    if offset + 16 > DISTRIBUTE_DATA_SIZE {
        return Err(Error::malformed(format!("invalid key offset {}", offset)));
    }

    let mut key = [0u8; 16];
    for (k, (d, r)) in key
        .iter_mut()
        .zip(dist_data[offset..].iter().zip(&random[offset..]))
    {
        *k = d ^ r;
    }
    Ok(key)
}

/// Streaming AES-128 ECB decryptor.
///
/// Decrypts one block at a time and serves bytes out of it. End of input on a
/// block boundary is a clean EOF; a partial trailing block fails with
/// [`io::ErrorKind::InvalidData`].
pub struct EcbDecryptReader<R: Read> {
    inner: R,
    cipher: Aes128,
    block: [u8; BLOCK_SIZE],
    pos: usize,
    len: usize,
}

impl<R: Read> EcbDecryptReader<R> {
    pub fn new(inner: R, key: &[u8; 16]) -> Result<Self> {
        let cipher = Aes128::new_from_slice(key)
            .map_err(|_| Error::malformed("invalid AES-128 key length"))?;
        Ok(Self {
            inner,
            cipher,
            block: [0u8; BLOCK_SIZE],
            pos: 0,
            len: 0,
        })
    }

    /// Fill the next block from the inner reader. Returns false on clean EOF.
    fn fill_block(&mut self) -> io::Result<bool> {
        let mut filled = 0;
        while filled < BLOCK_SIZE {
            match self.inner.read(&mut self.block[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        match filled {
            0 => Ok(false),
            BLOCK_SIZE => {
                let block = GenericArray::from_mut_slice(&mut self.block);
                self.cipher.decrypt_block(block);
                self.pos = 0;
                self.len = BLOCK_SIZE;
                Ok(true)
            },
            n => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("encrypted stream not aligned to block size ({} trailing bytes)", n),
            )),
        }
    }
}

impl<R: Read> Read for EcbDecryptReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pos >= self.len && !self.fill_block()? {
            return Ok(0);
        }
        let n = buf.len().min(self.len - self.pos);
        buf[..n].copy_from_slice(&self.block[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::cipher::BlockEncrypt;
    use proptest::prelude::*;

    fn encrypt_ecb(key: &[u8; 16], data: &[u8]) -> Vec<u8> {
        let cipher = Aes128::new_from_slice(key).unwrap();
        let mut out = data.to_vec();
        for chunk in out.chunks_mut(BLOCK_SIZE) {
            cipher.encrypt_block(GenericArray::from_mut_slice(chunk));
        }
        out
    }

    #[test]
    fn test_msvc_rand_sequence() {
        // srand(1); rand() from the MSVC runtime
        let mut rng = MsvcRand::new(1);
        assert_eq!(rng.next_value(), 41);
        assert_eq!(rng.next_value(), 18467);
        assert_eq!(rng.next_value(), 6334);
    }

    #[test]
    fn test_derive_key_zero_data() {
        // With all-zero data the seed is 0, the offset is 4 and the key is the
        // generator output itself.
        let data = [0u8; 256];
        let key = derive_key(&data).unwrap();

        let mut rng = MsvcRand::new(0);
        let mut expected = Vec::new();
        while expected.len() < 256 {
            let value = (rng.next_value() & 0xFF) as u8;
            let run = (rng.next_value() & 0x0F) + 1;
            for _ in 0..run {
                expected.push(value);
            }
        }
        assert_eq!(&key[..], &expected[4..20]);
    }

    #[test]
    fn test_derive_key_wrong_size() {
        assert!(matches!(
            derive_key(&[0u8; 255]),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_ecb_reader_roundtrip() {
        let key = [7u8; 16];
        let plain: Vec<u8> = (0..64u8).collect();
        let encrypted = encrypt_ecb(&key, &plain);

        let mut reader = EcbDecryptReader::new(&encrypted[..], &key).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, plain);
    }

    #[test]
    fn test_ecb_reader_small_reads() {
        let key = [3u8; 16];
        let plain: Vec<u8> = (0..32u8).collect();
        let encrypted = encrypt_ecb(&key, &plain);

        let mut reader = EcbDecryptReader::new(&encrypted[..], &key).unwrap();
        let mut out = Vec::new();
        let mut buf = [0u8; 5];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, plain);
    }

    #[test]
    fn test_ecb_reader_empty() {
        let mut reader = EcbDecryptReader::new(io::empty(), &[0u8; 16]).unwrap();
        let mut out = Vec::new();
        assert_eq!(reader.read_to_end(&mut out).unwrap(), 0);
    }

    #[test]
    fn test_ecb_reader_misaligned() {
        let key = [1u8; 16];
        let mut encrypted = encrypt_ecb(&key, &[0u8; 16]);
        encrypted.extend_from_slice(&[0u8; 5]);

        let mut reader = EcbDecryptReader::new(&encrypted[..], &key).unwrap();
        let mut out = Vec::new();
        let err = reader.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    proptest! {
        #[test]
        fn prop_derive_key_is_deterministic(data in proptest::collection::vec(any::<u8>(), 256)) {
            let a = derive_key(&data).unwrap();
            let b = derive_key(&data).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_key_depends_only_on_window(data in proptest::collection::vec(any::<u8>(), 256), tail in any::<u8>()) {
            // Bytes past the largest possible key window (4 + 15 + 16) do not
            // influence the key.
            let mut other = data.clone();
            other[255] = tail;
            prop_assert_eq!(derive_key(&data).unwrap(), derive_key(&other).unwrap());
        }
    }
}
