//! The byte image exchanged with the host.
//!
//! An image is the machine memory starting at `base`: one 32-byte word with
//! the node count (big-endian, only the low 8 bytes may be non-zero),
//! followed by one packed [`WideWord`] per node. Offset `o` in the image is
//! machine address `base + o`.

use tracing::warn;

use super::address::{self, NODE_SIZE};
use super::arena::Buffer;
use super::codec::{Record, WideWord, WIDE_WORD_BYTES};
use super::linker::Net;
use crate::config::EngineConfig;
use crate::error::{Malformed, Result};

pub const HEADER_SIZE: usize = WIDE_WORD_BYTES;

/// A 32-byte load at `offset`. Bytes past the end of the image read as zero,
/// so the last record can be loaded through an overlapping window.
pub fn load_word(bytes: &[u8], offset: u64) -> WideWord {
    let mut word = WideWord::ZERO;
    let Ok(start) = usize::try_from(offset) else {
        return word;
    };
    if start < bytes.len() {
        let end = bytes.len().min(start.saturating_add(WIDE_WORD_BYTES));
        word.0[..end - start].copy_from_slice(&bytes[start..end]);
    }
    word
}

fn offset_of(base: u64, addr: u64) -> Result<u64> {
    addr.checked_sub(base)
        .ok_or_else(|| Malformed::AddressOverflow.into())
}

/// Reads the field of `port` straight out of an image with a wide load at
/// [`address::field_addr`]. Slot 3 yields the kind tag.
pub fn read_field(bytes: &[u8], base: u64, port: u64) -> Result<u64> {
    let offset = offset_of(base, address::field_addr(base, port)?)?;
    Ok(load_word(bytes, offset).low_u64())
}

pub fn read_kind(bytes: &[u8], base: u64, node: u64) -> Result<u64> {
    let offset = offset_of(base, address::node_addr(base, node)?)?;
    Ok(load_word(bytes, offset).low_u64())
}

fn read_count(bytes: &[u8]) -> Result<u64> {
    if bytes.len() < HEADER_SIZE {
        return Err(Malformed::Header.into());
    }
    let header = load_word(bytes, 0);
    if (0..3).any(|limb| header.limb(limb) != 0) {
        return Err(Malformed::Header.into());
    }
    Ok(header.low_u64())
}

fn decode(bytes: &[u8], config: &EngineConfig) -> Result<Net> {
    let count = read_count(bytes)?;
    let expected = count
        .checked_add(1)
        .and_then(|words| words.checked_mul(NODE_SIZE))
        .and_then(|len| usize::try_from(len).ok())
        .ok_or(Malformed::Header)?;
    if bytes.len() < expected {
        return Err(Malformed::Truncated {
            expected,
            actual: bytes.len(),
        }
        .into());
    }
    if bytes.len() > expected {
        return Err(Malformed::TrailingBytes {
            expected,
            actual: bytes.len(),
        }
        .into());
    }

    let base = config.base;
    let records = (0..count)
        .map(|node| {
            let offset = offset_of(base, address::node_addr(base, node)?)?;
            Record::unpack(load_word(bytes, offset), node)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut net = Net::new(Buffer::from_records(records, base, config.capacity)?);
    net.validate()?;
    net.seed_candidates();
    Ok(net)
}

/// Decodes and validates an image. Every node becomes a reduction candidate.
pub fn load(bytes: &[u8], config: &EngineConfig) -> Result<Net> {
    let result = decode(bytes, config);
    if let Err(error) = &result {
        warn!("Rejected image of {} bytes: {}", bytes.len(), error);
    }
    result
}

pub fn store(buffer: &Buffer) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(buffer.image_len());
    bytes.extend_from_slice(&WideWord::ZERO.with_low_u64(buffer.count()).0);
    for record in buffer.records() {
        bytes.extend_from_slice(&record.pack().0);
    }
    bytes
}
