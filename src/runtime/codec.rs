//! Node records and their packed 256-bit encoding.
//!
//! A record is four 64-bit fields. Packed into one wide word it reads
//! `wire[0] << 192 | wire[1] << 128 | wire[2] << 64 | kind`, which is stored
//! big-endian, so the kind occupies the last 8 bytes.

use std::fmt;

use crate::error::{Malformed, Result};

/// Marks a wire field that was never linked.
pub const UNSET: u64 = u64::MAX;

/// Marks the principal field of a node consumed by an annihilation. Like
/// [`UNSET`], it lies past any node id a buffer can hold.
pub const RETIRED: u64 = u64::MAX - 1;

pub const WIDE_WORD_BYTES: usize = 32;

#[repr(u64)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Era = 0,
    Con = 1,
    Fan = 2,
}

impl Kind {
    pub fn tag(self) -> u64 {
        self as u64
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Era => "era",
            Self::Con => "con",
            Self::Fan => "fan",
        }
    }
}

impl TryFrom<u64> for Kind {
    type Error = u64;

    fn try_from(tag: u64) -> Result<Self, u64> {
        match tag {
            0 => Ok(Self::Era),
            1 => Ok(Self::Con),
            2 => Ok(Self::Fan),
            other => Err(other),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One 32-byte big-endian word, the unit of every load and store in the
/// packed representation.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct WideWord(pub [u8; WIDE_WORD_BYTES]);

impl WideWord {
    pub const ZERO: Self = Self([0; WIDE_WORD_BYTES]);

    /// The 64-bit limb at position `index`, counting from the most
    /// significant end.
    pub fn limb(&self, index: usize) -> u64 {
        let mut limb = [0; 8];
        limb.copy_from_slice(&self.0[index * 8..index * 8 + 8]);
        u64::from_be_bytes(limb)
    }

    pub fn set_limb(&mut self, index: usize, value: u64) {
        self.0[index * 8..index * 8 + 8].copy_from_slice(&value.to_be_bytes());
    }

    /// `word & 0xffff_ffff_ffff_ffff`
    pub fn low_u64(&self) -> u64 {
        self.limb(3)
    }

    /// Clears the low 64 bits and ORs in `value`; the upper 192 bits are kept.
    pub fn with_low_u64(mut self, value: u64) -> Self {
        self.set_limb(3, value);
        self
    }
}

impl fmt::Debug for WideWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Record {
    pub wires: [u64; 3],
    pub kind: Kind,
}

impl Record {
    pub fn new(kind: Kind) -> Self {
        Self {
            wires: [UNSET; 3],
            kind,
        }
    }

    pub fn pack(&self) -> WideWord {
        let mut word = WideWord::ZERO;
        for (index, wire) in self.wires.iter().enumerate() {
            word.set_limb(index, *wire);
        }
        word.with_low_u64(self.kind.tag())
    }

    /// `node` is only used to report an invalid kind tag.
    pub fn unpack(word: WideWord, node: u64) -> Result<Self> {
        let kind = Kind::try_from(word.low_u64())
            .map_err(|tag| Malformed::InvalidKind { node, tag })?;
        Ok(Self {
            wires: [word.limb(0), word.limb(1), word.limb(2)],
            kind,
        })
    }

    /// A retired node was consumed by an annihilation and takes no further
    /// part in reduction. Its auxiliary fields are stale.
    pub fn is_retired(&self) -> bool {
        self.wires[0] == RETIRED
    }
}
