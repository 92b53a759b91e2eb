//! Integer arithmetic between node ids, `(node, slot)` pairs, global port
//! numbers and byte offsets in the flat buffer.
//!
//! The buffer starts at a configurable `base` offset. The first 32-byte word
//! holds the node count, and node records follow it:
//!
//! ```text
//! base            node_start = base + NODE_SIZE
//! | count (32 B)  | node 0: w0 w1 w2 kind | node 1: w0 w1 w2 kind | ...
//! ```
//!
//! A port is a position in the "virtual" view of that memory where every node
//! is four 8-byte slots: `port = node * 4 + slot`. Ports are never addresses
//! themselves; [`field_addr`] turns one into the offset whose 32-byte load
//! ends exactly on the addressed field.

use crate::error::{Malformed, Result};

pub const SLOT_SIZE: u64 = 8;
pub const SLOTS_PER_NODE: u64 = 4;
pub const NODE_SIZE: u64 = SLOTS_PER_NODE * SLOT_SIZE;
pub const DEFAULT_BASE: u64 = 0x1f;

/// The slot of the kind field. It can be addressed but never linked.
pub const KIND_SLOT: u64 = 3;

fn overflow() -> crate::error::Error {
    Malformed::AddressOverflow.into()
}

pub fn node_start(base: u64) -> Result<u64> {
    base.checked_add(NODE_SIZE).ok_or_else(overflow)
}

/// Byte offset of the first byte of node `id`'s record.
pub fn node_addr(base: u64, id: u64) -> Result<u64> {
    id.checked_mul(NODE_SIZE)
        .and_then(|offset| offset.checked_add(node_start(base).ok()?))
        .ok_or_else(overflow)
}

pub fn port(id: u64, slot: u64) -> Result<u64> {
    debug_assert!(slot < SLOTS_PER_NODE);
    id.checked_mul(SLOTS_PER_NODE)
        .and_then(|p| p.checked_add(slot))
        .ok_or_else(overflow)
}

/// Byte offset such that a 32-byte load starting here holds the field of
/// `port` in its low-order 8 bytes.
pub fn field_addr(base: u64, port: u64) -> Result<u64> {
    port.checked_add(1)
        .and_then(|p| p.checked_mul(SLOT_SIZE))
        .and_then(|p| p.checked_add(base))
        .ok_or_else(overflow)
}

/// Inverse of [`field_addr`]. Offsets that do not land on a field are rejected.
pub fn port_from_field_addr(base: u64, addr: u64) -> Result<u64> {
    let relative = addr.checked_sub(base).ok_or_else(overflow)?;
    if relative % SLOT_SIZE != 0 {
        return Err(overflow());
    }
    (relative / SLOT_SIZE).checked_sub(1).ok_or_else(overflow)
}

/// The node a port belongs to.
pub fn addr(port: u64) -> u64 {
    port / SLOTS_PER_NODE
}

pub fn slot(port: u64) -> u64 {
    port % SLOTS_PER_NODE
}
