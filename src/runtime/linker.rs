use std::collections::BTreeSet;

use super::address::{self, port};
use super::arena::Buffer;
use super::codec::{Kind, RETIRED, UNSET};
use crate::error::{Malformed, Result};

/// A `Net` is a buffer of nodes together with the set of nodes suspected to
/// head an active pair.
///
/// All wire mutation goes through [`Net::link`]. Whenever a link joins two
/// principal ports, the lower of the two node ids becomes a candidate; the
/// reducer verifies candidates before firing, so stale entries are harmless.
#[derive(Clone, Debug)]
pub struct Net {
    pub(crate) buffer: Buffer,
    candidates: BTreeSet<u64>,
}

impl Net {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            candidates: BTreeSet::new(),
        }
    }

    /// Read-only view of the records. Wires only change through [`Net::link`].
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn enter(&self, port: u64) -> Result<u64> {
        self.buffer.read_field(port)
    }

    /// Like [`Net::enter`], but an unlinked port is an error.
    pub fn follow(&self, port: u64) -> Result<u64> {
        match self.enter(port)? {
            UNSET => Err(Malformed::UnsetWire { port }.into()),
            target => Ok(target),
        }
    }

    /// Makes `a` and `b` point at each other. Whatever they pointed at
    /// before is overwritten without being checked.
    pub fn link(&mut self, a: u64, b: u64) -> Result<()> {
        self.buffer.check_port(a)?;
        self.buffer.check_port(b)?;
        if a == b {
            return Err(Malformed::SelfWire { port: a }.into());
        }
        self.buffer.write_field(a, b)?;
        self.buffer.write_field(b, a)?;

        let (node_a, node_b) = (address::addr(a), address::addr(b));
        if address::slot(a) == 0 && address::slot(b) == 0 && node_a != node_b {
            self.candidates.insert(node_a.min(node_b));
        }
        Ok(())
    }

    /// Marks a consumed node so that it can never be mistaken for half of an
    /// active pair again.
    pub fn retire(&mut self, node: u64) -> Result<()> {
        self.buffer.write_field(port(node, 0)?, RETIRED)
    }

    pub fn alloc(&mut self, kind: Kind) -> Result<u64> {
        self.buffer.allocate(kind)
    }

    /// Allocates an eraser with its auxiliary ports looped onto each other.
    pub fn eraser(&mut self) -> Result<u64> {
        let node = self.alloc(Kind::Era)?;
        self.link(port(node, 1)?, port(node, 2)?)?;
        Ok(node)
    }

    /// The node whose principal port is mutually linked with `node`'s, if any.
    pub fn partner(&self, node: u64) -> Result<Option<u64>> {
        let principal = port(node, 0)?;
        let target = self.enter(principal)?;
        if target == UNSET || target == RETIRED || address::slot(target) != 0 {
            return Ok(None);
        }
        let other = address::addr(target);
        if other == node || self.enter(target)? != principal {
            return Ok(None);
        }
        Ok(Some(other))
    }

    /// Marks every node as a candidate; used after loading a buffer.
    pub fn seed_candidates(&mut self) {
        self.candidates.extend(0..self.buffer.count());
    }

    pub fn push_candidate(&mut self, node: u64) {
        self.candidates.insert(node);
    }

    pub fn pop_candidate(&mut self) -> Option<u64> {
        self.candidates.pop_first()
    }

    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// Checks that every set wire is in bounds and joins two distinct wire
    /// ports. Wires of live nodes must also be mutual and stay clear of
    /// retired nodes, whose auxiliary wires are stale.
    pub fn validate(&self) -> Result<()> {
        let records = self.buffer.records();
        for (node, record) in records.iter().enumerate() {
            let retired = record.is_retired();
            for slot in 0..3 {
                let here = port(node as u64, slot)?;
                let target = record.wires[slot as usize];
                if target == UNSET || (slot == 0 && retired) {
                    continue;
                }
                self.buffer.check_port(target)?;
                if target == here {
                    return Err(Malformed::SelfWire { port: here }.into());
                }
                if retired {
                    continue;
                }
                if self.buffer.record(address::addr(target))?.is_retired() {
                    return Err(Malformed::WireIntoRetired { port: here, target }.into());
                }
                let back = self.enter(target)?;
                if back != here {
                    return Err(Malformed::AsymmetricWire {
                        port: here,
                        target,
                        back,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}
