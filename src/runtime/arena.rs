use super::address::{self, KIND_SLOT, NODE_SIZE};
use super::codec::{Kind, Record, UNSET};
use crate::error::{Error, Malformed, Result};

/// The `Buffer` is the growth-only store of node records.
/// New nodes are appended with [`Buffer::allocate`]; nothing is ever removed,
/// so a node id stays valid for the lifetime of the buffer.
///
/// The node count is `nodes.len()`. `capacity` is the highest machine address
/// (exclusive) the records may reach, counted from offset 0 so that it
/// includes the `base` padding and the count header.
#[derive(Clone, Debug)]
pub struct Buffer {
    nodes: Vec<Record>,
    base: u64,
    capacity: u64,
}

impl Buffer {
    pub fn new(base: u64, capacity: u64) -> Self {
        Self {
            nodes: Vec::new(),
            base,
            capacity,
        }
    }

    /// Adopts records that were decoded from an image.
    pub fn from_records(nodes: Vec<Record>, base: u64, capacity: u64) -> Result<Self> {
        let buffer = Self {
            nodes,
            base,
            capacity,
        };
        buffer.check_room(0)?;
        Ok(buffer)
    }

    pub fn count(&self) -> u64 {
        self.nodes.len() as u64
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn records(&self) -> &[Record] {
        &self.nodes
    }

    /// First address past the records of a buffer holding `count` nodes.
    fn end_addr(&self, count: u64) -> Result<u64> {
        address::node_addr(self.base, count)
    }

    /// Fails unless `additional` more nodes fit under the capacity.
    pub fn check_room(&self, additional: u64) -> Result<()> {
        let count = self
            .count()
            .checked_add(additional)
            .ok_or(Malformed::AddressOverflow)?;
        let end = self.end_addr(count)?;
        if end > self.capacity {
            return Err(Error::OutOfMemory {
                requested: end,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    pub(crate) fn allocate(&mut self, kind: Kind) -> Result<u64> {
        self.check_room(1)?;
        let id = self.count();
        self.nodes.push(Record::new(kind));
        Ok(id)
    }

    /// Index of the node owning `port`. An out-of-range access reports `port`.
    fn index_of(&self, port: u64) -> Result<usize> {
        let id = address::addr(port);
        usize::try_from(id)
            .ok()
            .filter(|index| *index < self.nodes.len())
            .ok_or_else(|| {
                Malformed::NodeOutOfBounds {
                    port,
                    count: self.count(),
                }
                .into()
            })
    }

    pub fn record(&self, id: u64) -> Result<&Record> {
        let index = self.index_of(principal(id))?;
        Ok(&self.nodes[index])
    }

    pub fn read_kind(&self, id: u64) -> Result<Kind> {
        Ok(self.record(id)?.kind)
    }

    /// The value of a wire field. Only slots 0 to 2 are wires.
    pub fn read_field(&self, port: u64) -> Result<u64> {
        let slot = wire_slot(port)?;
        let index = self.index_of(port)?;
        Ok(self.nodes[index].wires[slot])
    }

    /// Overwrites one wire field, leaving the node's other fields untouched.
    pub(crate) fn write_field(&mut self, port: u64, value: u64) -> Result<()> {
        let slot = wire_slot(port)?;
        let index = self.index_of(port)?;
        self.nodes[index].wires[slot] = value;
        Ok(())
    }

    /// Checks that `port` is a wire port of an allocated node.
    pub fn check_port(&self, port: u64) -> Result<()> {
        wire_slot(port)?;
        self.index_of(port).map(|_| ())
    }

    /// Bytes the records occupy when laid out as an image.
    pub fn image_len(&self) -> usize {
        ((self.count() + 1) * NODE_SIZE) as usize
    }
}

fn wire_slot(port: u64) -> Result<usize> {
    match address::slot(port) {
        KIND_SLOT => Err(Malformed::NotAWire { port }.into()),
        slot => Ok(slot as usize),
    }
}

/// Principal port of `id`, saturating for ids too large to have ports.
fn principal(id: u64) -> u64 {
    address::port(id, 0).unwrap_or(UNSET)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::address::{port, DEFAULT_BASE};

    fn buffer() -> Buffer {
        Buffer::new(DEFAULT_BASE, 1 << 16)
    }

    #[test]
    fn allocate_returns_the_previous_count() {
        let mut buffer = buffer();
        for expected in 0..5 {
            let before = buffer.count();
            let id = buffer.allocate(Kind::Con).unwrap();
            assert_eq!(id, expected);
            assert_eq!(id, before);
            assert_eq!(buffer.count(), before + 1);
        }
        let record = buffer.record(4).unwrap();
        assert_eq!(record.kind, Kind::Con);
        assert_eq!(record.wires, [UNSET; 3]);
    }

    #[test]
    fn allocation_beyond_capacity_fails() {
        // room for exactly two nodes
        let capacity = address::node_addr(DEFAULT_BASE, 2).unwrap();
        let mut buffer = Buffer::new(DEFAULT_BASE, capacity);
        buffer.allocate(Kind::Era).unwrap();
        buffer.allocate(Kind::Fan).unwrap();
        assert_eq!(
            buffer.allocate(Kind::Con),
            Err(Error::OutOfMemory {
                requested: capacity + NODE_SIZE,
                capacity
            })
        );
        assert_eq!(buffer.count(), 2);
    }

    #[test]
    fn write_field_touches_only_its_slot() {
        let mut buffer = buffer();
        let id = buffer.allocate(Kind::Fan).unwrap();
        buffer.write_field(port(id, 1).unwrap(), 42).unwrap();
        let record = buffer.record(id).unwrap();
        assert_eq!(record.wires, [UNSET, 42, UNSET]);
        assert_eq!(record.kind, Kind::Fan);
        assert_eq!(buffer.read_field(port(id, 1).unwrap()).unwrap(), 42);
    }

    #[test]
    fn kind_slot_and_missing_nodes_are_rejected() {
        let mut buffer = buffer();
        buffer.allocate(Kind::Con).unwrap();
        assert_eq!(
            buffer.read_field(3),
            Err(Malformed::NotAWire { port: 3 }.into())
        );
        assert_eq!(
            buffer.write_field(9, 0),
            Err(Malformed::NodeOutOfBounds { port: 9, count: 1 }.into())
        );
        assert!(buffer.check_port(2).is_ok());
        assert!(buffer.check_port(4).is_err());
    }
}
