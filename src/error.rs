use std::fmt;

use crate::runtime::address;

/// The reason a network was rejected as malformed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Malformed {
    /// A port refers to a node id at or past the buffer's count.
    NodeOutOfBounds { port: u64, count: u64 },
    /// A wire was attached to slot 3, which only addresses the kind field.
    NotAWire { port: u64 },
    /// `wire(port) == target` but `wire(target) != port`.
    AsymmetricWire { port: u64, target: u64, back: u64 },
    /// A wire field points at its own port.
    SelfWire { port: u64 },
    /// A live node is wired into a node already consumed by an annihilation.
    WireIntoRetired { port: u64, target: u64 },
    /// The principal ports of the two nodes are not mutually linked.
    NotAnActivePair { x: u64, y: u64 },
    /// A rewrite needed to follow a wire that was never linked.
    UnsetWire { port: u64 },
    InvalidKind { node: u64, tag: u64 },
    /// The 32-byte count header has non-zero high bytes or is missing.
    Header,
    Truncated { expected: usize, actual: usize },
    TrailingBytes { expected: usize, actual: usize },
    /// Address arithmetic left the range of a `u64`.
    AddressOverflow,
    Parse { line: usize, message: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    MalformedGraph(Malformed),
    OutOfMemory { requested: u64, capacity: u64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Malformed> for Error {
    fn from(reason: Malformed) -> Self {
        Self::MalformedGraph(reason)
    }
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeOutOfBounds { port, count } => write!(
                f,
                "port {} belongs to node {}, but only {} nodes exist",
                port,
                address::addr(*port),
                count
            ),
            Self::NotAWire { port } => write!(f, "port {} is a kind field, not a wire", port),
            Self::AsymmetricWire { port, target, back } => write!(
                f,
                "port {} points to {}, which points back to {}",
                port, target, back
            ),
            Self::SelfWire { port } => write!(f, "port {} is wired to itself", port),
            Self::WireIntoRetired { port, target } => write!(
                f,
                "port {} points to {}, which belongs to a consumed node",
                port, target
            ),
            Self::NotAnActivePair { x, y } => {
                write!(f, "nodes {} and {} do not form an active pair", x, y)
            }
            Self::UnsetWire { port } => write!(f, "port {} is not linked to anything", port),
            Self::InvalidKind { node, tag } => {
                write!(f, "node {} has unknown kind tag {}", node, tag)
            }
            Self::Header => write!(f, "the node count header is missing or out of range"),
            Self::Truncated { expected, actual } => write!(
                f,
                "image is truncated: expected {} bytes, got {}",
                expected, actual
            ),
            Self::TrailingBytes { expected, actual } => write!(
                f,
                "image has trailing bytes: expected {} bytes, got {}",
                expected, actual
            ),
            Self::AddressOverflow => write!(f, "address arithmetic overflowed"),
            Self::Parse { line, message } => write!(f, "line {}: {}", line, message),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedGraph(reason) => write!(f, "malformed graph: {}", reason),
            Self::OutOfMemory {
                requested,
                capacity,
            } => write!(
                f,
                "out of memory: {} bytes requested, capacity is {}",
                requested, capacity
            ),
        }
    }
}

impl std::error::Error for Malformed {}
impl std::error::Error for Error {}

impl Error {
    pub fn to_report(&self) -> miette::Report {
        match self {
            Self::MalformedGraph(reason @ Malformed::Parse { .. }) => miette::miette!(
                help = "each line reads `<id>: <era|con|fan> <node>.<slot> <node>.<slot> <node>.<slot>`",
                "Could not parse network: {}",
                reason
            ),
            Self::MalformedGraph(reason) => {
                miette::miette!("The network is malformed: {}.", reason)
            }
            Self::OutOfMemory {
                requested,
                capacity,
            } => miette::miette!(
                help = "raise the capacity with `--capacity` or in the config file",
                "Allocation of {} bytes exceeds the capacity of {} bytes.",
                requested,
                capacity
            ),
        }
    }
}
