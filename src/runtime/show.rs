use std::fmt::{self, Display};

use super::address;
use super::arena::Buffer;
use super::codec::{RETIRED, UNSET};

/// A port written as `node.slot`, `_` when unset, or `*` on a retired node.
pub struct ShowPort(pub u64);

impl Display for ShowPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            UNSET => write!(f, "_"),
            RETIRED => write!(f, "*"),
            port => write!(f, "{}.{}", address::addr(port), address::slot(port)),
        }
    }
}

pub struct Shower<'a> {
    pub buffer: &'a Buffer,
    /// Leave out retired nodes. The output is then easier to read but can
    /// no longer be parsed back, since ids must be dense.
    pub live_only: bool,
}

impl<'a> Shower<'a> {
    pub fn from_buffer(buffer: &'a Buffer) -> Self {
        Self {
            buffer,
            live_only: false,
        }
    }
}

impl Display for Shower<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (node, record) in self.buffer.records().iter().enumerate() {
            if self.live_only && record.is_retired() {
                continue;
            }
            let [p0, p1, p2] = record.wires;
            writeln!(
                f,
                "{}: {} {} {} {}",
                node,
                record.kind,
                ShowPort(p0),
                ShowPort(p1),
                ShowPort(p2)
            )?;
        }
        Ok(())
    }
}

pub fn show(buffer: &Buffer) -> String {
    Shower::from_buffer(buffer).to_string()
}
