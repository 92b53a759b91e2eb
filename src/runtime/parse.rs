//! Text notation for networks, one node per line:
//!
//! ```text
//! # two constructors, all ports wired across
//! 0: con 1.0 1.1 1.2
//! 1: con 0.0 0.1 0.2
//! ```
//!
//! Ports are `node.slot`, `_` leaves a wire unset, and a `*` principal marks
//! a node consumed by an annihilation. Node ids must start at 0 and increase
//! by one per line. `#` starts a comment.

use winnow::ascii::{dec_uint, space0, space1};
use winnow::combinator::{alt, preceded, separated_pair, terminated};
use winnow::{ModalResult, Parser};

use super::address::{self, KIND_SLOT};
use super::arena::Buffer;
use super::codec::{Kind, Record, RETIRED, UNSET};
use super::linker::Net;
use crate::config::EngineConfig;
use crate::error::{Error, Malformed, Result};

fn kind(input: &mut &str) -> ModalResult<Kind> {
    alt((
        "era".value(Kind::Era),
        "con".value(Kind::Con),
        "fan".value(Kind::Fan),
    ))
    .parse_next(input)
}

fn port(input: &mut &str) -> ModalResult<u64> {
    alt((
        "_".value(UNSET),
        "*".value(RETIRED),
        separated_pair(dec_uint::<_, u64, _>, '.', dec_uint::<_, u64, _>)
            .verify(|(_, slot): &(u64, u64)| *slot < KIND_SLOT)
            .try_map(|(node, slot)| address::port(node, slot)),
    ))
    .parse_next(input)
}

fn node_line(input: &mut &str) -> ModalResult<(u64, Record)> {
    let id = terminated(dec_uint::<_, u64, _>, (space0, ':', space0)).parse_next(input)?;
    let kind = kind.parse_next(input)?;
    let mut wires = [UNSET; 3];
    for wire in &mut wires {
        *wire = preceded(space1, port).parse_next(input)?;
    }
    space0.parse_next(input)?;
    Ok((id, Record { wires, kind }))
}

fn parse_error(line: usize, message: impl ToString) -> Error {
    Malformed::Parse {
        line,
        message: message.to_string(),
    }
    .into()
}

pub fn parse_records(source: &str) -> Result<Vec<Record>> {
    let mut records = vec![];
    for (index, raw) in source.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let (id, record) = node_line
            .parse(line)
            .map_err(|error| parse_error(index + 1, error))?;
        if id != records.len() as u64 {
            return Err(parse_error(
                index + 1,
                format!("expected node {}, found node {}", records.len(), id),
            ));
        }
        records.push(record);
    }
    Ok(records)
}

/// Parses and validates a network the same way [`super::image::load`] does.
pub fn parse(source: &str, config: &EngineConfig) -> Result<Net> {
    let records = parse_records(source)?;
    let mut net = Net::new(Buffer::from_records(records, config.base, config.capacity)?);
    net.validate()?;
    net.seed_candidates();
    Ok(net)
}
