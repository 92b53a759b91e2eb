//! A reducer for *symmetric interaction combinators*.
//!
//! A network is a graph of nodes with three ports each: one principal port
//! and two auxiliary ports. Nodes carry a kind (`era`, `con` or `fan`). When
//! two nodes are connected through their principal ports they form an
//! *active pair*, and exactly one rule applies: nodes of the same kind
//! annihilate, nodes of different kinds commute. A network with no active
//! pair is in normal form.
//!
//! Everything lives in one flat, growth-only buffer of fixed-size records,
//! addressed by arithmetic on node ids and port numbers ([`address`]). Records
//! are plain structs here ([`codec::Record`]), but they pack into the same
//! 256-bit words the host uses for its byte image ([`image`]).
//!
//! Consumed nodes are never reclaimed. An annihilated node keeps its record
//! with the principal field set to [`codec::RETIRED`]; a commuted pair is
//! recycled as two of the four copies the rule needs.
//!
//! The entry point for a host is [`run`], which takes an image and a budget
//! and hands back the final image along with a [`Status`].

pub mod address;
pub mod arena;
pub mod codec;
pub mod image;
pub mod linker;
pub mod parse;
pub mod reducer;
pub mod rewrite;
pub mod show;
pub mod stats;

use std::fmt;

pub use linker::Net;
pub use reducer::{Halt, Reducer};
pub use stats::Rewrites;

use crate::config::EngineConfig;
use crate::error::{Error, Malformed};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    NormalForm,
    /// The returned image can be run again with a fresh budget.
    BudgetExhausted,
    MalformedGraph(Malformed),
    OutOfMemory,
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::MalformedGraph(_) | Self::OutOfMemory)
    }
}

impl From<Halt> for Status {
    fn from(halt: Halt) -> Self {
        match halt {
            Halt::NormalForm => Self::NormalForm,
            Halt::BudgetExhausted => Self::BudgetExhausted,
        }
    }
}

impl From<Error> for Status {
    fn from(error: Error) -> Self {
        match error {
            Error::MalformedGraph(reason) => Self::MalformedGraph(reason),
            Error::OutOfMemory { .. } => Self::OutOfMemory,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NormalForm => write!(f, "normal form"),
            Self::BudgetExhausted => write!(f, "budget exhausted"),
            Self::MalformedGraph(reason) => write!(f, "malformed graph: {}", reason),
            Self::OutOfMemory => write!(f, "out of memory"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Outcome {
    /// The final image; the input itself when it could not be loaded.
    pub bytes: Vec<u8>,
    pub status: Status,
    /// The first error, with its details, when `status` is an error.
    pub error: Option<Error>,
    pub rewrites: Rewrites,
    pub budget_left: u64,
}

/// Reduces an image until it reaches normal form, the budget runs out, or
/// an error stops it. On error, the image reflects the last rewrite that
/// completed.
pub fn run(bytes: &[u8], budget: u64, config: &EngineConfig) -> Outcome {
    let mut net = match image::load(bytes, config) {
        Ok(net) => net,
        Err(error) => {
            return Outcome {
                bytes: bytes.to_vec(),
                status: error.clone().into(),
                error: Some(error),
                rewrites: Rewrites::default(),
                budget_left: budget,
            }
        }
    };

    let mut reducer = Reducer::new(&mut net, config.costs, budget);
    let result = reducer.reduce();
    let (rewrites, budget_left) = reducer.finish();

    let (status, error) = match result {
        Ok(halt) => (halt.into(), None),
        Err(error) => (error.clone().into(), Some(error)),
    };
    Outcome {
        bytes: image::store(&net.buffer),
        status,
        error,
        rewrites,
        budget_left,
    }
}
