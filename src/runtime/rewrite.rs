//! The two interaction rules of symmetric interaction combinators.
//!
//! Given an active pair `x ~ y`:
//!
//! ```text
//!  annihilation (same kind)          commutation (different kinds)
//!
//!   x1 ─┐       ┌─ y1                 x1 ─ a    b ─ y1      a, y copy y
//!       x ═════ y         ==>             │ ╲  ╱ │          b, x copy x
//!   x2 ─┘       └─ y2                 x2 ─ y    x ─ y2
//!
//!   x1 ── y1, x2 ── y2
//! ```
//!
//! Commutation reuses `x` and `y` as two of the four copies, so only two new
//! records are allocated per rewrite.

use super::address::port;
use super::codec::Kind;
use super::linker::Net;
use crate::error::{Malformed, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rule {
    Annihilate,
    Commute,
}

impl Rule {
    pub fn between(x: Kind, y: Kind) -> Self {
        if x == y {
            Self::Annihilate
        } else {
            Self::Commute
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Annihilate => "annihilate",
            Self::Commute => "commute",
        }
    }
}

impl Net {
    /// The rule that `x ~ y` would fire, after checking that it is an
    /// active pair whose auxiliary wires are all linked.
    pub fn classify(&self, x: u64, y: u64) -> Result<Rule> {
        if x == y || self.partner(x)? != Some(y) {
            return Err(Malformed::NotAnActivePair { x, y }.into());
        }
        for node in [x, y] {
            for slot in 1..3 {
                self.follow(port(node, slot)?)?;
            }
        }
        Ok(Rule::between(
            self.buffer.read_kind(x)?,
            self.buffer.read_kind(y)?,
        ))
    }

    /// Rewrites the active pair `x ~ y` and returns the rule that fired.
    ///
    /// Validation and the capacity check both happen before the first write,
    /// so a failed rewrite leaves the net as it was.
    pub fn rewrite(&mut self, x: u64, y: u64) -> Result<Rule> {
        let rule = self.classify(x, y)?;
        match rule {
            Rule::Annihilate => self.annihilate(x, y)?,
            Rule::Commute => self.commute(x, y)?,
        }
        Ok(rule)
    }

    fn annihilate(&mut self, x: u64, y: u64) -> Result<()> {
        let (x1, x2) = (port(x, 1)?, port(x, 2)?);
        let (y1, y2) = (port(y, 1)?, port(y, 2)?);

        let (a, b) = (self.enter(x1)?, self.enter(y1)?);
        self.link(a, b)?;
        let (a, b) = (self.enter(x2)?, self.enter(y2)?);
        self.link(a, b)?;

        self.retire(x)?;
        self.retire(y)
    }

    fn commute(&mut self, x: u64, y: u64) -> Result<()> {
        let kind_x = self.buffer.read_kind(x)?;
        let kind_y = self.buffer.read_kind(y)?;
        self.buffer.check_room(2)?;
        let a = self.alloc(kind_y)?;
        let b = self.alloc(kind_x)?;

        let (x0, x1, x2) = (port(x, 0)?, port(x, 1)?, port(x, 2)?);
        let (y0, y1, y2) = (port(y, 0)?, port(y, 1)?, port(y, 2)?);
        let (a0, a1, a2) = (port(a, 0)?, port(a, 1)?, port(a, 2)?);
        let (b0, b1, b2) = (port(b, 0)?, port(b, 1)?, port(b, 2)?);

        // x's neighbours meet copies of y, y's neighbours meet copies of x.
        // Each `enter` must observe the links made before it.
        let target = self.enter(x1)?;
        self.link(a0, target)?;
        let target = self.enter(x2)?;
        self.link(y0, target)?;
        let target = self.enter(y1)?;
        self.link(b0, target)?;
        let target = self.enter(y2)?;
        self.link(x0, target)?;

        self.link(b1, a1)?;
        self.link(b2, y1)?;
        self.link(x1, a2)?;
        self.link(x2, y2)
    }
}
