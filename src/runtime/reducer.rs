use std::time::Instant;

use tracing::{debug, trace};

use super::linker::Net;
use super::rewrite::Rule;
use super::stats::Rewrites;
use crate::config::Costs;
use crate::error::Result;

/// Why reduction stopped without an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Halt {
    NormalForm,
    /// An active pair is pending but the budget cannot pay for it.
    BudgetExhausted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Fired { rule: Rule, x: u64, y: u64 },
    Halted(Halt),
}

/// Drives a [`Net`] towards normal form, one verified active pair at a time,
/// lowest node id first.
pub struct Reducer<'n> {
    net: &'n mut Net,
    costs: Costs,
    budget: u64,
    pub rewrites: Rewrites,
}

impl<'n> Reducer<'n> {
    pub fn new(net: &'n mut Net, costs: Costs, budget: u64) -> Self {
        Self {
            net,
            costs,
            budget,
            rewrites: Rewrites::default(),
        }
    }

    pub fn budget(&self) -> u64 {
        self.budget
    }

    pub fn net(&self) -> &Net {
        &*self.net
    }

    /// Pops candidates until one heads an active pair. Candidates that no
    /// longer do are dropped.
    fn next_redex(&mut self) -> Result<Option<(u64, u64)>> {
        while let Some(node) = self.net.pop_candidate() {
            if let Some(partner) = self.net.partner(node)? {
                return Ok(Some((node, partner)));
            }
        }
        Ok(None)
    }

    pub fn step(&mut self) -> Result<Step> {
        let Some((x, y)) = self.next_redex()? else {
            return Ok(Step::Halted(Halt::NormalForm));
        };
        let rule = self.net.classify(x, y)?;
        let cost = self.costs.of(rule);
        if cost > self.budget {
            self.net.push_candidate(x);
            return Ok(Step::Halted(Halt::BudgetExhausted));
        }

        self.net.rewrite(x, y)?;
        self.budget -= cost;
        self.rewrites.record(rule);
        trace!("{} {} ~ {}, budget left {}", rule.name(), x, y, self.budget);
        Ok(Step::Fired { rule, x, y })
    }

    pub fn reduce(&mut self) -> Result<Halt> {
        debug!(
            "Reducing {} nodes with budget {}",
            self.net.buffer.count(),
            self.budget
        );
        let start = Instant::now();
        let result = loop {
            match self.step() {
                Ok(Step::Fired { .. }) => continue,
                Ok(Step::Halted(halt)) => break Ok(halt),
                Err(error) => break Err(error),
            }
        };
        self.rewrites.busy_duration += start.elapsed();
        debug!(
            "Stopped with {:?} after {} rewrites, {} nodes",
            result,
            self.rewrites.total(),
            self.net.buffer.count()
        );
        result
    }

    pub fn finish(self) -> (Rewrites, u64) {
        (self.rewrites, self.budget)
    }
}
