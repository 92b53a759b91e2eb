use std::time::Duration;

use indexmap::IndexMap;

use super::rewrite::Rule;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Rewrites {
    pub annihilate: u64,
    pub commute: u64,
    pub busy_duration: Duration,
}

impl core::ops::Add<Rewrites> for Rewrites {
    type Output = Rewrites;

    fn add(self, rhs: Rewrites) -> Self::Output {
        Self {
            annihilate: self.annihilate + rhs.annihilate,
            commute: self.commute + rhs.commute,
            busy_duration: self.busy_duration + rhs.busy_duration,
        }
    }
}

impl Rewrites {
    pub fn record(&mut self, rule: Rule) {
        match rule {
            Rule::Annihilate => self.annihilate += 1,
            Rule::Commute => self.commute += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.annihilate + self.commute
    }

    pub fn total_per_second(&self) -> u64 {
        let micros = self.busy_duration.as_micros();
        if micros == 0 {
            return 0;
        }
        (self.total() as u128 * 1_000_000 / micros) as u64
    }

    /// Counters in display order.
    pub fn counters(&self) -> IndexMap<&'static str, u64> {
        let mut counters = IndexMap::new();
        counters.insert(Rule::Annihilate.name(), self.annihilate);
        counters.insert(Rule::Commute.name(), self.commute);
        counters.insert("total", self.total());
        counters
    }

    pub fn show(&self) -> String {
        let mut out = String::new();
        for (name, count) in self.counters() {
            out.push_str(&format!("\t{}: {}\n", name, count));
        }
        out.push_str(&format!(
            "\tTime (ms): {}\n\tPer second: {}\n",
            self.busy_duration.as_millis(),
            self.total_per_second()
        ));
        out
    }
}
