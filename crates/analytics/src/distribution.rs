//! Category histograms over the roster.
//!
//! Plan, status, and payment distributions count every record exactly once,
//! using [`UNKNOWN_LABEL`] for a missing field. The age distribution excludes
//! records without a resolvable age.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use trustlens_core::{ClientField, ClientRecord};

use crate::identity::{AgeBucket, IdentityAgeResolver};

pub const UNKNOWN_LABEL: &str = "Unknown";

/// One `{label, count}` pair of a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub name: String,
    pub value: u64,
}

/// Insertion-ordered label counter.
#[derive(Debug, Default)]
pub struct Tally {
    entries: Vec<DistributionEntry>,
    index: HashMap<String, usize>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str) {
        match self.index.get(label) {
            Some(&i) => self.entries[i].value += 1,
            None => {
                self.index.insert(label.to_string(), self.entries.len());
                self.entries.push(DistributionEntry {
                    name: label.to_string(),
                    value: 1,
                });
            }
        }
    }

    pub fn into_entries(self) -> Vec<DistributionEntry> {
        self.entries
    }
}

/// Count records by an arbitrary label, in first-seen order.
pub fn distribution_with<F>(roster: &[ClientRecord], label: F) -> Vec<DistributionEntry>
where
    F: Fn(&ClientRecord) -> Option<String>,
{
    let mut tally = Tally::new();
    for record in roster {
        match label(record) {
            Some(l) => tally.add(&l),
            None => tally.add(UNKNOWN_LABEL),
        }
    }
    tally.into_entries()
}

/// Count records by a field's text.
pub fn distribution_by(roster: &[ClientRecord], field: ClientField) -> Vec<DistributionEntry> {
    distribution_with(roster, |r| r.text(field))
}

/// Remove every occurrence of each prefix (and the whitespace after it).
pub fn clean_plan_name(name: &str, prefixes: &[String]) -> String {
    let mut cleaned = name.to_string();
    for prefix in prefixes.iter().filter(|p| !p.is_empty()) {
        let mut out = String::with_capacity(cleaned.len());
        let mut rest = cleaned.as_str();
        while let Some(pos) = rest.find(prefix.as_str()) {
            out.push_str(&rest[..pos]);
            rest = rest[pos + prefix.len()..].trim_start();
        }
        out.push_str(rest);
        cleaned = out;
    }
    cleaned.trim().to_string()
}

/// Plan distribution with vendor prefixes stripped from labels.
pub fn plan_distribution(roster: &[ClientRecord], prefixes: &[String]) -> Vec<DistributionEntry> {
    distribution_with(roster, |r| {
        let plan = r.text(ClientField::PlanName)?;
        Some(clean_plan_name(&plan, prefixes))
    })
}

/// Age-bucket distribution, sorted by each bucket's lower bound.
pub fn age_distribution(
    roster: &[ClientRecord],
    resolver: &IdentityAgeResolver,
) -> Vec<DistributionEntry> {
    let mut tally = Tally::new();
    for record in roster {
        if let Some(age) = resolver.age(record.get(ClientField::IdentityCode)) {
            tally.add(AgeBucket::for_age(age).label());
        }
    }
    let mut entries = tally.into_entries();
    entries.sort_by_key(|e| AgeBucket::from_label(&e.name).map(|b| b.lower_bound()));
    entries
}

/// Largest bucket; the first one wins on ties.
pub fn largest(entries: &[DistributionEntry]) -> Option<&DistributionEntry> {
    entries
        .iter()
        .fold(None, |best: Option<&DistributionEntry>, e| match best {
            Some(b) if b.value >= e.value => Some(b),
            _ => Some(e),
        })
}

pub fn total(entries: &[DistributionEntry]) -> u64 {
    entries.iter().map(|e| e.value).sum()
}

/// Count under an exact label, 0 when absent.
pub fn count_of(entries: &[DistributionEntry], label: &str) -> u64 {
    entries
        .iter()
        .find(|e| e.name == label)
        .map(|e| e.value)
        .unwrap_or(0)
}
