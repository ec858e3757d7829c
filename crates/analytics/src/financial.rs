//! Roster-wide financial totals.

use serde::{Deserialize, Serialize};
use trustlens_core::{ClientField, ClientRecord};

use crate::amount::parse_amount;

/// The status label that marks a policy as active.
pub const IN_FORCE: &str = "In Force";

/// Case-insensitive "in force" match.
pub fn is_in_force(record: &ClientRecord) -> bool {
    record
        .get(ClientField::Status)
        .is_some_and(|s| s.as_text().to_lowercase() == IN_FORCE.to_lowercase())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetrics {
    pub total_outstanding: f64,
    pub total_installments: f64,
    pub active_count: u64,
    pub record_count: u64,
}

impl FinancialMetrics {
    /// Single pass over the roster.
    pub fn summarize(roster: &[ClientRecord]) -> Self {
        roster.iter().fold(Self::default(), |mut acc, record| {
            acc.total_outstanding += parse_amount(record.get(ClientField::Outstanding));
            acc.total_installments += parse_amount(record.get(ClientField::Installment));
            if is_in_force(record) {
                acc.active_count += 1;
            }
            acc.record_count += 1;
            acc
        })
    }

    /// Mean installment; 0 for an empty roster.
    pub fn average_installment(&self) -> f64 {
        if self.record_count == 0 {
            0.0
        } else {
            self.total_installments / self.record_count as f64
        }
    }
}
