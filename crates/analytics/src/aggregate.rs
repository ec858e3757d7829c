//! The dashboard aggregate: every derived series for one roster.
//!
//! The aggregate is never persisted. It is recomputed from the roster on
//! demand, and its [`fingerprint`](DashboardAggregate::fingerprint) keys the
//! narrative cache.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use trustlens_core::{ClientField, ClientRecord};

use crate::distribution::{self, DistributionEntry};
use crate::financial::FinancialMetrics;
use crate::identity::{DEFAULT_CENTURY_CUTOFF, IdentityAgeResolver};
use crate::signups::{self, SignupPoint};

/// Inputs to aggregation besides the roster.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOptions {
    pub century_cutoff: u8,
    pub plan_name_prefixes: Vec<String>,
    /// "Today". Fixes the signup year and the age reference year.
    pub reference_date: NaiveDate,
}

impl AggregateOptions {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            century_cutoff: DEFAULT_CENTURY_CUTOFF,
            plan_name_prefixes: vec!["PruBSN".to_string()],
            reference_date,
        }
    }

    /// Options relative to the local date.
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    pub fn with_century_cutoff(mut self, cutoff: u8) -> Self {
        self.century_cutoff = cutoff;
        self
    }

    pub fn with_plan_name_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.plan_name_prefixes = prefixes;
        self
    }

    pub fn year(&self) -> i32 {
        self.reference_date.year()
    }

    pub fn resolver(&self) -> IdentityAgeResolver {
        IdentityAgeResolver::new(self.year()).with_century_cutoff(self.century_cutoff)
    }
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self::today()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAggregate {
    pub plan_distribution: Vec<DistributionEntry>,
    pub status_distribution: Vec<DistributionEntry>,
    pub payment_distribution: Vec<DistributionEntry>,
    pub age_distribution: Vec<DistributionEntry>,
    pub monthly_signups: Vec<SignupPoint>,
    pub financial: FinancialMetrics,
}

impl DashboardAggregate {
    pub fn compute(roster: &[ClientRecord], options: &AggregateOptions) -> Self {
        let aggregate = Self {
            plan_distribution: distribution::plan_distribution(
                roster,
                &options.plan_name_prefixes,
            ),
            status_distribution: distribution::distribution_by(roster, ClientField::Status),
            payment_distribution: distribution::distribution_by(
                roster,
                ClientField::PaymentMethod,
            ),
            age_distribution: distribution::age_distribution(roster, &options.resolver()),
            monthly_signups: signups::signup_series(roster, options.year()),
            financial: FinancialMetrics::summarize(roster),
        };
        tracing::debug!(
            records = roster.len(),
            plans = aggregate.plan_distribution.len(),
            aged = distribution::total(&aggregate.age_distribution),
            "Computed dashboard aggregate"
        );
        aggregate
    }

    /// Lowercase hex SHA-256 of the aggregate's JSON form.
    ///
    /// Any change anywhere in the aggregate changes the fingerprint.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&canonical))
    }

    pub fn is_empty(&self) -> bool {
        self.financial.record_count == 0
    }
}
