//! Client record domain types.
//!
//! A [`ClientRecord`] is one row of the roster as normalized by the upload
//! collaborator. Rows are never rejected for having an unexpected type in a
//! field: every cell is an optional [`Scalar`], and unknown columns are kept
//! verbatim in `extra`.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The full ordered set of client records currently loaded.
pub type Roster = Vec<ClientRecord>;

/// A single spreadsheet cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl Scalar {
    /// The value as a string, the way a spreadsheet would print it.
    pub fn as_text(&self) -> String {
        self.to_string()
    }

    /// Text form with surrounding whitespace removed, or `None` when blank.
    pub fn non_blank(&self) -> Option<String> {
        let text = self.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Largest integer an f64 represents exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

fn is_integral(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_EXACT_INT
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) if is_integral(*n) => write!(f, "{}", *n as i64),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Flag(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n as f64)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Text(s) => serializer.serialize_str(s),
            Scalar::Number(n) if is_integral(*n) => serializer.serialize_i64(*n as i64),
            Scalar::Number(n) => serializer.serialize_f64(*n),
            Scalar::Flag(b) => serializer.serialize_bool(*b),
        }
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::String(s) => Scalar::Text(s),
            serde_json::Value::Number(n) => Scalar::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::Bool(b) => Scalar::Flag(b),
            serde_json::Value::Null => Scalar::Text(String::new()),
            // Nested cells should not happen, but a row is never rejected for them.
            other => Scalar::Text(other.to_string()),
        })
    }
}

/// One client row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    #[serde(rename = "Cert Number", default, skip_serializing_if = "Option::is_none")]
    pub cert_number: Option<Scalar>,

    #[serde(rename = "Plan Name", default, skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<Scalar>,

    #[serde(rename = "Participant Name", default, skip_serializing_if = "Option::is_none")]
    pub participant_name: Option<Scalar>,

    #[serde(rename = "Person Covered", default, skip_serializing_if = "Option::is_none")]
    pub person_covered: Option<Scalar>,

    /// Identity code; the first six characters encode the birth date as YYMMDD.
    #[serde(rename = "New IC", default, skip_serializing_if = "Option::is_none")]
    pub identity_code: Option<Scalar>,

    #[serde(rename = "Commenced Date", default, skip_serializing_if = "Option::is_none")]
    pub commenced_date: Option<Scalar>,

    #[serde(rename = "Cont Installment", default, skip_serializing_if = "Option::is_none")]
    pub installment: Option<Scalar>,

    #[serde(rename = "Payment Method", default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<Scalar>,

    /// Next contribution due date.
    #[serde(rename = "NCDD", default, skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<Scalar>,

    #[serde(rename = "Outst Cont", default, skip_serializing_if = "Option::is_none")]
    pub outstanding: Option<Scalar>,

    #[serde(rename = "Paid Contribution Count", default, skip_serializing_if = "Option::is_none")]
    pub paid_count: Option<Scalar>,

    #[serde(rename = "Total Tabarru Debt", default, skip_serializing_if = "Option::is_none")]
    pub tabarru_debt: Option<Scalar>,

    #[serde(rename = "No Lapse Provision", default, skip_serializing_if = "Option::is_none")]
    pub no_lapse_provision: Option<Scalar>,

    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Scalar>,

    #[serde(rename = "Discontinue Date", default, skip_serializing_if = "Option::is_none")]
    pub discontinue_date: Option<Scalar>,

    #[serde(rename = "Agent Code", default, skip_serializing_if = "Option::is_none")]
    pub agent_code: Option<Scalar>,

    /// Columns the upload service produced that have no dedicated field.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Named field selector over a [`ClientRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientField {
    CertNumber,
    PlanName,
    ParticipantName,
    PersonCovered,
    IdentityCode,
    CommencedDate,
    Installment,
    PaymentMethod,
    NextDueDate,
    Outstanding,
    PaidCount,
    TabarruDebt,
    NoLapseProvision,
    Status,
    DiscontinueDate,
    AgentCode,
}

impl ClientField {
    pub const ALL: [ClientField; 16] = [
        ClientField::CertNumber,
        ClientField::PlanName,
        ClientField::ParticipantName,
        ClientField::PersonCovered,
        ClientField::IdentityCode,
        ClientField::CommencedDate,
        ClientField::Installment,
        ClientField::PaymentMethod,
        ClientField::NextDueDate,
        ClientField::Outstanding,
        ClientField::PaidCount,
        ClientField::TabarruDebt,
        ClientField::NoLapseProvision,
        ClientField::Status,
        ClientField::DiscontinueDate,
        ClientField::AgentCode,
    ];

    /// The column name used by the upload service.
    pub fn column(&self) -> &'static str {
        match self {
            ClientField::CertNumber => "Cert Number",
            ClientField::PlanName => "Plan Name",
            ClientField::ParticipantName => "Participant Name",
            ClientField::PersonCovered => "Person Covered",
            ClientField::IdentityCode => "New IC",
            ClientField::CommencedDate => "Commenced Date",
            ClientField::Installment => "Cont Installment",
            ClientField::PaymentMethod => "Payment Method",
            ClientField::NextDueDate => "NCDD",
            ClientField::Outstanding => "Outst Cont",
            ClientField::PaidCount => "Paid Contribution Count",
            ClientField::TabarruDebt => "Total Tabarru Debt",
            ClientField::NoLapseProvision => "No Lapse Provision",
            ClientField::Status => "Status",
            ClientField::DiscontinueDate => "Discontinue Date",
            ClientField::AgentCode => "Agent Code",
        }
    }
}

impl ClientRecord {
    /// Raw cell for a field.
    pub fn get(&self, field: ClientField) -> Option<&Scalar> {
        match field {
            ClientField::CertNumber => self.cert_number.as_ref(),
            ClientField::PlanName => self.plan_name.as_ref(),
            ClientField::ParticipantName => self.participant_name.as_ref(),
            ClientField::PersonCovered => self.person_covered.as_ref(),
            ClientField::IdentityCode => self.identity_code.as_ref(),
            ClientField::CommencedDate => self.commenced_date.as_ref(),
            ClientField::Installment => self.installment.as_ref(),
            ClientField::PaymentMethod => self.payment_method.as_ref(),
            ClientField::NextDueDate => self.next_due_date.as_ref(),
            ClientField::Outstanding => self.outstanding.as_ref(),
            ClientField::PaidCount => self.paid_count.as_ref(),
            ClientField::TabarruDebt => self.tabarru_debt.as_ref(),
            ClientField::NoLapseProvision => self.no_lapse_provision.as_ref(),
            ClientField::Status => self.status.as_ref(),
            ClientField::DiscontinueDate => self.discontinue_date.as_ref(),
            ClientField::AgentCode => self.agent_code.as_ref(),
        }
    }

    /// Non-blank text of a field, trimmed.
    pub fn text(&self, field: ClientField) -> Option<String> {
        self.get(field).and_then(Scalar::non_blank)
    }

    /// Text form of every populated cell, dedicated fields first, then extras
    /// in column order.
    pub fn cell_texts(&self) -> Vec<String> {
        let mut out: Vec<String> = ClientField::ALL
            .iter()
            .filter_map(|f| self.get(*f).map(Scalar::as_text))
            .collect();
        out.extend(self.extra.values().map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }));
        out
    }
}
