//! Page context: what the assistant knows about the page the user is on.
//!
//! Callers describe their page with typed [`PageFacts`]. The composer adds
//! the roster, always read fresh from the store at composition time, so the
//! assistant sees the latest committed state even when the caller's own
//! copy is stale.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use trustlens_analytics::financial::is_in_force;
use trustlens_analytics::{filter_clients, paginate, signups};
use trustlens_core::store::read_json;
use trustlens_core::{ClientField, ClientRecord, KeyValueStore, Roster, Scalar, StoreKey};

/// Records shown as recent activity on the dashboard.
pub const RECENT_ACTIVITY_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFacts {
    pub total_clients: usize,
    /// Case-insensitive "in force" count.
    pub active_clients: usize,
    /// Records commencing in the current month, any year.
    pub monthly_signups: u64,
    pub recent_activity: Vec<ClientRecord>,
}

impl DashboardFacts {
    pub fn from_roster(roster: &[ClientRecord], today: NaiveDate) -> Self {
        Self {
            total_clients: roster.len(),
            active_clients: roster.iter().filter(|r| is_in_force(r)).count(),
            monthly_signups: signups::count_in_month(roster, today.month()),
            recent_activity: roster.iter().take(RECENT_ACTIVITY_LEN).cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub active: usize,
    pub inactive: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientsFacts {
    pub total_clients: usize,
    pub filtered_clients: usize,
    pub current_page: usize,
    pub items_per_page: usize,
    pub search_query: String,
    pub status_distribution: StatusCounts,
}

impl ClientsFacts {
    pub fn from_roster(roster: &[ClientRecord], query: &str, page: usize, page_size: usize) -> Self {
        let status_is = |r: &&ClientRecord, wanted: &str| {
            r.get(ClientField::Status)
                .is_some_and(|s| s.as_text().to_lowercase() == wanted)
        };
        let filtered_clients = filter_clients(roster, query).len();
        let pagination = paginate(filtered_clients, page, page_size);
        Self {
            total_clients: roster.len(),
            filtered_clients,
            current_page: pagination.current_page,
            items_per_page: pagination.items_per_page,
            search_query: query.to_string(),
            status_distribution: StatusCounts {
                active: roster.iter().filter(|r| status_is(r, "active")).count(),
                inactive: roster.iter().filter(|r| status_is(r, "inactive")).count(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistory {
    pub total_paid: Option<Scalar>,
    pub outstanding_amount: Option<Scalar>,
    pub status: Option<Scalar>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDetails {
    pub name: Option<Scalar>,
    pub commenced_date: Option<Scalar>,
    pub no_lapse_provision: Option<Scalar>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetailsFacts {
    pub client: ClientRecord,
    pub payment_history: PaymentHistory,
    pub plan_details: PlanDetails,
}

impl ClientDetailsFacts {
    pub fn for_client(client: &ClientRecord) -> Self {
        Self {
            payment_history: PaymentHistory {
                total_paid: client.paid_count.clone(),
                outstanding_amount: client.outstanding.clone(),
                status: client.status.clone(),
            },
            plan_details: PlanDetails {
                name: client.plan_name.clone(),
                commenced_date: client.commenced_date.clone(),
                no_lapse_provision: client.no_lapse_provision.clone(),
            },
            client: client.clone(),
        }
    }
}

/// Page-specific facts. The variant is the page name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pageName", content = "data", rename_all = "kebab-case")]
pub enum PageFacts {
    Dashboard(DashboardFacts),
    Clients(ClientsFacts),
    ClientDetails(ClientDetailsFacts),
}

impl PageFacts {
    pub fn page_name(&self) -> &'static str {
        match self {
            PageFacts::Dashboard(_) => "dashboard",
            PageFacts::Clients(_) => "clients",
            PageFacts::ClientDetails(_) => "client-details",
        }
    }
}

/// An immutable snapshot consumed by the prompt composer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    #[serde(flatten)]
    pub facts: PageFacts,
    /// The roster as stored when the context was composed; `None` when no
    /// roster has been loaded.
    pub clients: Option<Roster>,
}

impl PageContext {
    pub fn page_name(&self) -> &'static str {
        self.facts.page_name()
    }
}

pub struct PageContextComposer {
    store: Arc<dyn KeyValueStore>,
}

impl PageContextComposer {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Pair `facts` with the roster as currently stored.
    pub fn compose(&self, facts: PageFacts) -> PageContext {
        let clients = match read_json::<Roster>(self.store.as_ref(), StoreKey::Roster) {
            Ok(clients) => clients,
            Err(e) => {
                warn!(error = %e, page = facts.page_name(), "Failed to read roster for page context");
                None
            }
        };
        PageContext { facts, clients }
    }
}
