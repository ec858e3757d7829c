//! System prompt rendering.
//!
//! [`compose`] is a pure function of the [`PageContext`]: the same context
//! always renders byte-identical text.

use trustlens_analytics::financial::IN_FORCE;
use trustlens_analytics::{format_currency, parse_amount};
use trustlens_core::{ClientField, ClientRecord};

use crate::context::{ClientDetailsFacts, PageContext, PageFacts};

pub const NO_CLIENT_DATA: &str = "No client data available.";
const NOT_AVAILABLE: &str = "Not available";

const BASE_PROMPT: &str = "\
You are an AI assistant for an Excel Trust Management application.
Your role is to help users understand and analyze their client data.
Always be professional, concise, and data-focused in your responses.
Format numbers appropriately and use bullet points for lists.

Important Terminology:
• \"In Force\" status represents active clients
• \"Outst Cont\" refers to Outstanding Contribution
• \"Cont Installment\" means Contribution Installment
• \"NCDD\" stands for Next Contribution Due Date
• \"Tabarru\" is a type of contribution in Islamic finance

Available Client Data Fields:
• Cert Number - Unique certificate number for each client
• Plan Name - The insurance plan name
• Status - Client status (e.g., \"In Force\", \"Lapsed\")
• Payment Method - How the client makes payments
• New IC - Client's identification number
• Paid Contribution Count - Number of contributions paid
• Outst Cont - Outstanding contribution amount
• NCDD - Next contribution due date
• Total Tabarru Debt - Total Tabarru debt amount
• Cont Installment - Contribution installment amount
• Commenced Date - Date when the client signed up";

const DASHBOARD_TOPICS: &str = "\
You have access to detailed client data. Help the user understand these metrics and provide insights about:
• Client distribution across different plans
• Payment method preferences
• Outstanding contributions and Tabarru debt analysis
• Client status distribution
• Monthly signup trends";

const CLIENT_TOPICS: &str = "\
Help the user understand this client's:
• Current status and payment history
• Outstanding payments and due dates
• Plan details and payment schedule
• Tabarru debt status";

const CLIENTS_TOPICS: &str = "\
You can help users:
• Search and filter clients
• Analyze client distribution
• Understand payment patterns
• Track client status changes
• Identify trends in the client base";

/// Roster statistics quoted in the dashboard and client-list prompts.
#[derive(Debug, Clone, PartialEq)]
struct RosterStats {
    total_clients: usize,
    /// Exact, case-sensitive "In Force" matches.
    in_force_clients: usize,
    plan_types: Vec<String>,
    payment_methods: Vec<String>,
    total_outstanding: f64,
    total_tabarru_debt: f64,
}

impl RosterStats {
    fn from_roster(roster: &[ClientRecord]) -> Self {
        Self {
            total_clients: roster.len(),
            in_force_clients: roster
                .iter()
                .filter(|r| r.get(ClientField::Status).is_some_and(|s| s.as_text() == IN_FORCE))
                .count(),
            plan_types: distinct(roster, ClientField::PlanName),
            payment_methods: distinct(roster, ClientField::PaymentMethod),
            total_outstanding: roster
                .iter()
                .map(|r| parse_amount(r.get(ClientField::Outstanding)))
                .sum(),
            total_tabarru_debt: roster
                .iter()
                .map(|r| parse_amount(r.get(ClientField::TabarruDebt)))
                .sum(),
        }
    }
}

/// Distinct non-blank values of `field`, in first-seen order.
fn distinct(roster: &[ClientRecord], field: ClientField) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in roster.iter().filter_map(|r| r.text(field)) {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

fn cell(client: &ClientRecord, field: ClientField) -> String {
    client
        .text(field)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn amount(client: &ClientRecord, field: ClientField) -> String {
    format_currency(parse_amount(client.get(field)))
}

/// Render the system prompt for `context`.
pub fn compose(context: &PageContext) -> String {
    let mut prompt = format!("{BASE_PROMPT}\n\nCurrent page: {}\n", context.page_name());
    let stats = context.clients.as_deref().map(RosterStats::from_roster);

    match &context.facts {
        PageFacts::Dashboard(_) => match stats {
            Some(stats) => render_dashboard(&mut prompt, &stats),
            None => prompt.push_str(NO_CLIENT_DATA),
        },
        PageFacts::Clients(_) => match stats {
            Some(stats) => render_clients(&mut prompt, &stats),
            None => prompt.push_str(NO_CLIENT_DATA),
        },
        PageFacts::ClientDetails(details) => render_client_details(&mut prompt, details),
    }
    prompt
}

fn render_dashboard(out: &mut String, stats: &RosterStats) {
    out.push_str(&format!(
        "\nCurrent Client Statistics:\n\
         • Total Clients: {}\n\
         • In Force Clients: {}\n\
         • Available Plan Types: {}\n\
         • Payment Methods: {}\n\
         • Total Outstanding: {}\n\
         • Total Tabarru Debt: {}\n\n{DASHBOARD_TOPICS}",
        stats.total_clients,
        stats.in_force_clients,
        stats.plan_types.join(", "),
        stats.payment_methods.join(", "),
        format_currency(stats.total_outstanding),
        format_currency(stats.total_tabarru_debt),
    ));
}

fn render_clients(out: &mut String, stats: &RosterStats) {
    out.push_str(&format!(
        "\nClient Overview:\n\
         • Total Clients: {}\n\
         • In Force Clients: {}\n\
         • Available Plans: {}\n\
         • Payment Methods: {}\n\n{CLIENTS_TOPICS}",
        stats.total_clients,
        stats.in_force_clients,
        stats.plan_types.join(", "),
        stats.payment_methods.join(", "),
    ));
}

fn render_client_details(out: &mut String, details: &ClientDetailsFacts) {
    let client = &details.client;
    out.push_str(&format!(
        "\nViewing client with:\n\
         • Certificate Number: {}\n\
         • Plan Name: {}\n\
         • New IC: {}\n\
         • Status: {}\n\
         • Payment Method: {}\n\
         • Payment Progress: {} payments made\n\
         • Outstanding Contribution: {}\n\
         • Next Contribution Due Date: {}\n\
         • Total Tabarru Debt: {}\n\
         • Contribution Installment: {}\n\
         • Commenced Date: {}\n\n{CLIENT_TOPICS}",
        cell(client, ClientField::CertNumber),
        cell(client, ClientField::PlanName),
        cell(client, ClientField::IdentityCode),
        cell(client, ClientField::Status),
        cell(client, ClientField::PaymentMethod),
        cell(client, ClientField::PaidCount),
        amount(client, ClientField::Outstanding),
        cell(client, ClientField::NextDueDate),
        amount(client, ClientField::TabarruDebt),
        amount(client, ClientField::Installment),
        cell(client, ClientField::CommencedDate),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ClientsFacts, DashboardFacts};
    use crate::test_helpers::sample_roster;
    use chrono::NaiveDate;
    use trustlens_core::Scalar;

    fn dashboard(clients: Option<Vec<ClientRecord>>) -> PageContext {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        PageContext {
            facts: PageFacts::Dashboard(DashboardFacts::from_roster(&sample_roster(), today)),
            clients,
        }
    }

    #[test]
    fn identical_context_renders_identical_text() {
        let a = compose(&dashboard(Some(sample_roster())));
        let b = compose(&dashboard(Some(sample_roster())));
        assert_eq!(a, b);
    }

    #[test]
    fn dashboard_statistics() {
        let mut roster = sample_roster();
        roster[0].tabarru_debt = Some(Scalar::from("RM 1,234.50"));
        roster.push(ClientRecord {
            plan_name: Some("Test Plan 1".into()),
            status: Some("In Force".into()),
            ..Default::default()
        });
        roster.push(ClientRecord {
            status: Some("in force".into()),
            ..Default::default()
        });

        let prompt = compose(&dashboard(Some(roster)));
        assert!(prompt.contains("Current page: dashboard"));
        assert!(prompt.contains("• Total Clients: 4"));
        // Only the exact label counts here.
        assert!(prompt.contains("• In Force Clients: 1"));
        assert!(prompt.contains("• Available Plan Types: Test Plan 1, Test Plan 2\n"));
        assert!(prompt.contains("• Payment Methods: Cash, Bank Transfer\n"));
        assert!(prompt.contains("• Total Outstanding: RM2,500.00"));
        assert!(prompt.contains("• Total Tabarru Debt: RM1,234.50"));
        assert!(prompt.ends_with("• Monthly signup trends"));
    }

    #[test]
    fn glossary_is_always_present() {
        let prompt = compose(&dashboard(None));
        assert!(prompt.starts_with("You are an AI assistant"));
        assert!(prompt.contains("\"Outst Cont\" refers to Outstanding Contribution"));
        assert!(prompt.contains("\"NCDD\" stands for Next Contribution Due Date"));
        assert!(prompt.contains("\"Tabarru\" is a type of contribution in Islamic finance"));
    }

    #[test]
    fn missing_roster_says_so() {
        let prompt = compose(&dashboard(None));
        assert!(prompt.ends_with("Current page: dashboard\nNo client data available."));

        let clients = PageContext {
            facts: PageFacts::Clients(ClientsFacts::from_roster(&[], "", 1, 10)),
            clients: None,
        };
        assert!(compose(&clients).ends_with(NO_CLIENT_DATA));
    }

    #[test]
    fn client_list_overview() {
        let context = PageContext {
            facts: PageFacts::Clients(ClientsFacts::from_roster(&sample_roster(), "", 1, 10)),
            clients: Some(sample_roster()),
        };
        let prompt = compose(&context);
        assert!(prompt.contains("Current page: clients"));
        assert!(prompt.contains("Client Overview:"));
        assert!(prompt.contains("• Available Plans: Test Plan 1, Test Plan 2"));
        assert!(!prompt.contains("Total Outstanding"));
    }

    #[test]
    fn client_details_fields() {
        let mut client = sample_roster().remove(0);
        client.paid_count = Some(Scalar::Number(7.0));
        client.next_due_date = Some("2025-07-01".into());
        let context = PageContext {
            facts: PageFacts::ClientDetails(ClientDetailsFacts::for_client(&client)),
            clients: Some(sample_roster()),
        };
        let prompt = compose(&context);
        assert!(prompt.contains("Current page: client-details"));
        assert!(prompt.contains("• Certificate Number: 1001"));
        assert!(prompt.contains("• New IC: 901212012345"));
        assert!(prompt.contains("• Payment Progress: 7 payments made"));
        assert!(prompt.contains("• Outstanding Contribution: RM1,000.00"));
        assert!(prompt.contains("• Total Tabarru Debt: RM0.00"));
        assert!(prompt.contains("• Contribution Installment: RM500.00"));
        assert!(prompt.contains("• Commenced Date: Not available"));
    }
}
