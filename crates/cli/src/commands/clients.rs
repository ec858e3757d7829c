//! `trustlens clients` and `trustlens client`: browse the roster.

use trustlens_analytics::{filter_clients, find_by_cert, paginate};
use trustlens_core::{ClientField, ClientRecord};

use super::runtime;

fn cell(record: &ClientRecord, field: ClientField) -> String {
    record.text(field).unwrap_or_else(|| "-".into())
}

pub fn list(query: &str, page: usize) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = runtime()?;
    let roster = runtime.roster().snapshot();
    let filtered = filter_clients(&roster, query);
    let pagination = paginate(filtered.len(), page, runtime.config().analytics.page_size);

    if query.is_empty() {
        println!("👥 Clients ({} total)", roster.len());
    } else {
        println!(
            "🔍 Clients matching \"{query}\" ({} of {})",
            filtered.len(),
            roster.len()
        );
    }

    for record in &filtered[pagination.start..pagination.end] {
        println!(
            "  {:<12} {:<28} {:<12} {}",
            cell(record, ClientField::CertNumber),
            cell(record, ClientField::PlanName),
            cell(record, ClientField::Status),
            cell(record, ClientField::PaymentMethod),
        );
    }

    if pagination.total_pages > 1 {
        let window: Vec<String> = pagination
            .window
            .iter()
            .map(|p| {
                if *p == pagination.current_page {
                    format!("[{p}]")
                } else {
                    p.to_string()
                }
            })
            .collect();
        println!(
            "\n  Page {} of {}: {}",
            pagination.current_page,
            pagination.total_pages,
            window.join(" ")
        );
    }

    Ok(())
}

pub fn show(cert: &str) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = runtime()?;
    let roster = runtime.roster().snapshot();
    let record = find_by_cert(&roster, cert).ok_or_else(|| format!("No client with certificate number {cert}"))?;

    println!("🧾 Client {}", cell(record, ClientField::CertNumber));
    for field in ClientField::ALL {
        if let Some(value) = record.text(field) {
            println!("  {:<24} {value}", field.column());
        }
    }
    for (column, value) in &record.extra {
        println!("  {column:<24} {value}");
    }

    Ok(())
}
