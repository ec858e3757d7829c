//! `trustlens dashboard`: the aggregate as text.

use trustlens_agent::Category;
use trustlens_analytics::{DistributionEntry, format_currency};

use super::{check_api_key, runtime};

fn print_distribution(title: &str, entries: &[DistributionEntry]) {
    println!("\n  {title}");
    if entries.is_empty() {
        println!("    (none)");
    }
    for entry in entries {
        println!("    {:<32} {:>6}", entry.name, entry.value);
    }
}

pub async fn run(narratives: bool) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = runtime()?;
    let aggregate = runtime.dashboard();
    let financial = &aggregate.financial;

    println!("📊 Dashboard");
    println!("============");
    println!("  Clients:             {}", financial.record_count);
    println!("  In Force:            {}", financial.active_count);
    println!("  Total outstanding:   {}", format_currency(financial.total_outstanding));
    println!("  Total installments:  {}", format_currency(financial.total_installments));
    println!(
        "  Average installment: {}",
        format_currency(financial.average_installment())
    );

    print_distribution("Plans", &aggregate.plan_distribution);
    print_distribution("Status", &aggregate.status_distribution);
    print_distribution("Payment methods", &aggregate.payment_distribution);
    print_distribution("Age groups", &aggregate.age_distribution);

    println!("\n  Monthly signups ({})", runtime.aggregate_options().year());
    for point in &aggregate.monthly_signups {
        println!("    {:<4} {:>6}", point.name, point.signups);
    }

    if narratives {
        check_api_key(runtime.config());
        let result = runtime.narratives().narratives(&aggregate).await;
        println!("\n💬 Narratives ({})", result.tier_name());
        for category in Category::ALL {
            if let Some(comment) = result.comment(category) {
                println!("  {}: {comment}", category.title());
            }
        }
    }

    Ok(())
}
