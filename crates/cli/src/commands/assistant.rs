//! `trustlens ask` and `trustlens history`: the assistant conversation.

use trustlens_agent::PageRequest;
use trustlens_core::Role;

use super::{check_api_key, runtime};
use crate::Page;

fn page_request(page: Page, cert: Option<String>, query: String) -> Result<PageRequest, String> {
    match page {
        Page::Dashboard => Ok(PageRequest::Dashboard),
        Page::Clients => Ok(PageRequest::Clients { query, page: 1 }),
        Page::ClientDetails => cert
            .map(|cert| PageRequest::ClientDetails { cert })
            .ok_or_else(|| "--cert is required for the client-details page".to_string()),
    }
}

pub async fn ask(
    message: &str,
    page: Page,
    cert: Option<String>,
    query: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = runtime()?;
    check_api_key(runtime.config());

    let request = page_request(page, cert, query)?;
    let context = runtime.page_context(&request)?;
    let permit = runtime
        .conversation()
        .try_acquire()
        .ok_or("Another message is already being processed")?;

    let reply = permit.send(message, &context).await;
    println!("\n🤖 {}\n", reply.content);

    Ok(())
}

pub fn history(clear: bool) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = runtime()?;
    let conversation = runtime.conversation();

    if clear {
        conversation.clear();
        println!("🗑️  Conversation cleared.");
        return Ok(());
    }

    let messages = conversation.messages();
    if messages.is_empty() {
        println!("   No messages yet. Try: trustlens ask \"How many clients are in force?\"");
        return Ok(());
    }
    for message in messages {
        let speaker = match message.role {
            Role::User => "🧑 You",
            Role::Assistant => "🤖 Assistant",
            Role::System => "⚙️  System",
        };
        println!(
            "[{}] {speaker}: {}",
            message.timestamp.format("%Y-%m-%d %H:%M"),
            message.content
        );
    }

    Ok(())
}
