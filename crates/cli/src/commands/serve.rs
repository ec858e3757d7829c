//! `trustlens serve`: start the HTTP API server.

use trustlens_agent::Runtime;

use super::{check_api_key, load_config};

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config()?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }
    check_api_key(&config);

    println!("📊 trustlens Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Allowed origin: {}", config.gateway.allowed_origin);
    println!("   Store: {}", config.store.backend);

    trustlens_gateway::start(Runtime::from_config(config)?).await?;

    Ok(())
}
