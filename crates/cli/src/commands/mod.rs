pub mod assistant;
pub mod clients;
pub mod dashboard;
pub mod onboard;
pub mod roster;
pub mod serve;

use trustlens_agent::Runtime;
use trustlens_config::AppConfig;

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

pub fn runtime() -> Result<Runtime, Box<dyn std::error::Error>> {
    Ok(Runtime::from_config(load_config()?)?)
}

/// Print setup hints when no API key is configured.
pub fn check_api_key(config: &AppConfig) {
    if config.has_api_key() {
        return;
    }
    eprintln!();
    eprintln!("  ⚠️  No API key configured; generated text will fall back.");
    eprintln!("  Set TRUSTLENS_API_KEY or OPENAI_API_KEY, or add api_key to:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
}
