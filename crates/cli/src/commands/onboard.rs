//! `trustlens onboard`: first-time setup.

use trustlens_config::AppConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");
    let store_dir = AppConfig::default().store.resolved_path();

    println!("📊 trustlens: First-Time Setup");
    println!("==============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if !store_dir.exists() {
        std::fs::create_dir_all(&store_dir)?;
        println!("✅ Created store directory: {}", store_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Edit {} and add your API key", config_path.display());
        println!("   2. Run: trustlens load <roster.json>");
        println!("   3. Run: trustlens dashboard --narratives\n");
    }

    println!("🎉 Setup complete!\n");

    Ok(())
}
