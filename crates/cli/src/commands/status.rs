//! `parley status` — per-provider availability report.

use parley_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("Parley Status");
    println!("=============");
    println!("  Config dir:       {}", AppConfig::config_dir().display());
    println!("  Default provider: {}", config.default_provider);
    println!("  Temperature:      {}", config.temperature);
    println!("  Max tokens:       {}", config.max_tokens);
    println!("  Short-term limit: {}", config.memory.short_term_limit);
    match &config.memory.long_term_path {
        Some(path) => println!("  Long-term store:  {}", path.display()),
        None => println!("  Long-term store:  disabled"),
    }

    let providers = parley_providers::build_providers(&config);
    println!("\n  Providers:");
    let mut names: Vec<&String> = providers.keys().collect();
    names.sort();
    for name in names {
        let available = providers[name].is_available().await;
        let mark = if available { "✅ available" } else { "❌ unavailable" };
        println!("    {name:<12} {mark}");
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `parley init` first");
    }

    Ok(())
}
