//! `parley models` — list the model registry.

use parley_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let registry = parley_providers::build_registry(&config);

    println!("Parley Model Registry");
    println!("=====================");
    println!(
        "  {:<42} {:<12} {:>10} {:>8}  {}",
        "MODEL", "PROVIDER", "LATENCY", "QUALITY", "OFFLINE"
    );
    for model in registry.models() {
        println!(
            "  {:<42} {:<12} {:>8}ms {:>8.2}  {}",
            model.name,
            model.provider,
            model.latency_ms,
            model.quality_score,
            if model.offline_capable { "yes" } else { "no" }
        );
    }
    println!("\n  {} models registered", registry.len());

    Ok(())
}
