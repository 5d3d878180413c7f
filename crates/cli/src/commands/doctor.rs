//! `bugstash doctor`: Diagnose configuration.

use bugstash_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 BugStash Doctor — Configuration Check");
    println!("========================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    if config_path.exists() {
        println!("  ✅ Config file found: {}", config_path.display());
    } else {
        println!("  ⚠️  No config file — using defaults (run `bugstash onboard`)");
    }

    match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");

            if config.has_completion_key() {
                println!("  ✅ Completion key configured ({})", config.completion.base_url);
            } else {
                println!("  ❌ No completion key — set OPENROUTER_API_KEY");
                issues += 1;
            }

            println!("  ✅ Solutions API: {}", config.api_url);
            println!("  ✅ Model: {}", config.completion.model);

            let auth = config.auth_context();
            if auth.is_anonymous() {
                println!("  ⚠️  No token or API key — searches run anonymously");
            } else {
                println!("  ✅ Solutions API auth: {}", auth.kind());
            }
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
