//! `bugstash config`: Show the effective configuration.

use super::load_config;

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    println!("{config:#?}");
    Ok(())
}
