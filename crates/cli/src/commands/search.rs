//! `bugstash search`: Query saved solutions without the assistant.

use bugstash_core::search::SearchRequest;

use super::{load_config, render_hits, search_gateway};

pub async fn run(
    query: String,
    limit: Option<u32>,
    offset: u32,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let gateway = search_gateway(&config);
    let request = SearchRequest::new(query, limit.unwrap_or(config.assistant.result_limit))
        .with_offset(offset);

    let response = gateway
        .search(&request, &config.auth_context())
        .await
        .map_err(|e| format!("Search failed: {e}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.results.is_empty() {
        println!("No solutions found for \"{}\".", request.query);
        return Ok(());
    }

    println!(
        "Showing {} of {} solutions for \"{}\":",
        response.results.len(),
        response.total,
        request.query
    );
    println!("{}", render_hits(&response.results));
    Ok(())
}
