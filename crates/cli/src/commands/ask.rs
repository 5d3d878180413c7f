//! `bugstash ask`: One assistant turn.

use bugstash_assistant::Assistant;
use tracing::debug;

use super::{
    completion_gateway, ctrl_c_token, load_config, render_result, require_completion_key,
    search_gateway,
};

pub async fn run(
    prompt: String,
    limit: Option<u32>,
    json: bool,
    trace: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    require_completion_key(&config)?;

    let assistant = Assistant::from_config(
        &config,
        completion_gateway(&config),
        search_gateway(&config),
    );
    let auth = config.auth_context();
    let cancel = ctrl_c_token();

    eprint!("  Thinking...");
    let outcome = assistant.run_with_cancel(&prompt, &auth, limit, &cancel).await;
    eprint!("\r              \r");

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            eprintln!("  [Error] The assistant failed: {e}");
            return Err(e.into());
        }
    };

    debug!(hits = result.hits.len(), searches = result.tool_trace.len(), "Ask finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", render_result(&result, trace));
    }

    Ok(())
}
