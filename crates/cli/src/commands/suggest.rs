//! `bugstash suggest`: Ask, then list follow-up questions.

use bugstash_assistant::{Assistant, SuggestionGenerator};

use super::{
    completion_gateway, ctrl_c_token, load_config, render_result, require_completion_key,
    search_gateway,
};

pub async fn run(prompt: String, count: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    require_completion_key(&config)?;

    let completion = completion_gateway(&config);
    let assistant = Assistant::from_config(&config, completion.clone(), search_gateway(&config));
    let generator = SuggestionGenerator::new(completion, &config.completion.model);
    let cancel = ctrl_c_token();

    let result = assistant
        .run_with_cancel(&prompt, &config.auth_context(), None, &cancel)
        .await
        .map_err(|e| format!("The assistant failed: {e}"))?;
    println!("{}", render_result(&result, false));

    let count = count.unwrap_or(config.assistant.suggestion_count);
    let suggestions = generator.suggest(&prompt, &result.reply, count).await?;
    if !suggestions.is_empty() {
        println!("\nYou might also ask:");
        for s in suggestions {
            println!("  - {s}");
        }
    }

    Ok(())
}
