//! Text the engine composes itself.

use database::{Agent, Followup};

/// Placeholder in an agent prompt replaced by the followup context.
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Render the system turn that opens every transcript.
///
/// The agent prompt with its first `{context}` placeholder filled in,
/// followed by a plain-text metadata block.
pub fn render_system_prompt(agent: &Agent, followup: &Followup) -> String {
    let prompt = agent
        .system_prompt
        .replacen(CONTEXT_PLACEHOLDER, &followup.context, 1);

    format!(
        concat!(
            "{}\n\n===\nMetadata:\n===\n",
            "Followup ID: {}\nClient ID: {}\nCompany ID: {}\nAgent ID: {}\n",
            "Followup Date: {}\nFollowup Status: {}\n===",
        ),
        prompt,
        followup.id,
        followup.client_id,
        followup.company_id,
        followup.agent_id,
        followup.followup_datetime,
        followup.status,
    )
}

/// System prompt for a playground chat. A blank context leaves the
/// agent prompt untouched.
pub fn render_playground_prompt(agent: &Agent, context: Option<&str>) -> String {
    match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => agent.system_prompt.replacen(CONTEXT_PLACEHOLDER, context, 1),
        None => agent.system_prompt.clone(),
    }
}

/// The opening message sent on start and restart.
pub fn greeting(client_name: &str) -> String {
    format!("Hello {}, How are you today?", client_name.trim())
}
