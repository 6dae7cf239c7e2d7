//! Analyst prompts and upstream message assembly.

use sha2::{Digest, Sha256};

use crate::message::ChatMessage;
use crate::validation::{validate_messages, ValidationError};

/// Instructions prepended to every analyst conversation.
pub const ANALYST_SYSTEM_PROMPT: &str = r#"You are an expert analytics consultant for Aureon Analytics, a SaaS metrics platform.
You have access to real-time business data that will be provided with each question.

When answering questions:
1. Reference specific numbers from the provided data
2. Identify drivers, risks, and implications
3. Use consultancy-style reasoning (e.g., "This indicates...", "The key driver is...", "Risk factor:")
4. Keep responses concise but insightful (2-4 paragraphs max)
5. Highlight actionable recommendations when relevant
6. Use bullet points for lists of insights
7. Format numbers with proper formatting (e.g., $1.2M, 15.3%)

If the data doesn't contain enough information to fully answer a question, acknowledge the limitation and provide what insights you can.

Always maintain a professional, consultancy tone."#;

/// Instructions for the single dashboard insight.
pub const INSIGHT_SYSTEM_PROMPT: &str = r#"You are a business analytics AI assistant. Analyze the provided metrics and generate ONE concise, actionable insight.

Requirements:
- Keep it under 50 words
- Focus on the most significant trend, anomaly, or opportunity
- Be specific with numbers and percentages
- Suggest a clear action or highlight why this matters
- Don't use bullet points or lists
- Write in a direct, professional tone"#;

/// Instructions for naming a conversation from its first message.
pub const TITLE_SYSTEM_PROMPT: &str = "Generate a very short, concise title (2-4 words max, under 25 characters) for a conversation that starts with the user's message. The title should capture the main topic. Do not use quotes or punctuation. Just return the title, nothing else.";

/// Compute a stable SHA-256 fingerprint for a prompt string.
pub fn hash_prompt(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

/// Build the synthesized system entry from a metrics snapshot.
pub fn system_message(snapshot: &str) -> ChatMessage {
    ChatMessage::system(format!("{}\n\n{}", ANALYST_SYSTEM_PROMPT, snapshot))
}

/// Prefix a validated history with the analyst system entry.
///
/// The returned list is always `history.len() + 1` long, with the caller's
/// entries in their original order after the system entry.
pub fn assemble_messages(
    history: &[ChatMessage],
    snapshot: &str,
) -> Result<Vec<ChatMessage>, ValidationError> {
    validate_messages(history)?;

    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(system_message(snapshot));
    messages.extend_from_slice(history);
    Ok(messages)
}
