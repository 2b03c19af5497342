//! Grounding prompt assembly

use ragkb_core::{ChatMessage, QueryResult};

/// Instructions sent as the system message of every grounded query
pub const SYSTEM_PROMPT: &str = "You are an expert assistant that answers questions based EXCLUSIVELY on the provided context.

Rules:
1. Answer ONLY using information present in the context
2. If the information is not in the context, say so clearly
3. Cite the sources when possible
4. Be concise but complete
5. Answer in the same language as the question";

/// Answer returned without calling the generator when retrieval finds nothing
pub const NO_RELEVANT_INFORMATION: &str =
    "I could not find any relevant information in the knowledge base to answer this question.";

const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Render the retrieved chunks, numbered from 1 in rank order
pub fn format_context(results: &[QueryResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "[Source {}: {}] (relevance: {:.2})\n{}",
                i + 1,
                result.source,
                result.score,
                result.text
            )
        })
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Build the system and user messages for `question` grounded on `results`
pub fn build_prompt(question: &str, results: &[QueryResult]) -> Vec<ChatMessage> {
    let user_message = format!(
        "Context:\n{}{}Question: {}",
        format_context(results),
        CONTEXT_SEPARATOR,
        question
    );

    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_message)]
}
