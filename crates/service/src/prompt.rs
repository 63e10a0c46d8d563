use ragchat_core::NO_ANSWER_MESSAGE;

/// Prompt sent to the completion endpoint for a RAG question.
#[must_use]
pub fn build_rag_prompt(context: &str, question: &str) -> String {
    format!(
        "\nContext:\n{context}\n\nQuestion:\n{question}\n\n\
         Answer concisely using only the provided context. If the answer is not explicitly in the context, respond with:\n\
         \"{NO_ANSWER_MESSAGE}\"\n"
    )
}
