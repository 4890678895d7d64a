//! Prompt assembly. Pure string construction, no I/O.

/// Build the completion prompt from retrieved context chunks (in rank
/// order) and the user's question. Chunks are joined by a blank line under
/// the `Context:` header; the question sits under `Question:`.
pub fn build_prompt(context_chunks: &[String], question: &str) -> String {
    let context = context_chunks.join("\n\n");
    format!(
        "You are a helpful university assistant.\n\
         Use the context below to answer accurately.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question:\n\
         {question}\n\
         \n\
         Answer:\n"
    )
}
