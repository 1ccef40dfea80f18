use studymate_context::SearchHit;

/// Build the grounded prompt for `question` from `hits`, in search order.
///
/// Chunk texts are separated by a blank line.
pub fn build_prompt(question: &str, hits: &[SearchHit]) -> String {
    let context = hits
        .iter()
        .map(|hit| hit.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Based strictly on the following context from academic documents, please answer the question accurately and concisely.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {question}\n\
         \n\
         Answer: Provide a clear, factual answer based only on the information given in the context above. If the context doesn't contain sufficient information to answer the question, please state that clearly."
    )
}
