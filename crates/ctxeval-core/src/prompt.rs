//! Prompt construction for context evaluation.
//!
//! The prompt is a fixed template. Context and question are embedded
//! verbatim without escaping, so the model is trusted to read them as data.

/// System instruction sent with every evaluation.
pub const SYSTEM_PROMPT: &str = "You are an expert at evaluating context completeness and relevance. \
Always provide responses in the exact JSON format requested.";

/// Sampling temperature used for evaluation calls.
pub const EVALUATION_TEMPERATURE: f32 = 0.2;

const RESPONSE_FORMAT: &str = r#"{
    "confidence_score": <integer between 1 and 100>,
    "explanation": <detailed explanation of the score>,
    "relevancy_analysis": <analysis of how relevant the context is>,
    "accuracy_analysis": <analysis of the information accuracy>,
    "missing_information": [<list of any missing critical information>],
    "data_quality": {
        "format": <assessment of data format>,
        "structure_quality": <assessment of data structure>,
        "completeness": <assessment of data completeness>
    }
}"#;

/// Build the user prompt for one evaluation.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Please evaluate if the following context is sufficient to accurately answer the given question.\n\
         Consider both relevancy and accuracy.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question:\n\
         {question}\n\
         \n\
         Evaluate and provide your response in the following JSON format:\n\
         {RESPONSE_FORMAT}\n\
         \n\
         Ensure all fields are present and properly formatted.\n"
    )
}
