use serde_json::{json, Value};

/// Build the prompt sent for both token counting and generation
pub fn build_prompt(notes: &str) -> String {
    format!(
        "Parse these meeting notes and extract key information: \n\
         Meeting Notes:\n\
         {notes}\n\
         incase any property of actionItems is missing return NULL, \
         add the key decisions in decision property"
    )
}

/// Structured output schema matching `ExtractionResult`
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "decisions": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "actionItems": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "task": { "type": "STRING", "nullable": true },
                        "owner": { "type": "STRING", "nullable": true },
                        "due": { "type": "STRING", "nullable": true }
                    },
                    "propertyOrdering": ["task", "owner", "due"]
                }
            }
        },
        "propertyOrdering": ["summary", "decisions", "actionItems"]
    })
}
