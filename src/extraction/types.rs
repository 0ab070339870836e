use serde::{Deserialize, Serialize};

/// Structured summary extracted from one set of meeting notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Short prose summary of the meeting
    pub summary: String,

    /// Key decisions, in the order the model reported them
    pub decisions: Vec<String>,

    /// Follow-up tasks
    pub action_items: Vec<ActionItem>,
}

/// A single follow-up task; any field the notes do not mention is `null`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub task: Option<String>,
    pub owner: Option<String>,
    pub due: Option<String>,
}
