//! Links embedded in a post body

use serde::{Deserialize, Serialize};

/// A link harvested from a post's HTML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Text shown for the link (currently the href itself)
    pub text: String,
    /// Link target
    pub url: String,
    /// CSS classes from the anchor, split on whitespace
    pub classes: Vec<String>,
}

impl Link {
    /// Whether the anchor is a mention of another account
    pub fn is_mention(&self) -> bool {
        self.classes.iter().any(|c| c == "mention")
    }
}
