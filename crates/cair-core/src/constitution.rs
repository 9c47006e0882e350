//! The fixed rule list exposed by the bridge.

use serde::{Deserialize, Serialize};

pub const CONSTITUTION_SOURCE: &str = "cair-constitution-v1";

/// Rule text is part of the public interface; edits are breaking changes.
pub const CONSTITUTION_RULES: [&str; 4] = [
    "Be helpful and honest",
    "Avoid harmful or dangerous content",
    "Respect user privacy",
    "Provide accurate information",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constitution {
    pub rules: Vec<String>,
    pub source: String,
}

impl Default for Constitution {
    fn default() -> Self {
        Self {
            rules: CONSTITUTION_RULES.iter().map(|r| r.to_string()).collect(),
            source: CONSTITUTION_SOURCE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_four_rules() {
        let c = Constitution::default();
        assert_eq!(c.rules.len(), 4);
        assert_eq!(c.rules[0], "Be helpful and honest");
        assert_eq!(c.source, CONSTITUTION_SOURCE);
    }
}
