use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared execution mode of a wrapped callable.
///
/// The mode is fixed where the callable is wrapped, not inferred from what a
/// particular call happens to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Every call yields a tagged result immediately.
    Sync,
    /// Every call yields a future of a tagged result.
    Async,
    /// Each call decides by what the callable produced.
    Dynamic,
}

impl ExecutionMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionMode::Sync => "sync",
            ExecutionMode::Async => "async",
            ExecutionMode::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&ExecutionMode::Async).unwrap(),
            "\"async\""
        );
        let parsed: ExecutionMode = serde_json::from_str("\"dynamic\"").unwrap();
        assert_eq!(parsed, ExecutionMode::Dynamic);
        assert_eq!(ExecutionMode::Sync.to_string(), "sync");
    }
}
