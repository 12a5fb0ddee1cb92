// component.rs — Dotted component names for scoped log events.
//
// Every log event carries a `component` field. A subsystem derives its own
// name from its parent, so events from the guardrail engine inside the API
// server are tagged `pipe-server.guardrails`.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Component(String);

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Derive a scoped child: `parent.child`.
    pub fn child(&self, name: &str) -> Self {
        if self.0.is_empty() {
            return Self::new(name);
        }
        Self(format!("{}.{}", self.0, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Component {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
