use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Channel action identifier (e.g. `"subscribe"`, `"publish"`).
///
/// Actions are opaque strings. In policy rules the wildcard action `"*"`
/// matches every action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(Cow<'static, str>);

impl Action {
    pub const SUBSCRIBE: Action = Action(Cow::Borrowed("subscribe"));
    pub const PUBLISH: Action = Action(Cow::Borrowed("publish"));

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
