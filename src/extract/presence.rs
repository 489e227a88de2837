use crate::model::Value;

/// Yields a fixed value for every artifact it is applied to, recording that the artifact exists.
#[derive(Debug, Clone)]
pub struct PresenceExtractor {
    value: Value,
}

impl PresenceExtractor {
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self { value }
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }
}
