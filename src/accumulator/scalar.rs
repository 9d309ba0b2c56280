//! Last-write-wins string field.

/// Holds the most recent non-empty string merged into it.
///
/// Used for protocol fields that arrive whole (stop reasons, roles, token
/// counts) where concatenation would be wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScalarReplace {
    value: String,
}

impl ScalarReplace {
    /// Creates an empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored value if `value` is present and non-empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use integrations_stream_telemetry::accumulator::ScalarReplace;
    ///
    /// let mut field = ScalarReplace::new();
    /// field.merge(Some("max_tokens"));
    /// field.merge(Some(""));
    /// assert_eq!(field.snapshot(), "max_tokens");
    /// ```
    pub fn merge(&mut self, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.value = value.to_string();
        }
    }

    /// Returns the last stored value, or an empty string if none was set.
    pub fn snapshot(&self) -> &str {
        &self.value
    }

    /// Returns true if no value has been stored.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}
