//! Append-only text accumulation.

/// Append-only text buffer exposed as a single concatenated string.
///
/// Fragments are kept in arrival order; the buffer never shrinks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringAccumulator {
    fragments: Vec<String>,
}

impl StringAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment. Absent and empty fragments are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use integrations_stream_telemetry::accumulator::StringAccumulator;
    ///
    /// let mut text = StringAccumulator::new();
    /// text.merge(Some("Hel"));
    /// text.merge(None);
    /// text.merge(Some("lo"));
    /// assert_eq!(text.snapshot(), "Hello");
    /// ```
    pub fn merge(&mut self, fragment: Option<&str>) {
        match fragment {
            Some(fragment) if !fragment.is_empty() => self.fragments.push(fragment.to_string()),
            _ => {}
        }
    }

    /// Returns the concatenation of all fragments in arrival order.
    pub fn snapshot(&self) -> String {
        self.fragments.concat()
    }

    /// Returns true if no fragment has been appended.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Number of fragments received so far.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }
}
