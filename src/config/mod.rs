//! Configuration controlling what gets recorded on spans.

use crate::errors::{TelemetryError, TelemetryResult};
use crate::observability::{attribute_names, AttributeValue};
use crate::{DEFAULT_SERVICE_NAME, REDACTED_VALUE};

/// Environment variable for [`TraceConfig::hide_outputs`]
pub const ENV_HIDE_OUTPUTS: &str = "OPENINFERENCE_HIDE_OUTPUTS";
/// Environment variable for [`TraceConfig::hide_output_messages`]
pub const ENV_HIDE_OUTPUT_MESSAGES: &str = "OPENINFERENCE_HIDE_OUTPUT_MESSAGES";
/// Environment variable for [`TraceConfig::hide_output_text`]
pub const ENV_HIDE_OUTPUT_TEXT: &str = "OPENINFERENCE_HIDE_OUTPUT_TEXT";
/// Environment variable for [`TraceConfig::service_name`]
pub const ENV_SERVICE_NAME: &str = "OPENINFERENCE_SERVICE_NAME";

/// Controls which extracted attributes are written to spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceConfig {
    /// Drop the output payload and every output message attribute
    pub hide_outputs: bool,
    /// Drop every output message attribute
    pub hide_output_messages: bool,
    /// Replace output message text with a redaction marker
    pub hide_output_text: bool,
    /// Service name reported by the default tracer
    pub service_name: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            hide_outputs: false,
            hide_output_messages: false,
            hide_output_text: false,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

impl TraceConfig {
    /// Creates a new configuration builder
    pub fn builder() -> TraceConfigBuilder {
        TraceConfigBuilder::default()
    }

    /// Creates a configuration from environment variables
    pub fn from_env() -> TelemetryResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Creates a configuration from an arbitrary variable lookup.
    ///
    /// Unset variables keep their defaults; boolean variables accept
    /// `true`/`false`/`1`/`0` in any case.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> TelemetryResult<Self> {
        let flag = |name: &str| -> TelemetryResult<bool> {
            lookup(name).map_or(Ok(false), |value| parse_flag(name, &value))
        };

        Ok(Self {
            hide_outputs: flag(ENV_HIDE_OUTPUTS)?,
            hide_output_messages: flag(ENV_HIDE_OUTPUT_MESSAGES)?,
            hide_output_text: flag(ENV_HIDE_OUTPUT_TEXT)?,
            service_name: lookup(ENV_SERVICE_NAME)
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
        })
    }

    /// Applies the recording policy to one attribute.
    ///
    /// Returns `None` when the attribute must not be written.
    ///
    /// # Examples
    ///
    /// ```
    /// use integrations_stream_telemetry::config::TraceConfig;
    /// use integrations_stream_telemetry::observability::AttributeValue;
    ///
    /// let config = TraceConfig::builder().hide_output_text(true).build();
    /// assert_eq!(
    ///     config.mask("llm.output_messages.0.message.content", "secret".into()),
    ///     Some(AttributeValue::from("__REDACTED__"))
    /// );
    /// assert_eq!(
    ///     config.mask("llm.output_messages.0.message.role", "assistant".into()),
    ///     Some(AttributeValue::from("assistant"))
    /// );
    /// ```
    pub fn mask(&self, key: &str, value: AttributeValue) -> Option<AttributeValue> {
        let is_output_message = key.starts_with(attribute_names::LLM_OUTPUT_MESSAGES);
        let is_output_value =
            key == attribute_names::OUTPUT_VALUE || key == attribute_names::OUTPUT_MIME_TYPE;

        if self.hide_outputs && (is_output_message || is_output_value) {
            return None;
        }
        if self.hide_output_messages && is_output_message {
            return None;
        }
        let is_output_text = key == attribute_names::LLM_OUTPUT_MESSAGES
            || (is_output_message && key.ends_with(attribute_names::MESSAGE_CONTENT));
        if self.hide_output_text && is_output_text {
            return Some(AttributeValue::from(REDACTED_VALUE));
        }
        Some(value)
    }
}

fn parse_flag(name: &str, value: &str) -> TelemetryResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        other => Err(TelemetryError::configuration(format!(
            "{} must be a boolean, got {:?}",
            name, other
        ))),
    }
}

/// Builder for TraceConfig
#[derive(Default)]
pub struct TraceConfigBuilder {
    hide_outputs: bool,
    hide_output_messages: bool,
    hide_output_text: bool,
    service_name: Option<String>,
}

impl TraceConfigBuilder {
    /// Hides the output payload and output messages
    pub fn hide_outputs(mut self, hide: bool) -> Self {
        self.hide_outputs = hide;
        self
    }

    /// Hides output messages
    pub fn hide_output_messages(mut self, hide: bool) -> Self {
        self.hide_output_messages = hide;
        self
    }

    /// Redacts output message text
    pub fn hide_output_text(mut self, hide: bool) -> Self {
        self.hide_output_text = hide;
        self
    }

    /// Sets the service name
    pub fn service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    /// Builds the configuration
    pub fn build(self) -> TraceConfig {
        TraceConfig {
            hide_outputs: self.hide_outputs,
            hide_output_messages: self.hide_output_messages,
            hide_output_text: self.hide_output_text,
            service_name: self
                .service_name
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_records_everything() {
        let config = TraceConfig::default();
        assert_eq!(config.service_name, DEFAULT_SERVICE_NAME);
        assert_eq!(
            config.mask("output.value", "{}".into()),
            Some(AttributeValue::from("{}"))
        );
        assert_eq!(
            config.mask("llm.output_messages", "Hi".into()),
            Some(AttributeValue::from("Hi"))
        );
    }

    #[test]
    fn test_from_lookup_empty_uses_defaults() {
        let config = TraceConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, TraceConfig::default());
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let config = TraceConfig::from_lookup(lookup_from(&[
            (ENV_HIDE_OUTPUTS, "TRUE"),
            (ENV_HIDE_OUTPUT_MESSAGES, "0"),
            (ENV_HIDE_OUTPUT_TEXT, "1"),
            (ENV_SERVICE_NAME, "chat-gateway"),
        ]))
        .unwrap();

        assert!(config.hide_outputs);
        assert!(!config.hide_output_messages);
        assert!(config.hide_output_text);
        assert_eq!(config.service_name, "chat-gateway");
    }

    #[test]
    fn test_from_lookup_rejects_malformed_flag() {
        let result = TraceConfig::from_lookup(lookup_from(&[(ENV_HIDE_OUTPUTS, "maybe")]));
        assert!(matches!(result, Err(TelemetryError::Configuration { .. })));
    }

    #[test_case("output.value", None ; "output value")]
    #[test_case("output.mime_type", None ; "output mime type")]
    #[test_case("llm.output_messages", None ; "completion text")]
    #[test_case("llm.output_messages.0.message.role", None ; "message role")]
    #[test_case("llm.token_count.total", Some(AttributeValue::from("x")) ; "token count kept")]
    fn test_hide_outputs(key: &str, expected: Option<AttributeValue>) {
        let config = TraceConfig::builder().hide_outputs(true).build();
        assert_eq!(config.mask(key, "x".into()), expected);
    }

    #[test]
    fn test_hide_output_messages_keeps_output_value() {
        let config = TraceConfig::builder().hide_output_messages(true).build();
        assert_eq!(config.mask("llm.output_messages.1.message.content", "x".into()), None);
        assert_eq!(
            config.mask("output.value", "x".into()),
            Some(AttributeValue::from("x"))
        );
    }

    #[test]
    fn test_hide_output_text_redacts_completion() {
        let config = TraceConfig::builder().hide_output_text(true).build();
        assert_eq!(
            config.mask("llm.output_messages", "Hi there".into()),
            Some(AttributeValue::from(REDACTED_VALUE))
        );
    }

    #[test]
    fn test_builder_service_name() {
        let config = TraceConfig::builder().service_name("svc").build();
        assert_eq!(config.service_name, "svc");
    }
}
