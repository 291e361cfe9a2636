//! Workflow source parser: converts raw YAML/JSON/TOML text into [`WorkflowSource`].

use std::path::Path;

use serde::de::DeserializeOwned;

use super::schema::WorkflowSource;
use crate::error::{DiagramError, DiagramResult};

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DslFormat {
    /// YAML format (`.yaml` / `.yml`).
    Yaml,
    /// JSON format (`.json`).
    Json,
    /// TOML format (`.toml`).
    Toml,
}

impl DslFormat {
    /// Pick a format from a file extension. Anything unrecognised is YAML,
    /// which is what workflow files are written in.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => DslFormat::Json,
            Some("toml") => DslFormat::Toml,
            _ => DslFormat::Yaml,
        }
    }
}

/// Parse workflow source text.
///
/// A document without `states` parses fine; the diagram for it is simply empty.
pub fn parse_workflow(content: &str, format: DslFormat) -> DiagramResult<WorkflowSource> {
    parse_document(content, format).map_err(DiagramError::SourceParse)
}

/// Deserialize any document in one of the supported formats.
///
/// Errors come back as plain messages so callers can wrap them in the
/// variant that fits (source vs. config).
pub(crate) fn parse_document<T: DeserializeOwned>(
    content: &str,
    format: DslFormat,
) -> Result<T, String> {
    match format {
        DslFormat::Yaml => serde_saphyr::from_str(content).map_err(|e| e.to_string()),
        DslFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        DslFormat::Toml => {
            // Go through serde_json::Value so `#[serde(flatten)]` maps of
            // Value behave the same as for the other formats.
            let toml_val: toml::Value = toml::from_str(content).map_err(|e| e.to_string())?;
            serde_json::from_value(toml_value_to_json(toml_val)).map_err(|e| e.to_string())
        }
    }
}

/// Convert a [`toml::Value`] into a [`serde_json::Value`].
///
/// TOML has no null type; `Datetime` values are stringified.
fn toml_value_to_json(val: toml::Value) -> serde_json::Value {
    match val {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_value_to_json).collect())
        }
        toml::Value::Table(tbl) => serde_json::Value::Object(
            tbl.into_iter()
                .map(|(k, v)| (k, toml_value_to_json(v)))
                .collect(),
        ),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::StateKind;

    const GREETER: &str = r#"
id: greeter
description: A simple greeting workflow
functions:
  - id: greeter
    image: direktiv/greeting:v1
    type: knative-workflow
states:
  - id: prep
    type: noop
    transition: greet
  - id: greet
    type: action
    action:
      function: greeter
      input: jq(.)
    catch:
      - error: "*"
        transition: report
  - id: report
    type: error
    error: greet.failed
    message: greeting failed
"#;

    #[test]
    fn test_parse_yaml() {
        let source = parse_workflow(GREETER, DslFormat::Yaml).unwrap();
        assert_eq!(source.id.as_deref(), Some("greeter"));
        let states = source.states();
        assert_eq!(states.len(), 3);
        assert_eq!(states[0].kind, StateKind::Noop);
        assert_eq!(states[1].kind.detail().as_deref(), Some("greeter"));
        assert_eq!(states[1].catch[0].transition.as_deref(), Some("report"));
        assert_eq!(states[2].kind.name(), "error");
    }

    #[test]
    fn test_state_without_type_still_parses() {
        let yaml = "states:\n  - id: a\n    transition: b\n  - id: b\n    type: noop\n";
        let source = parse_workflow(yaml, DslFormat::Yaml).unwrap();
        let states = source.states();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].kind, StateKind::Unknown);
        assert_eq!(states[0].transition.as_deref(), Some("b"));
        assert_eq!(states[1].kind, StateKind::Noop);
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"states":[{"id":"a","type":"delay","duration":"PT1S"}]}"#;
        let source = parse_workflow(json, DslFormat::Json).unwrap();
        assert_eq!(source.states().len(), 1);
        assert_eq!(source.states()[0].kind.name(), "delay");
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
id = "t"

[[states]]
id = "a"
type = "noop"
transition = "b"

[[states]]
id = "b"
type = "noop"
"#;
        let source = parse_workflow(toml_str, DslFormat::Toml).unwrap();
        assert_eq!(source.states().len(), 2);
        assert_eq!(source.states()[0].transition.as_deref(), Some("b"));
    }

    #[test]
    fn test_parse_without_states() {
        let source = parse_workflow("id: nothing\n", DslFormat::Yaml).unwrap();
        assert!(source.states.is_none());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            parse_workflow("{{{invalid", DslFormat::Json),
            Err(DiagramError::SourceParse(_))
        ));
        assert!(parse_workflow("[[[bad", DslFormat::Toml).is_err());
        assert!(parse_workflow("states: { unclosed", DslFormat::Yaml).is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(DslFormat::from_path("flow.json"), DslFormat::Json);
        assert_eq!(DslFormat::from_path("flow.TOML"), DslFormat::Toml);
        assert_eq!(DslFormat::from_path("flow.yml"), DslFormat::Yaml);
        assert_eq!(DslFormat::from_path("flow"), DslFormat::Yaml);
    }

    #[test]
    fn test_toml_value_to_json_datetime() {
        let dt = "2023-01-01T00:00:00Z".parse::<toml::value::Datetime>().unwrap();
        let json_val = toml_value_to_json(toml::Value::Datetime(dt));
        assert!(matches!(json_val, serde_json::Value::String(_)));
    }

    #[test]
    fn test_toml_value_to_json_table() {
        let mut table = toml::map::Map::new();
        table.insert("key".into(), toml::Value::Array(vec![toml::Value::Integer(1)]));
        let json_val = toml_value_to_json(toml::Value::Table(table));
        assert_eq!(json_val, serde_json::json!({"key": [1]}));
    }
}
