use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::DiagramError;

// ================================
// Workflow Source Schema
// ================================

/// A parsed workflow definition.
///
/// Only the parts the diagram needs are typed; everything else in the
/// document (functions, schemas, timeouts...) is ignored.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct WorkflowSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<StartDefinition>,
    /// `None` when the document has no `states` key at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<StateDefinition>>,
}

impl WorkflowSource {
    /// Declared start-state override (`start.state`), if any.
    pub fn start_state(&self) -> Option<&str> {
        self.start.as_ref().and_then(|s| s.state.as_deref())
    }

    /// States in source order; empty when the document declares none.
    pub fn states(&self) -> &[StateDefinition] {
        self.states.as_deref().unwrap_or_default()
    }

    /// Look up a state by id (first match wins).
    pub fn state(&self, id: &str) -> Option<&StateDefinition> {
        self.states().iter().find(|s| s.id == id)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct StartDefinition {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub start_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// One workflow step.
///
/// The transition-bearing fields are shared by every kind of state; the
/// `type` tag selects the kind-specific payload in [`StateKind`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StateDefinition {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_transition: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<BranchDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<BranchDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub catch: Vec<BranchDefinition>,
    #[serde(flatten, deserialize_with = "state_kind_or_unknown")]
    pub kind: StateKind,
}

/// Untagged or malformed state payloads become [`StateKind::Unknown`] so one
/// odd state never sinks the whole document.
fn state_kind_or_unknown<'de, D>(deserializer: D) -> Result<StateKind, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if matches!(value.get("type"), None | Some(Value::Null)) {
        return Ok(StateKind::Unknown);
    }
    Ok(StateKind::deserialize(value).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "unreadable state payload; treating as unknown");
        StateKind::Unknown
    }))
}

impl StateDefinition {
    /// A bare state of the given kind with no transitions.
    pub fn new(id: impl Into<String>, kind: StateKind) -> Self {
        Self {
            id: id.into(),
            transition: None,
            default_transition: None,
            events: Vec::new(),
            conditions: Vec::new(),
            catch: Vec::new(),
            kind,
        }
    }

    pub fn with_transition(mut self, target: impl Into<String>) -> Self {
        self.transition = Some(target.into());
        self
    }

    pub fn with_default_transition(mut self, target: impl Into<String>) -> Self {
        self.default_transition = Some(target.into());
        self
    }

    pub fn with_event(mut self, target: impl Into<String>) -> Self {
        self.events.push(BranchDefinition::to(target));
        self
    }

    pub fn with_condition(mut self, target: impl Into<String>) -> Self {
        self.conditions.push(BranchDefinition::to(target));
        self
    }

    pub fn with_catch(mut self, target: impl Into<String>) -> Self {
        self.catch.push(BranchDefinition::to(target));
        self
    }

    /// Whether any catch entry carries a transition.
    pub fn has_catch_transition(&self) -> bool {
        self.catch.iter().any(|c| c.transition.is_some())
    }
}

/// An event, condition or catch entry. Only `transition` matters to the
/// diagram; the rest is kept verbatim.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct BranchDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl BranchDefinition {
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            transition: Some(target.into()),
            extra: HashMap::new(),
        }
    }
}

// ================================
// State Kinds
// ================================

/// Kind-specific state payload, selected by the `type` tag.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StateKind {
    Noop,
    Action {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action: Option<ActionDefinition>,
    },
    Delay {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<String>,
    },
    Switch,
    ConsumeEvent {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        event: Option<EventDefinition>,
    },
    GenerateEvent {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        event: Option<EventDefinition>,
    },
    EventsAnd,
    EventsXor,
    Foreach {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action: Option<ActionDefinition>,
    },
    Parallel,
    Setter,
    Getter,
    Validate,
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Any state type this crate does not know about.
    #[serde(other)]
    Unknown,
}

impl StateKind {
    /// The `type` tag as written in workflow sources.
    pub fn name(&self) -> &'static str {
        match self {
            StateKind::Noop => "noop",
            StateKind::Action { .. } => "action",
            StateKind::Delay { .. } => "delay",
            StateKind::Switch => "switch",
            StateKind::ConsumeEvent { .. } => "consumeEvent",
            StateKind::GenerateEvent { .. } => "generateEvent",
            StateKind::EventsAnd => "eventsAnd",
            StateKind::EventsXor => "eventsXor",
            StateKind::Foreach { .. } => "foreach",
            StateKind::Parallel => "parallel",
            StateKind::Setter => "setter",
            StateKind::Getter => "getter",
            StateKind::Validate => "validate",
            StateKind::Error { .. } => "error",
            StateKind::Unknown => "unknown",
        }
    }

    /// Short secondary label for the diagram box.
    pub fn detail(&self) -> Option<String> {
        match self {
            StateKind::Action { action: Some(a) } | StateKind::Foreach { action: Some(a) } => {
                a.function.clone().or_else(|| a.workflow.clone())
            }
            StateKind::Delay { duration } => duration.clone(),
            StateKind::ConsumeEvent { event: Some(e) } | StateKind::GenerateEvent { event: Some(e) } => {
                e.event_type.clone()
            }
            StateKind::Error { error, .. } => error.clone(),
            _ => None,
        }
    }
}

impl std::fmt::Display for StateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ActionDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct EventDefinition {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

// ================================
// Instance Status
// ================================

/// Status of the workflow instance whose trace is being shown.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Complete,
    Failed,
    Cancelled,
    Pending,
    Running,
}

impl InstanceStatus {
    /// Edges into the end node are only highlighted for these statuses.
    pub fn highlights_end_edges(self) -> bool {
        matches!(self, InstanceStatus::Complete | InstanceStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InstanceStatus::Complete => "complete",
            InstanceStatus::Failed => "failed",
            InstanceStatus::Cancelled => "cancelled",
            InstanceStatus::Pending => "pending",
            InstanceStatus::Running => "running",
        }
    }
}

impl FromStr for InstanceStatus {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "complete" => Ok(InstanceStatus::Complete),
            "failed" => Ok(InstanceStatus::Failed),
            "cancelled" => Ok(InstanceStatus::Cancelled),
            "pending" => Ok(InstanceStatus::Pending),
            "running" => Ok(InstanceStatus::Running),
            other => Err(DiagramError::UnknownStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_kind_from_type_tag() {
        let state: StateDefinition = serde_json::from_value(json!({
            "id": "wait",
            "type": "delay",
            "duration": "PT5S",
            "transition": "next"
        }))
        .unwrap();
        assert_eq!(state.kind, StateKind::Delay { duration: Some("PT5S".into()) });
        assert_eq!(state.transition.as_deref(), Some("next"));
        assert_eq!(state.kind.detail().as_deref(), Some("PT5S"));
    }

    #[test]
    fn test_unknown_state_type_falls_back() {
        let state: StateDefinition = serde_json::from_value(json!({
            "id": "x",
            "type": "somethingNew",
            "transition": "y"
        }))
        .unwrap();
        assert_eq!(state.kind, StateKind::Unknown);
        assert_eq!(state.kind.name(), "unknown");
    }

    #[test]
    fn test_missing_state_type_is_unknown() {
        let state: StateDefinition = serde_json::from_value(json!({
            "id": "a",
            "transition": "b"
        }))
        .unwrap();
        assert_eq!(state.kind, StateKind::Unknown);
        assert_eq!(state.transition.as_deref(), Some("b"));

        let state: StateDefinition = serde_json::from_value(json!({
            "id": "w",
            "type": "delay",
            "duration": 5
        }))
        .unwrap();
        assert_eq!(state.kind, StateKind::Unknown);
    }

    #[test]
    fn test_default_transition_camel_case() {
        let state: StateDefinition = serde_json::from_value(json!({
            "id": "check",
            "type": "switch",
            "conditions": [{"condition": "jq(.ok)", "transition": "good"}],
            "defaultTransition": "bad"
        }))
        .unwrap();
        assert_eq!(state.kind, StateKind::Switch);
        assert_eq!(state.default_transition.as_deref(), Some("bad"));
        assert_eq!(state.conditions[0].transition.as_deref(), Some("good"));
        assert_eq!(state.conditions[0].extra["condition"], json!("jq(.ok)"));
    }

    #[test]
    fn test_catch_transition_detection() {
        let state = StateDefinition::new("a", StateKind::Noop);
        assert!(!state.has_catch_transition());

        let mut state = state;
        state.catch.push(BranchDefinition::default());
        assert!(!state.has_catch_transition());

        let state = state.with_catch("recover");
        assert!(state.has_catch_transition());
    }

    #[test]
    fn test_action_detail_prefers_function() {
        let kind = StateKind::Action {
            action: Some(ActionDefinition {
                function: Some("get".into()),
                workflow: Some("sub".into()),
            }),
        };
        assert_eq!(kind.detail().as_deref(), Some("get"));
        assert_eq!(kind.to_string(), "action");
    }

    #[test]
    fn test_start_state_override() {
        let source: WorkflowSource = serde_json::from_value(json!({
            "start": {"type": "default", "state": "b"},
            "states": [{"id": "a", "type": "noop"}, {"id": "b", "type": "noop"}]
        }))
        .unwrap();
        assert_eq!(source.start_state(), Some("b"));
        assert_eq!(source.states().len(), 2);
        assert!(source.state("b").is_some());
    }

    #[test]
    fn test_missing_states_is_none() {
        let source: WorkflowSource = serde_json::from_value(json!({"id": "empty"})).unwrap();
        assert!(source.states.is_none());
        assert!(source.states().is_empty());
    }

    #[test]
    fn test_instance_status_parse() {
        assert_eq!("complete".parse::<InstanceStatus>().unwrap(), InstanceStatus::Complete);
        assert_eq!(" Failed ".parse::<InstanceStatus>().unwrap(), InstanceStatus::Failed);
        assert!("paused".parse::<InstanceStatus>().is_err());
        assert!(InstanceStatus::Failed.highlights_end_edges());
        assert!(!InstanceStatus::Running.highlights_end_edges());
        assert!(!InstanceStatus::Cancelled.highlights_end_edges());
    }

    #[test]
    fn test_instance_status_serde_lowercase() {
        let status: InstanceStatus = serde_json::from_value(json!("pending")).unwrap();
        assert_eq!(status, InstanceStatus::Pending);
        assert_eq!(serde_json::to_value(InstanceStatus::Running).unwrap(), json!("running"));
    }
}
