//! Timed input scripts.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use slidebook_core::{InputEvent, PointerEvent};

/// One scripted input at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// When to deliver the event, in milliseconds from the start.
    pub at_ms: u64,
    /// The event. Pointer timestamps are taken from `at_ms`.
    pub event: InputEvent,
}

impl ScriptStep {
    /// The event stamped with this step's time.
    #[must_use]
    pub fn stamped_event(&self) -> InputEvent {
        match &self.event {
            InputEvent::Pointer(pointer) => InputEvent::Pointer(PointerEvent {
                timestamp_ms: self.at_ms,
                ..*pointer
            }),
            other => other.clone(),
        }
    }
}

/// An ordered list of scripted inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Steps; sorted by time when loaded.
    pub steps: Vec<ScriptStep>,
}

impl Script {
    /// Build a script, ordering steps by time. Steps at the same time keep
    /// their relative order.
    #[must_use]
    pub fn new(mut steps: Vec<ScriptStep>) -> Self {
        steps.sort_by_key(|s| s.at_ms);
        Self { steps }
    }

    /// Parse a script from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a script.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let script: Self = serde_json::from_str(json).context("Failed to parse script")?;
        Ok(Self::new(script.steps))
    }

    /// Read and parse a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid script {}", path.display()))
    }

    /// Time of the last step, or 0 for an empty script.
    #[must_use]
    pub fn end_ms(&self) -> u64 {
        self.steps.last().map_or(0, |s| s.at_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidebook_core::{NavButton, PointerPhase};

    #[test]
    fn test_parse_and_sort() {
        let script = Script::from_json(
            r#"{"steps": [
                {"at_ms": 500, "event": {"type": "Button", "data": "next"}},
                {"at_ms": 100, "event": {"type": "Pointer", "data": {"pointer_id": 0, "phase": "down", "x": 10.0, "y": 20.0}}}
            ]}"#,
        )
        .expect("script");

        assert_eq!(script.steps.len(), 2);
        assert_eq!(script.steps[0].at_ms, 100);
        assert_eq!(script.steps[1].event, InputEvent::Button(NavButton::Next));
        assert_eq!(script.end_ms(), 500);
    }

    #[test]
    fn test_pointer_is_stamped_with_step_time() {
        let script = Script::from_json(
            r#"{"steps": [{"at_ms": 250, "event": {"type": "Pointer", "data": {"pointer_id": 1, "phase": "move", "x": 1.0, "y": 2.0}}}]}"#,
        )
        .expect("script");

        match script.steps[0].stamped_event() {
            InputEvent::Pointer(pointer) => {
                assert_eq!(pointer.timestamp_ms, 250);
                assert_eq!(pointer.phase, PointerPhase::Move);
                assert_eq!(pointer.pointer_id, 1);
            }
            other => panic!("Expected pointer event, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_script_is_an_error() {
        assert!(Script::from_json(r#"{"steps": [{"event": 3}]}"#).is_err());
    }
}
