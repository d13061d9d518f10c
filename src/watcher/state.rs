use std::fmt;

use serde_json::{Map, Value};

use crate::command::Command;

pub const FAN_FIELD: &str = "fan";
pub const DOOR_FIELD: &str = "door";
pub const MESSAGE_FIELD: &str = "ledTextDisplay";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanState {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    Open,
    Close,
}

/// Trimmed, lowercased text of a string value; anything else has no normal form.
fn normalize(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(|s| s.trim().to_lowercase())
}

impl FanState {
    pub fn from_value(value: Option<&Value>) -> Option<Self> {
        match normalize(value)?.as_str() {
            "on" => Some(FanState::On),
            "off" => Some(FanState::Off),
            _ => None,
        }
    }
}

impl DoorState {
    pub fn from_value(value: Option<&Value>) -> Option<Self> {
        match normalize(value)?.as_str() {
            "open" => Some(DoorState::Open),
            "close" => Some(DoorState::Close),
            _ => None,
        }
    }
}

impl fmt::Display for FanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FanState::On => "on",
            FanState::Off => "off",
        })
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DoorState::Open => "open",
            DoorState::Close => "close",
        })
    }
}

/// A field moved from one known value to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Fan(FanState),
    Door(DoorState),
    Message(String),
}

impl Change {
    /// The controller only knows how to toggle, so fan and door changes map
    /// to toggles regardless of direction.
    pub fn command(&self) -> Command {
        match self {
            Change::Fan(_) => Command::ToggleFan,
            Change::Door(_) => Command::ToggleDoor,
            Change::Message(text) => Command::message(text),
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Fan(state) => write!(f, "Toggled fan -> {state}"),
            Change::Door(state) => write!(f, "Toggled door -> {state}"),
            Change::Message(text) => write!(f, "LCD updated -> {text:?}"),
        }
    }
}

/// Last value seen for each watched field. `None` means no baseline yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedState {
    pub fan: Option<FanState>,
    pub door: Option<DoorState>,
    pub message: Option<String>,
}

impl ObservedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one document's fields into the state, returning the changes in
    /// fan, door, message order. The first recognised value of a field only
    /// sets the baseline.
    pub fn observe(&mut self, fields: &Map<String, Value>) -> Vec<Change> {
        let mut changes = Vec::new();

        if let Some(fan) = FanState::from_value(fields.get(FAN_FIELD)) {
            if advance(&mut self.fan, fan) {
                changes.push(Change::Fan(fan));
            }
        }

        if let Some(door) = DoorState::from_value(fields.get(DOOR_FIELD)) {
            if advance(&mut self.door, door) {
                changes.push(Change::Door(door));
            }
        }

        if let Some(Value::String(message)) = fields.get(MESSAGE_FIELD) {
            if advance(&mut self.message, message.clone()) {
                changes.push(Change::Message(message.clone()));
            }
        }

        changes
    }
}

/// Record `value` in `slot`; true only when it replaced a different known value.
fn advance<T: PartialEq>(slot: &mut Option<T>, value: T) -> bool {
    match slot {
        None => {
            *slot = Some(value);
            false
        }
        Some(prev) if *prev == value => false,
        Some(prev) => {
            *prev = value;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn first_fan_value_is_baseline_only() {
        let mut state = ObservedState::new();

        assert!(state.observe(&fields(json!({"fan": "On"}))).is_empty());
        assert_eq!(state.fan, Some(FanState::On));

        assert_eq!(
            state.observe(&fields(json!({"fan": "off"}))),
            vec![Change::Fan(FanState::Off)]
        );
        assert_eq!(state.fan, Some(FanState::Off));

        assert!(state.observe(&fields(json!({"fan": "off"}))).is_empty());
    }

    #[test]
    fn every_fan_change_emits_exactly_one_toggle() {
        let mut state = ObservedState::new();
        let sequence = ["off", "off", "on", "ON ", "off", "on", "on"];

        let commands: Vec<Command> = sequence
            .iter()
            .flat_map(|v| state.observe(&fields(json!({ "fan": v }))))
            .map(|c| c.command())
            .collect();

        // off(baseline) off on on off on on -> three transitions
        assert_eq!(commands, vec![Command::ToggleFan; 3]);
    }

    #[test]
    fn unrecognised_values_never_touch_state() {
        let mut state = ObservedState::new();

        let junk_values = [
            json!(""),
            json!(null),
            json!(true),
            json!(1),
            json!("maybe"),
            json!("opened"),
        ];
        for junk in junk_values {
            let changes = state.observe(&fields(json!({"fan": junk.clone(), "door": junk})));
            assert!(changes.is_empty());
        }
        assert_eq!(state, ObservedState::new());

        state.observe(&fields(json!({"door": "open"})));
        assert!(state.observe(&fields(json!({"door": "ajar"}))).is_empty());
        assert_eq!(state.door, Some(DoorState::Open));
    }

    #[test]
    fn message_is_used_verbatim_and_truncated_on_emit() {
        let mut state = ObservedState::new();

        assert!(state.observe(&fields(json!({"ledTextDisplay": "Hello"}))).is_empty());

        let changes = state.observe(&fields(json!({"ledTextDisplay": " Hello World 123456"})));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].command().to_string(), "M Hello World 123|");
        assert_eq!(state.message.as_deref(), Some(" Hello World 123456"));

        let repeat = fields(json!({"ledTextDisplay": " Hello World 123456"}));
        assert!(state.observe(&repeat).is_empty());
    }

    #[test]
    fn non_string_message_is_ignored() {
        let mut state = ObservedState::new();
        state.observe(&fields(json!({"ledTextDisplay": "Hi"})));

        assert!(state.observe(&fields(json!({"ledTextDisplay": 42}))).is_empty());
        assert!(state.observe(&fields(json!({"ledTextDisplay": null}))).is_empty());
        assert_eq!(state.message.as_deref(), Some("Hi"));
    }

    #[test]
    fn changes_come_out_fan_door_message() {
        let mut state = ObservedState::new();
        state.observe(&fields(json!({"fan": "on", "door": "open", "ledTextDisplay": "a"})));

        let changes = state.observe(&fields(json!({
            "ledTextDisplay": "b",
            "door": "close",
            "fan": "off",
        })));

        assert_eq!(
            changes,
            vec![
                Change::Fan(FanState::Off),
                Change::Door(DoorState::Close),
                Change::Message("b".into()),
            ]
        );
    }

    #[test]
    fn fields_baseline_independently() {
        let mut state = ObservedState::new();
        state.observe(&fields(json!({"fan": "on"})));

        // door seen for the first time while fan changes
        let changes = state.observe(&fields(json!({"fan": "off", "door": "close"})));
        assert_eq!(changes, vec![Change::Fan(FanState::Off)]);
        assert_eq!(state.door, Some(DoorState::Close));
    }
}
