//! Structured commands accepted by the program builder
//!
//! Commands are plain data (serde-serialisable) rather than sed text, so a
//! script can be written as TOML or JSON and lowered into a [`Program`].
//!
//! [`Program`]: crate::program::Program

use serde::{Deserialize, Serialize};

/// One command with its optional address selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// First (or only) address; no address selects every line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    /// End address, turning the selection into a range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<Address>,

    /// Apply the action to the lines the address does NOT select
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negate: bool,

    #[serde(flatten)]
    pub action: Action,
}

impl Command {
    /// A command that applies to every line
    pub fn new(action: Action) -> Self {
        Self {
            address: None,
            until: None,
            negate: false,
            action,
        }
    }

    /// A command restricted to lines matching `address`
    pub fn at(address: Address, action: Action) -> Self {
        Self {
            address: Some(address),
            ..Self::new(action)
        }
    }

    /// A command restricted to the range `start` .. `end`
    pub fn range(start: Address, end: Address, action: Action) -> Self {
        Self {
            address: Some(start),
            until: Some(end),
            ..Self::new(action)
        }
    }

    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Action {
    /// x: swap pattern and hold space
    Exchange,
    /// h: copy pattern space to hold space
    Hold,
    /// H: append pattern space to hold space
    HoldAppend,
    /// g: copy hold space to pattern space
    Get,
    /// G: append hold space to pattern space
    GetAppend,
    /// p
    Print,
    /// =
    LineNumber,
    /// d: start the next cycle without auto-print
    Delete,
    /// n: auto-print (unless quiet) and load the next line
    Next,
    /// a\: queue text for output after the cycle
    Append { text: String },
    /// i\: output text now
    Insert { text: String },
    /// c\: replace the selected line or block with text
    Change { text: String },
    /// { ... }
    Block { commands: Vec<Command> },
    /// :label
    Label { name: String },
    /// b [label]: without a label, jump to the end of the script
    Branch {
        #[serde(default)]
        label: Option<String>,
    },
}

/// Line selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Address {
    /// Specific line number (e.g., 10)
    Line(usize),

    /// Last line ("$")
    Last,

    /// Regex match against the pattern space (e.g., /foo/)
    Pattern(String),

    /// Every `step`-th line starting at `first` (e.g., 1~2)
    Step { first: usize, step: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_constructors() {
        let cmd = Command::range(Address::Line(2), Address::Last, Action::Print).negated();
        assert_eq!(cmd.address, Some(Address::Line(2)));
        assert_eq!(cmd.until, Some(Address::Last));
        assert!(cmd.negate);
        assert_eq!(cmd.action, Action::Print);

        let cmd = Command::new(Action::Exchange);
        assert!(cmd.address.is_none());
        assert!(!cmd.negate);
    }

    #[test]
    fn test_command_from_json() {
        let json = r#"{"address": {"pattern": "^#"}, "cmd": "delete"}"#;
        let cmd: Command = serde_json::from_str(json).unwrap();
        assert_eq!(cmd, Command::at(Address::Pattern("^#".to_string()), Action::Delete));
    }

    #[test]
    fn test_command_with_payload_from_json() {
        let json = r#"{"address": {"line": 2}, "until": "last", "cmd": "change", "text": "gone"}"#;
        let cmd: Command = serde_json::from_str(json).unwrap();
        assert_eq!(
            cmd,
            Command::range(
                Address::Line(2),
                Address::Last,
                Action::Change { text: "gone".to_string() }
            )
        );
    }

    #[test]
    fn test_branch_label_is_optional() {
        let cmd: Command = serde_json::from_str(r#"{"cmd": "branch"}"#).unwrap();
        assert_eq!(cmd.action, Action::Branch { label: None });
    }

    #[test]
    fn test_step_address_from_json() {
        let addr: Address = serde_json::from_str(r#"{"step": {"first": 0, "step": 3}}"#).unwrap();
        assert_eq!(addr, Address::Step { first: 0, step: 3 });
    }
}
