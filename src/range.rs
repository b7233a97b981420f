//! Range activation for two-address selections
//!
//! A range switches on when its start condition matches and stays on until
//! the line on which its end condition matches. The switch-off is lagged by
//! one line: the end line is recorded and the range only turns off once the
//! line number has moved past it, so the end line itself is still inside.
//!
//! This relies on line numbers increasing by exactly one per advance.

use crate::condition::Condition;
use crate::engine::State;
use std::fmt;

#[derive(Debug, Clone)]
pub struct RangeActivator {
    start: Condition,
    end: Condition,
    active: bool,
    /// Line on which the end condition matched, if it has
    deactivate_after: Option<usize>,
}

impl RangeActivator {
    pub fn new(start: Condition, end: Condition) -> Self {
        Self {
            start,
            end,
            active: false,
            deactivate_after: None,
        }
    }

    /// Run one evaluation step for the current line.
    ///
    /// Returns true when the current line is inside the range.
    pub fn evaluate(&mut self, state: &State) -> bool {
        let line = state.line_number();

        if self.active && self.deactivate_after.is_some_and(|last| line > last) {
            self.active = false;
            self.deactivate_after = None;
        }

        if !self.active {
            if !self.start.is_met(state) {
                return false;
            }
            self.active = true;
            // A range can open and close on the same line
            if self.end.is_met(state) || self.end.precedes(state) {
                self.deactivate_after = Some(line);
            }
            return true;
        }

        if self.end.is_met(state) {
            self.deactivate_after = Some(line);
        }
        true
    }

    /// True when the current line closes the active range
    pub fn is_last_line_of_range(&self, state: &State) -> bool {
        self.active && self.deactivate_after == Some(state.line_number())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&self) -> &Condition {
        &self.start
    }

    pub fn end(&self) -> &Condition {
        &self.end
    }
}

impl fmt::Display for RangeActivator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.start, self.end)
    }
}
