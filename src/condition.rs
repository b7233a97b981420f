//! Conditions tested by branching instructions
//!
//! A condition is an immutable predicate over the engine state. It holds no
//! state of its own and is evaluated afresh each time an instruction asks.

use crate::engine::State;
use regex::Regex;
use std::fmt;

#[derive(Debug, Clone)]
pub enum Condition {
    /// Matches when the current line number equals the value
    Line(usize),

    /// Matches the final line of input
    LastLine,

    /// Matches when the pattern space contains a match of the regex
    Pattern(Regex),

    /// Matches lines `first`, `first + step`, `first + 2*step`, ...
    /// A step of 0 matches `first` only.
    Step { first: usize, step: usize },
}

impl Condition {
    pub fn is_met(&self, state: &State) -> bool {
        let line = state.line_number();
        match self {
            Condition::Line(n) => line == *n,
            Condition::LastLine => state.is_last_line(),
            Condition::Pattern(re) => re.is_match(state.pattern_space()),
            Condition::Step { first, step } => {
                if *step == 0 {
                    line == *first
                } else {
                    line >= *first && (line - first) % step == 0
                }
            }
        }
    }

    /// True for a line-number condition that lies strictly behind the
    /// current line and so can never match again.
    pub fn precedes(&self, state: &State) -> bool {
        matches!(self, Condition::Line(n) if *n < state.line_number())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Line(n) => write!(f, "{}", n),
            Condition::LastLine => write!(f, "$"),
            Condition::Pattern(re) => write!(f, "/{}/", re.as_str()),
            Condition::Step { first, step } => write!(f, "{}~{}", first, step),
        }
    }
}
