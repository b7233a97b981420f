//! The instruction set executed by the engine
//!
//! Every instruction leaves the instruction pointer on a valid index:
//! most step to the next instruction, branches jump to a resolved target,
//! and `Change` always returns to the start of the cycle.

use crate::condition::Condition;
use crate::engine::Engine;
use crate::error::{Result, Signal};
use crate::input::LineSource;
use crate::range::RangeActivator;
use std::fmt;
use std::io::Write;

#[derive(Debug, Clone)]
pub enum Instruction {
    /// Flush staged appends and load the next input line
    FillNext,
    /// Exchange pattern and hold space
    Swap,
    /// Copy hold space into pattern space
    Get,
    /// Copy pattern space into hold space
    Hold,
    /// Append a newline and the hold space to the pattern space
    GetAppend,
    /// Append a newline and the pattern space to the hold space
    HoldAppend,
    /// Write the pattern space and a newline
    Print,
    /// Write the current line number and a newline
    PrintLineNumber,
    Branch(usize),
    /// Stage text to be written before the next line is read
    Append(String),
    /// Write text immediately
    Insert(String),
    Conditional {
        condition: Condition,
        met: usize,
        unmet: usize,
    },
    Range {
        activator: RangeActivator,
        met: usize,
        unmet: usize,
    },
    /// End the cycle, writing `text` when unguarded or on the last line of
    /// the guarding range
    Change {
        guard: Option<RangeActivator>,
        text: String,
    },
}

impl Instruction {
    pub fn execute<S: LineSource, W: Write>(&mut self, engine: &mut Engine<S, W>) -> Result<Signal> {
        match self {
            Instruction::FillNext => return engine.fill_next(),
            Instruction::Swap => {
                let state = &mut engine.state;
                std::mem::swap(&mut state.pattern_space, &mut state.hold_space);
                engine.advance_ip();
            }
            Instruction::Get => {
                engine.state.pattern_space.clone_from(&engine.state.hold_space);
                engine.advance_ip();
            }
            Instruction::Hold => {
                engine.state.hold_space.clone_from(&engine.state.pattern_space);
                engine.advance_ip();
            }
            Instruction::GetAppend => {
                let state = &mut engine.state;
                state.pattern_space.push('\n');
                state.pattern_space.push_str(&state.hold_space);
                engine.advance_ip();
            }
            Instruction::HoldAppend => {
                let state = &mut engine.state;
                state.hold_space.push('\n');
                state.hold_space.push_str(&state.pattern_space);
                engine.advance_ip();
            }
            Instruction::Print => {
                engine.advance_ip();
                let mut line = engine.state.pattern_space.clone();
                line.push('\n');
                engine.emit(line.as_bytes())?;
            }
            Instruction::PrintLineNumber => {
                engine.advance_ip();
                let line = format!("{}\n", engine.state.line_number);
                engine.emit(line.as_bytes())?;
            }
            Instruction::Branch(target) => engine.jump(*target),
            Instruction::Append(text) => {
                engine.advance_ip();
                engine
                    .state
                    .append_queue
                    .get_or_insert_with(String::new)
                    .push_str(text);
            }
            Instruction::Insert(text) => {
                engine.advance_ip();
                engine.emit(text.as_bytes())?;
            }
            Instruction::Conditional { condition, met, unmet } => {
                let target = if condition.is_met(&engine.state) { *met } else { *unmet };
                engine.jump(target);
            }
            Instruction::Range { activator, met, unmet } => {
                let target = if activator.evaluate(&engine.state) { *met } else { *unmet };
                engine.jump(target);
            }
            Instruction::Change { guard, text } => {
                engine.restart_cycle();
                let emit = match guard {
                    None => true,
                    Some(range) => {
                        range.evaluate(&engine.state);
                        range.is_last_line_of_range(&engine.state)
                    }
                };
                if emit {
                    engine.emit(text.as_bytes())?;
                }
            }
        }
        Ok(Signal::Continue)
    }

    /// Whether execution continues at the next index
    pub fn falls_through(&self) -> bool {
        !matches!(
            self,
            Instruction::Branch(_)
                | Instruction::Conditional { .. }
                | Instruction::Range { .. }
                | Instruction::Change { .. }
        )
    }

    /// Explicit jump targets carried by the instruction
    pub fn targets(&self) -> Vec<usize> {
        match self {
            Instruction::Branch(target) => vec![*target],
            Instruction::Conditional { met, unmet, .. } | Instruction::Range { met, unmet, .. } => {
                vec![*met, *unmet]
            }
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::FillNext => write!(f, "fill-next"),
            Instruction::Swap => write!(f, "swap"),
            Instruction::Get => write!(f, "get"),
            Instruction::Hold => write!(f, "hold"),
            Instruction::GetAppend => write!(f, "get-append"),
            Instruction::HoldAppend => write!(f, "hold-append"),
            Instruction::Print => write!(f, "print"),
            Instruction::PrintLineNumber => write!(f, "print-line-number"),
            Instruction::Branch(target) => write!(f, "branch {}", target),
            Instruction::Append(text) => write!(f, "append {:?}", text),
            Instruction::Insert(text) => write!(f, "insert {:?}", text),
            Instruction::Conditional { condition, met, unmet } => {
                write!(f, "if {} then {} else {}", condition, met, unmet)
            }
            Instruction::Range { activator, met, unmet } => {
                write!(f, "range {} then {} else {}", activator, met, unmet)
            }
            Instruction::Change { guard: None, text } => write!(f, "change {:?}", text),
            Instruction::Change { guard: Some(range), text } => {
                write!(f, "change {:?} at end of {}", text, range)
            }
        }
    }
}
