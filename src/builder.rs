//! Lowering commands into a runnable program
//!
//! Every program has the same frame:
//!
//! ```text
//!   0  fill-next
//!      <commands>
//!      print          (omitted in quiet mode)
//!      branch 0
//! ```
//!
//! Addresses become conditional branches around the action they guard:
//! a single address lowers to `Conditional`, an address pair to `Range`.
//! Negation swaps the taken and skipped targets.

use crate::command::{Action, Address, Command};
use crate::condition::Condition;
use crate::error::CompileError;
use crate::instruction::Instruction;
use crate::program::{CYCLE_START, Program};
use crate::range::RangeActivator;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// Placeholder for targets patched once the destination is known
const UNRESOLVED: usize = usize::MAX;

/// Jump destinations only known after all commands are lowered
enum Pending {
    Label(String),
    EndOfScript,
}

pub struct ProgramBuilder {
    quiet: bool,
    code: Vec<Instruction>,
    labels: HashMap<String, usize>,
    fixups: Vec<(usize, Pending)>,
}

impl ProgramBuilder {
    /// `quiet` disables the automatic print at the end of each cycle
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            code: vec![Instruction::FillNext],
            labels: HashMap::new(),
            fixups: Vec::new(),
        }
    }

    pub fn command(&mut self, command: &Command) -> Result<&mut Self, CompileError> {
        let guard = self.lower_guard(command)?;
        self.lower_action(command, guard.is_some())?;
        if let Some(at) = guard {
            let skip = self.code.len();
            self.set_skip_target(at, skip, command.negate);
        }
        Ok(self)
    }

    pub fn commands<'a>(
        &mut self,
        commands: impl IntoIterator<Item = &'a Command>,
    ) -> Result<&mut Self, CompileError> {
        for command in commands {
            self.command(command)?;
        }
        Ok(self)
    }

    pub fn build(mut self) -> Result<Program, CompileError> {
        let end_of_script = self.code.len();
        if !self.quiet {
            self.code.push(Instruction::Print);
        }
        self.code.push(Instruction::Branch(CYCLE_START));

        for (at, pending) in std::mem::take(&mut self.fixups) {
            let target = match pending {
                Pending::EndOfScript => end_of_script,
                Pending::Label(name) => *self
                    .labels
                    .get(&name)
                    .ok_or(CompileError::UnknownLabel(name))?,
            };
            self.code[at] = Instruction::Branch(target);
        }

        let program = Program::new(self.code)?;
        debug!(instructions = program.len(), quiet = self.quiet, "program built");
        Ok(program)
    }

    /// Emit the branch guarding a command's action, returning its index.
    ///
    /// The taken target is the next instruction; the skip target is
    /// patched once the action has been lowered.
    fn lower_guard(&mut self, command: &Command) -> Result<Option<usize>, CompileError> {
        let Some(address) = &command.address else {
            return Ok(None);
        };

        let at = self.code.len();
        let instruction = match &command.until {
            None => Instruction::Conditional {
                condition: condition_for(address)?,
                met: at + 1,
                unmet: UNRESOLVED,
            },
            Some(end) => Instruction::Range {
                activator: RangeActivator::new(condition_for(address)?, condition_for(end)?),
                met: at + 1,
                unmet: UNRESOLVED,
            },
        };
        self.code.push(instruction);
        Ok(Some(at))
    }

    fn set_skip_target(&mut self, at: usize, skip: usize, negate: bool) {
        if let Instruction::Conditional { met, unmet, .. } | Instruction::Range { met, unmet, .. } =
            &mut self.code[at]
        {
            if negate {
                *unmet = *met;
                *met = skip;
            } else {
                *unmet = skip;
            }
        }
    }

    fn lower_action(&mut self, command: &Command, guarded: bool) -> Result<(), CompileError> {
        match &command.action {
            Action::Exchange => self.code.push(Instruction::Swap),
            Action::Hold => self.code.push(Instruction::Hold),
            Action::HoldAppend => self.code.push(Instruction::HoldAppend),
            Action::Get => self.code.push(Instruction::Get),
            Action::GetAppend => self.code.push(Instruction::GetAppend),
            Action::Print => self.code.push(Instruction::Print),
            Action::LineNumber => self.code.push(Instruction::PrintLineNumber),
            Action::Delete => self.code.push(Instruction::Branch(CYCLE_START)),
            Action::Next => {
                if !self.quiet {
                    self.code.push(Instruction::Print);
                }
                self.code.push(Instruction::FillNext);
            }
            Action::Append { text } => self.code.push(Instruction::Append(with_newline(text))),
            Action::Insert { text } => self.code.push(Instruction::Insert(with_newline(text))),
            Action::Change { text } => {
                // A range-guarded change keeps its own activator in step with
                // the guarding range and only writes on the range's last line.
                let guard = match (&command.address, &command.until) {
                    (Some(start), Some(end)) if guarded && !command.negate => Some(
                        RangeActivator::new(condition_for(start)?, condition_for(end)?),
                    ),
                    _ => None,
                };
                self.code.push(Instruction::Change {
                    guard,
                    text: with_newline(text),
                });
            }
            Action::Block { commands } => {
                for inner in commands {
                    self.command(inner)?;
                }
            }
            Action::Label { name } => {
                if name.is_empty() {
                    return Err(CompileError::EmptyLabel);
                }
                if self.labels.insert(name.clone(), self.code.len()).is_some() {
                    return Err(CompileError::DuplicateLabel(name.clone()));
                }
            }
            Action::Branch { label } => {
                let pending = match label {
                    Some(name) => Pending::Label(name.clone()),
                    None => Pending::EndOfScript,
                };
                self.fixups.push((self.code.len(), pending));
                self.code.push(Instruction::Branch(UNRESOLVED));
            }
        }
        Ok(())
    }
}

/// Lower a full command list in one call
pub fn compile(commands: &[Command], quiet: bool) -> Result<Program, CompileError> {
    let mut builder = ProgramBuilder::new(quiet);
    builder.commands(commands)?;
    builder.build()
}

fn condition_for(address: &Address) -> Result<Condition, CompileError> {
    match address {
        Address::Line(n) => Ok(Condition::Line(*n)),
        Address::Last => Ok(Condition::LastLine),
        Address::Pattern(pattern) => Regex::new(pattern)
            .map(Condition::Pattern)
            .map_err(|source| CompileError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            }),
        Address::Step { first: 0, step: 0 } => Err(CompileError::InvalidStep),
        Address::Step { first, step } => Ok(Condition::Step {
            first: *first,
            step: *step,
        }),
    }
}

fn with_newline(text: &str) -> String {
    let mut text = text.to_string();
    text.push('\n');
    text
}
