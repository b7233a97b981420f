//! Validated instruction sequences
//!
//! Index 0 of every program is the fill-next instruction, and jumping to
//! [`CYCLE_START`] begins the next cycle. Validation at construction time
//! guarantees the instruction pointer can never leave the program.

use crate::error::ProgramError;
use crate::instruction::Instruction;
use std::fmt;

/// Index of the fill-next instruction that starts every cycle
pub const CYCLE_START: usize = 0;

#[derive(Debug, Clone)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Result<Self, ProgramError> {
        let len = instructions.len();
        let last = match instructions.last() {
            Some(last) => last,
            None => return Err(ProgramError::Empty),
        };

        if !matches!(instructions[CYCLE_START], Instruction::FillNext) {
            return Err(ProgramError::MissingEntry {
                found: instructions[CYCLE_START].to_string(),
            });
        }

        for (at, instruction) in instructions.iter().enumerate() {
            if let Some(target) = instruction.targets().into_iter().find(|&t| t >= len) {
                return Err(ProgramError::TargetOutOfRange { at, target, len });
            }
        }

        if last.falls_through() {
            return Err(ProgramError::FallsOffEnd { at: len - 1 });
        }

        Ok(Self { instructions })
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Instruction at a pointer the engine produced. Validation keeps every
    /// such pointer in range.
    pub(crate) fn fetch_mut(&mut self, ip: usize) -> &mut Instruction {
        &mut self.instructions[ip]
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.instructions.len().saturating_sub(1).to_string().len();
        for (index, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{:>width$}  {}", index, instruction, width = width)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;

    #[test]
    fn test_minimal_program_is_valid() {
        let program = Program::new(vec![Instruction::FillNext, Instruction::Branch(CYCLE_START)]).unwrap();
        assert_eq!(program.len(), 2);
        assert!(!program.is_empty());
        assert!(matches!(program.get(0), Some(Instruction::FillNext)));
    }

    #[test]
    fn test_empty_program_rejected() {
        assert_eq!(Program::new(vec![]).unwrap_err(), ProgramError::Empty);
    }

    #[test]
    fn test_entry_must_be_fill_next() {
        let err = Program::new(vec![Instruction::Print, Instruction::Branch(0)]).unwrap_err();
        assert_eq!(err, ProgramError::MissingEntry { found: "print".to_string() });
    }

    #[test]
    fn test_target_out_of_range_rejected() {
        let err = Program::new(vec![
            Instruction::FillNext,
            Instruction::Conditional { condition: Condition::Line(1), met: 2, unmet: 5 },
            Instruction::Branch(0),
        ])
        .unwrap_err();
        assert_eq!(err, ProgramError::TargetOutOfRange { at: 1, target: 5, len: 3 });
    }

    #[test]
    fn test_fall_through_at_end_rejected() {
        let err = Program::new(vec![Instruction::FillNext, Instruction::Print]).unwrap_err();
        assert_eq!(err, ProgramError::FallsOffEnd { at: 1 });
    }

    #[test]
    fn test_listing() {
        let program = Program::new(vec![
            Instruction::FillNext,
            Instruction::Conditional { condition: Condition::LastLine, met: 2, unmet: 3 },
            Instruction::Print,
            Instruction::Branch(0),
        ])
        .unwrap();
        assert_eq!(
            program.to_string(),
            "0  fill-next\n1  if $ then 2 else 3\n2  print\n3  branch 0\n"
        );
    }
}
