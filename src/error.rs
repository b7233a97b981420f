//! Error types for program construction and execution
//!
//! Running a program can only fail on I/O: a read error from the line
//! source or a write error on the output sink. Both carry the line number
//! that was current when the failure happened and keep the original
//! `io::Error` as their source.

use std::io;
use thiserror::Error;

/// Result type used by the engine and instructions
pub type Result<T> = std::result::Result<T, EngineError>;

/// Fatal failures raised while a program runs
#[derive(Debug, Error)]
pub enum EngineError {
    /// The line source reported something other than a clean end of input
    #[error("failed to read input after line {line}: {source}")]
    Input {
        line: usize,
        #[source]
        source: io::Error,
    },

    /// The output sink rejected a write
    #[error("failed to write output at line {line}: {source}")]
    Output {
        line: usize,
        #[source]
        source: io::Error,
    },
}

impl EngineError {
    /// Kind of the underlying I/O error
    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            EngineError::Input { source, .. } | EngineError::Output { source, .. } => source.kind(),
        }
    }

    /// Line number that was current when the failure happened
    pub fn line(&self) -> usize {
        match self {
            EngineError::Input { line, .. } | EngineError::Output { line, .. } => *line,
        }
    }
}

/// Outcome of executing one instruction.
///
/// `EndOfStream` is not an error: it is how the advance instruction tells
/// the run loop that the input is exhausted and nothing is left to flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Continue,
    EndOfStream,
}

/// Structural problems that make an instruction sequence unrunnable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    #[error("program has no instructions")]
    Empty,

    #[error("instruction 0 must be the fill-next instruction, found {found}")]
    MissingEntry { found: String },

    #[error("branch target {target} at instruction {at} is out of range (program length {len})")]
    TargetOutOfRange { at: usize, target: usize, len: usize },

    #[error("last instruction {at} falls through past the end of the program")]
    FallsOffEnd { at: usize },
}

/// Failures while lowering commands into a program
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("branch to undefined label '{0}'")]
    UnknownLabel(String),

    #[error("label '{0}' is defined more than once")]
    DuplicateLabel(String),

    #[error("label name cannot be empty")]
    EmptyLabel,

    #[error("step address 0~0 never matches a line")]
    InvalidStep,

    #[error(transparent)]
    Program(#[from] ProgramError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::Output {
            line: 7,
            source: io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"),
        };
        assert_eq!(err.to_string(), "failed to write output at line 7: pipe closed");
        assert_eq!(err.io_kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(err.line(), 7);
    }

    #[test]
    fn test_program_error_display() {
        assert_eq!(
            ProgramError::TargetOutOfRange { at: 2, target: 9, len: 4 }.to_string(),
            "branch target 9 at instruction 2 is out of range (program length 4)"
        );
        assert_eq!(ProgramError::Empty.to_string(), "program has no instructions");
    }

    #[test]
    fn test_compile_error_wraps_program_error() {
        let err: CompileError = ProgramError::FallsOffEnd { at: 3 }.into();
        assert_eq!(
            err.to_string(),
            "last instruction 3 falls through past the end of the program"
        );
    }
}
