//! sedrun: execution engine for compiled stream-editor programs
//!
//! A [`Program`] is a fixed sequence of [`Instruction`]s whose first entry
//! loads the next input line. The [`Engine`] walks it with an instruction
//! pointer, mutating the pattern space, hold space and append queue, until
//! the input runs out. Programs are usually produced from a [`Command`]
//! list by the [`ProgramBuilder`]; the binary is at src/main.rs.

pub mod builder;
pub mod command;
pub mod condition;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod instruction;
pub mod logger;
pub mod program;
pub mod range;
pub mod script;

// Re-export commonly used types for convenience
pub use builder::{ProgramBuilder, compile};
pub use command::{Action, Address, Command};
pub use condition::Condition;
pub use engine::{Engine, RunSummary, State};
pub use error::{CompileError, EngineError, ProgramError, Signal};
pub use input::{BufLineSource, Chunk, Concat, LineSource};
pub use instruction::Instruction;
pub use program::{CYCLE_START, Program};
pub use range::RangeActivator;
pub use script::Script;
