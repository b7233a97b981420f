//! Engine state and the run loop
//!
//! All mutable run state lives in [`State`]; the [`Engine`] pairs it with
//! the line source and output sink and drives a [`Program`] one
//! instruction at a time until the fill-next instruction reports the end
//! of the stream.
//!
//! The engine reads one line ahead of the pattern space. When a line
//! becomes current the next one is already buffered (or known not to
//! exist), which is what lets `$` conditions and block replacement know
//! they are looking at the last line.

use crate::error::{EngineError, Result, Signal};
use crate::input::{Chunk, LineSource};
use crate::program::{CYCLE_START, Program};
use std::io::Write;
use tracing::{debug, trace};

/// Mutable state of a run
#[derive(Debug, Clone, Default)]
pub struct State {
    pub(crate) pattern_space: String,
    pub(crate) hold_space: String,
    /// Next raw input line, read one ahead of the pattern space
    pub(crate) lookahead: String,
    pub(crate) line_number: usize,
    pub(crate) at_last_line: bool,
    /// Text staged by append instructions, written at the next advance
    pub(crate) append_queue: Option<String>,
    pub(crate) ip: usize,
}

impl State {
    pub fn pattern_space(&self) -> &str {
        &self.pattern_space
    }

    pub fn hold_space(&self) -> &str {
        &self.hold_space
    }

    pub fn lookahead(&self) -> &str {
        &self.lookahead
    }

    /// Number of lines loaded into the pattern space so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// True once the pattern space holds the final line of input
    pub fn is_last_line(&self) -> bool {
        self.at_last_line
    }

    pub fn pending_append(&self) -> Option<&str> {
        self.append_queue.as_deref()
    }

    pub fn instruction_pointer(&self) -> usize {
        self.ip
    }
}

/// Totals reported when a run ends normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Lines consumed from the input
    pub lines: usize,
    /// Times the fill-next instruction executed, including the final one
    pub advances: usize,
}

pub struct Engine<S, W> {
    pub(crate) state: State,
    primed: bool,
    advances: usize,
    input: S,
    output: W,
}

impl<S: LineSource, W: Write> Engine<S, W> {
    pub fn new(input: S, output: W) -> Self {
        Self {
            state: State::default(),
            primed: false,
            advances: 0,
            input,
            output,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Execute `program` until the input is exhausted.
    ///
    /// Execution starts at [`CYCLE_START`], whatever a previous run left in
    /// the instruction pointer. Returns normally on end of stream; any read
    /// or write failure aborts the run and everything written before it
    /// stays written.
    pub fn run(&mut self, program: &mut Program) -> Result<RunSummary> {
        debug!(instructions = program.len(), "starting run");
        self.restart_cycle();

        while self.step(program)? == Signal::Continue {}

        self.output.flush().map_err(|source| EngineError::Output {
            line: self.state.line_number,
            source,
        })?;

        let summary = RunSummary {
            lines: self.state.line_number,
            advances: self.advances,
        };
        debug!(lines = summary.lines, advances = summary.advances, "run complete");
        Ok(summary)
    }

    /// Execute the single instruction at the current instruction pointer.
    ///
    /// The pointer is only meaningful for the program that produced it;
    /// stepping a different program must start from [`CYCLE_START`].
    pub fn step(&mut self, program: &mut Program) -> Result<Signal> {
        let ip = self.state.ip;
        program.fetch_mut(ip).execute(self)
    }

    /// Flush staged appends, then load the next line into the pattern space.
    pub(crate) fn fill_next(&mut self) -> Result<Signal> {
        self.advances += 1;

        if let Some(text) = self.state.append_queue.take() {
            self.emit(text.as_bytes())?;
        }

        if !self.primed {
            self.primed = true;
            self.refill_lookahead()?;
        }

        if self.state.at_last_line {
            trace!(line = self.state.line_number, "end of stream");
            return Ok(Signal::EndOfStream);
        }

        self.state.pattern_space = std::mem::take(&mut self.state.lookahead);
        self.state.line_number += 1;
        self.refill_lookahead()?;
        trace!(
            line = self.state.line_number,
            last = self.state.at_last_line,
            "advanced"
        );

        self.state.ip += 1;
        Ok(Signal::Continue)
    }

    /// Read one logical line into the lookahead, joining chunked reads.
    fn refill_lookahead(&mut self) -> Result<()> {
        let mut line = Vec::new();
        let mut produced = false;

        loop {
            let chunk = self.input.read_chunk().map_err(|source| EngineError::Input {
                line: self.state.line_number,
                source,
            })?;
            match chunk {
                Chunk::Data { bytes, more_follows } => {
                    produced = true;
                    line.extend_from_slice(&bytes);
                    if !more_follows {
                        break;
                    }
                }
                Chunk::EndOfInput => break,
            }
        }

        if produced {
            self.state.lookahead = String::from_utf8_lossy(&line).into_owned();
        } else {
            self.state.lookahead.clear();
            self.state.at_last_line = true;
        }
        Ok(())
    }

    /// Write bytes to the output sink
    pub(crate) fn emit(&mut self, bytes: &[u8]) -> Result<()> {
        self.output
            .write_all(bytes)
            .map_err(|source| EngineError::Output {
                line: self.state.line_number,
                source,
            })
    }

    pub(crate) fn jump(&mut self, target: usize) {
        self.state.ip = target;
    }

    pub(crate) fn advance_ip(&mut self) {
        self.state.ip += 1;
    }

    pub(crate) fn restart_cycle(&mut self) {
        self.state.ip = CYCLE_START;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::BufLineSource;
    use crate::instruction::Instruction;
    use std::io::{self, Cursor};

    type TestEngine = Engine<BufLineSource<Cursor<Vec<u8>>>, Vec<u8>>;

    fn engine(input: &str) -> TestEngine {
        Engine::new(BufLineSource::new(Cursor::new(input.as_bytes().to_vec())), Vec::new())
    }

    /// Counts every chunk pulled from the wrapped source
    struct Counting<S> {
        inner: S,
        reads: usize,
    }

    impl<S: LineSource> LineSource for Counting<S> {
        fn read_chunk(&mut self) -> io::Result<Chunk> {
            self.reads += 1;
            self.inner.read_chunk()
        }
    }

    #[test]
    fn test_fill_next_loads_lines_in_order() {
        let mut engine = engine("first\nsecond\n");

        assert_eq!(engine.fill_next().unwrap(), Signal::Continue);
        assert_eq!(engine.state().pattern_space(), "first");
        assert_eq!(engine.state().lookahead(), "second");
        assert_eq!(engine.state().line_number(), 1);
        assert!(!engine.state().is_last_line());
        assert_eq!(engine.state().instruction_pointer(), 1);

        engine.jump(CYCLE_START);
        assert_eq!(engine.fill_next().unwrap(), Signal::Continue);
        assert_eq!(engine.state().pattern_space(), "second");
        assert_eq!(engine.state().line_number(), 2);
        assert!(engine.state().is_last_line());

        engine.jump(CYCLE_START);
        assert_eq!(engine.fill_next().unwrap(), Signal::EndOfStream);
        assert_eq!(engine.state().line_number(), 2);
    }

    #[test]
    fn test_single_unterminated_line_stops_without_extra_reads() {
        let source = Counting {
            inner: BufLineSource::new(Cursor::new(b"only".to_vec())),
            reads: 0,
        };
        let mut engine = Engine::new(source, Vec::new());

        assert_eq!(engine.fill_next().unwrap(), Signal::Continue);
        assert!(engine.state().is_last_line());
        let reads_after_first = engine.input.reads;

        assert_eq!(engine.fill_next().unwrap(), Signal::EndOfStream);
        assert_eq!(engine.input.reads, reads_after_first);
    }

    #[test]
    fn test_empty_input_ends_on_first_advance() {
        let mut engine = engine("");
        assert_eq!(engine.fill_next().unwrap(), Signal::EndOfStream);
        assert_eq!(engine.state().line_number(), 0);
    }

    #[test]
    fn test_chunked_line_is_joined() {
        let source = BufLineSource::with_max_chunk(Cursor::new(b"abcdefghij\nk\n".to_vec()), 4);
        let mut engine = Engine::new(source, Vec::new());
        engine.fill_next().unwrap();
        assert_eq!(engine.state().pattern_space(), "abcdefghij");
        assert_eq!(engine.state().lookahead(), "k");
    }

    #[test]
    fn test_append_queue_flushed_before_next_line() {
        let mut engine = engine("a\nb\n");
        engine.fill_next().unwrap();
        engine.state.append_queue = Some("queued\n".to_string());

        engine.jump(CYCLE_START);
        engine.fill_next().unwrap();
        assert_eq!(engine.output(), b"queued\n");
        assert!(engine.state().pending_append().is_none());
        assert_eq!(engine.state().pattern_space(), "b");
    }

    #[test]
    fn test_append_queue_flushed_at_end_of_stream() {
        let mut engine = engine("a\n");
        engine.fill_next().unwrap();
        engine.state.append_queue = Some("tail".to_string());
        assert_eq!(engine.fill_next().unwrap(), Signal::EndOfStream);
        assert_eq!(engine.output(), b"tail");
    }

    #[test]
    fn test_run_counts_lines_and_advances() {
        let mut program = Program::new(vec![
            Instruction::FillNext,
            Instruction::Print,
            Instruction::Branch(CYCLE_START),
        ])
        .unwrap();
        let mut engine = engine("x\ny\nz\n");
        let summary = engine.run(&mut program).unwrap();
        assert_eq!(summary, RunSummary { lines: 3, advances: 4 });
        assert_eq!(engine.into_output(), b"x\ny\nz\n");
    }

    #[test]
    fn test_run_starts_from_cycle_start() {
        // Ends on the second fill-next, leaving the pointer at 2
        let mut long = Program::new(vec![
            Instruction::FillNext,
            Instruction::Print,
            Instruction::FillNext,
            Instruction::Print,
            Instruction::Branch(CYCLE_START),
        ])
        .unwrap();
        let mut short = Program::new(vec![Instruction::FillNext, Instruction::Branch(CYCLE_START)]).unwrap();

        let mut engine = engine("a\n");
        engine.run(&mut long).unwrap();
        assert_eq!(engine.state().instruction_pointer(), 2);

        let summary = engine.run(&mut short).unwrap();
        assert_eq!(summary.lines, 1);
        assert_eq!(engine.state().instruction_pointer(), CYCLE_START);
    }
}
