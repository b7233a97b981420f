//! Property-based tests for sedrun
//!
//! This module uses proptest to verify core invariants of the engine:
//! line accounting, range inclusivity, block replacement and independence
//! from the input chunk size and file boundaries.

use std::io::Cursor;

use sedrun::{Action, Address, BufLineSource, Command, Concat, Engine, RunSummary, compile};

// Import proptest macro
use proptest::prelude::*;

fn to_input(lines: &[String]) -> String {
    lines.iter().map(|line| format!("{}\n", line)).collect()
}

fn run_with_chunk(commands: &[Command], quiet: bool, input: &str, max_chunk: usize) -> (String, RunSummary) {
    let mut program = compile(commands, quiet).unwrap();
    let source = BufLineSource::with_max_chunk(Cursor::new(input.as_bytes().to_vec()), max_chunk);
    let mut engine = Engine::new(source, Vec::new());
    let summary = engine.run(&mut program).unwrap();
    (String::from_utf8(engine.into_output()).unwrap(), summary)
}

fn run(commands: &[Command], quiet: bool, input: &str) -> (String, RunSummary) {
    run_with_chunk(commands, quiet, input, 4096)
}

// ============================================================================
// Property 1: Line accounting
// ============================================================================
// Without control flow, every line is consumed once and printed unchanged

proptest! {
    /// N lines take N+1 advances and come out exactly as they went in
    #[test]
    fn prop_line_accounting(lines in prop::collection::vec("[a-z ]{0,20}", 0..40)) {
        let input = to_input(&lines);
        let (output, summary) = run(&[], false, &input);

        prop_assert_eq!(summary.lines, lines.len());
        prop_assert_eq!(summary.advances, lines.len() + 1);
        prop_assert_eq!(output, input);
    }

    /// Quiet mode with no commands prints nothing
    #[test]
    fn prop_quiet_empty_script_is_silent(lines in prop::collection::vec("[a-z]{0,10}", 0..20)) {
        let (output, _) = run(&[], true, &to_input(&lines));
        prop_assert!(output.is_empty());
    }

    /// Line numbers printed for every line count up from 1
    #[test]
    fn prop_line_numbers_are_consecutive(count in 0usize..50) {
        let lines: Vec<String> = (0..count).map(|i| i.to_string()).collect();
        let commands = [Command::new(Action::LineNumber)];
        let (output, _) = run(&commands, true, &to_input(&lines));
        let expected: String = (1..=count).map(|n| format!("{}\n", n)).collect();
        prop_assert_eq!(output, expected);
    }
}

// ============================================================================
// Property 2: Range inclusivity
// ============================================================================
// A start,end line range selects start..=end, clipped to the input

proptest! {
    #[test]
    fn prop_line_range_is_inclusive(
        line_count in 0usize..25,
        start in 1usize..15,
        extent in 0usize..8
    ) {
        let end = start + extent;
        let lines: Vec<String> = (1..=line_count).map(|n| format!("L{}", n)).collect();
        let commands = [Command::range(Address::Line(start), Address::Line(end), Action::LineNumber)];
        let (output, _) = run(&commands, true, &to_input(&lines));

        let expected: String = (start..=end.min(line_count)).map(|n| format!("{}\n", n)).collect();
        prop_assert_eq!(output, expected);
    }

    /// Block replace writes its text once, on the range's last line
    #[test]
    fn prop_range_change_fires_once(
        line_count in 1usize..25,
        start in 1usize..15,
        extent in 0usize..8
    ) {
        let end = start + extent;
        let lines: Vec<String> = (1..=line_count).map(|n| format!("L{}", n)).collect();
        let commands = [Command::range(
            Address::Line(start),
            Address::Line(end),
            Action::Change { text: "BLOCK".to_string() },
        )];
        let (output, _) = run(&commands, false, &to_input(&lines));

        let mut expected = String::new();
        for n in 1..=line_count {
            if n < start || n > end {
                expected.push_str(&format!("L{}\n", n));
            } else if n == end {
                expected.push_str("BLOCK\n");
            }
        }
        prop_assert_eq!(output.matches("BLOCK").count(), usize::from(end <= line_count));
        prop_assert_eq!(output, expected);
    }
}

// ============================================================================
// Property 3: Hold space and chunking
// ============================================================================

proptest! {
    /// 1!G; h; $!d reverses the input
    #[test]
    fn prop_hold_space_reverses_lines(lines in prop::collection::vec("[a-z]{1,8}", 1..30)) {
        let commands = [
            Command::at(Address::Line(1), Action::GetAppend).negated(),
            Command::new(Action::Hold),
            Command::at(Address::Last, Action::Delete).negated(),
        ];
        let (output, _) = run(&commands, false, &to_input(&lines));

        let mut reversed = lines.clone();
        reversed.reverse();
        prop_assert_eq!(output, to_input(&reversed));
    }

    /// The chunk size of the reader never changes the result, for either
    /// line terminator
    #[test]
    fn prop_chunk_size_is_invisible(
        lines in prop::collection::vec("[a-zA-Z0-9]{0,60}", 0..20),
        crlf in any::<bool>(),
        max_chunk in 1usize..16
    ) {
        let terminator = if crlf { "\r\n" } else { "\n" };
        let input: String = lines.iter().map(|line| format!("{}{}", line, terminator)).collect();
        let commands = [Command::new(Action::Exchange), Command::new(Action::GetAppend)];

        let (small, small_summary) = run_with_chunk(&commands, false, &input, max_chunk);
        let (large, large_summary) = run(&commands, false, &input);
        prop_assert!(!small.contains('\r'));
        prop_assert_eq!(small, large);
        prop_assert_eq!(small_summary, large_summary);
    }

    /// Unterminated last lines never merge with the next file
    #[test]
    fn prop_files_keep_their_lines(
        files in prop::collection::vec(prop::collection::vec("[a-z]{1,12}", 1..4), 1..4),
        max_chunk in 1usize..8
    ) {
        let sources: Vec<_> = files
            .iter()
            .map(|lines| {
                let text = lines.join("\n");
                BufLineSource::with_max_chunk(Cursor::new(text.into_bytes()), max_chunk)
            })
            .collect();
        let mut program = compile(&[], false).unwrap();
        let mut engine = Engine::new(Concat::new(sources), Vec::new());
        let summary = engine.run(&mut program).unwrap();

        let all: Vec<String> = files.concat();
        prop_assert_eq!(summary.lines, all.len());
        prop_assert_eq!(String::from_utf8(engine.into_output()).unwrap(), to_input(&all));
    }
}
