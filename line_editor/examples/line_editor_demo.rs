// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Echo REPL on top of [`LineEditor`].
//!
//! ```text
//! cargo run --example line_editor_demo -- --vi --config ~/.teclarc
//! ```
//!
//! Logs go to `line_editor_log.txt` when `--log` is given, since stdout belongs to the
//! editor.

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use miette::IntoDiagnostic;
use r3bl_line_editor::{AfterSignal, CandidateSink, Completer, CompletionError, EditMode,
                       FileCompleter, LineEditor, LineEditorConfig, LineEditorError,
                       ReadLineEvent, SignalFlags, TracingConfig, find_word_start,
                       try_initialize_logging_global};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Parser)]
#[command(about = "Reads lines with r3bl_line_editor and echoes them back")]
struct CliArgs {
    /// Start in vi mode instead of emacs mode.
    #[arg(long)]
    vi: bool,

    /// Configuration file to load (`bind`, `edit-mode`, `nobeep` directives).
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Write debug logs to this file.
    #[arg(long)]
    log: Option<Option<PathBuf>>,

    #[arg(long, default_value = "demo> ")]
    prompt: String,
}

/// More info: <https://docs.rs/strum_macros/latest/strum_macros/derive.EnumString.html>
#[derive(Debug, PartialEq, EnumString, EnumIter, Display)]
#[strum(serialize_all = "kebab-case")]
enum Command {
    #[strum(ascii_case_insensitive)]
    Help,
    #[strum(ascii_case_insensitive)]
    Bindings,
    #[strum(ascii_case_insensitive)]
    Vi,
    #[strum(ascii_case_insensitive)]
    Emacs,
    #[strum(ascii_case_insensitive)]
    Exit,
}

/// Completes command names in the first word, and file names after it.
fn complete_command(
    sink: &mut CandidateSink<'_>,
    line: &str,
    word_end: usize,
) -> Result<(), CompletionError> {
    let word_start = find_word_start(line, word_end);
    if !line[..word_start].trim().is_empty() {
        return FileCompleter::new().complete(sink, line, word_end);
    }
    let word = &line[word_start..word_end];
    for command in Command::iter() {
        let name = command.to_string();
        if let Some(suffix) = name.strip_prefix(word) {
            sink.add_candidate(line, word_start, word_end, suffix, "", " ")?;
        }
    }
    Ok(())
}

fn main() -> miette::Result<()> {
    let cli_args = CliArgs::parse();

    if let Some(log_file) = cli_args.log {
        try_initialize_logging_global(&TracingConfig::new_file(log_file))?;
    }

    let config = LineEditorConfig {
        edit_mode: if cli_args.vi { EditMode::Vi } else { EditMode::Emacs },
        ..Default::default()
    };
    let mut editor = LineEditor::try_new_terminal(config)?;
    editor.set_completer(complete_command);
    // ^C clears the line instead of ending the program.
    editor.trap_signal(
        libc::SIGINT,
        SignalFlags::RESTORE_LINE | SignalFlags::DONT_FORWARD,
        AfterSignal::Abort,
    )?;

    if let Some(path) = cli_args.config {
        let report = editor.load_config_file(path)?;
        for error in report.errors {
            eprintln!("{:?}", miette::Report::new(error));
        }
    }

    println!("Type `help` for the commands. Tab completes them.");
    loop {
        let line = match editor.read_line(&cli_args.prompt, None, None) {
            Ok(ReadLineEvent::Line(line)) => line,
            Ok(ReadLineEvent::Eof) => break,
            Err(LineEditorError::SignalAbort { .. }) => continue,
            Err(error) => return Err(error.into()),
        };

        match Command::from_str(line.trim()) {
            Ok(Command::Help) => {
                let commands: Vec<String> = Command::iter().map(|it| it.to_string()).collect();
                println!("commands: {}", commands.join(", "));
            }
            Ok(Command::Bindings) => {
                for entry in editor.list_bindings() {
                    if let Some(action) = entry.effective_action() {
                        println!("{:<12} {action}", entry.sequence.to_string());
                    }
                }
            }
            Ok(Command::Vi) => editor.set_edit_mode(EditMode::Vi)?,
            Ok(Command::Emacs) => editor.set_edit_mode(EditMode::Emacs)?,
            Ok(Command::Exit) => break,
            Err(_) => println!("{line}"),
        }
    }

    std::io::Write::flush(&mut std::io::stdout()).into_diagnostic()?;
    Ok(())
}
