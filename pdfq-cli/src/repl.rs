//! Interactive prompt: command parsing, the session that executes commands,
//! and the read-eval-print loop.

use std::path::PathBuf;

use pdfq_rag::{RagError, RagPipeline};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::render::{NO_DOCUMENT, render_answer, render_error, render_state, render_summary};

pub const HELP: &str = "\
Type a question to find the most relevant passage of the loaded PDF.

Commands:
  :load <path>   upload a PDF (replaces the current one)
  :status        show which document is loaded
  :help          show this help
  :quit          exit";

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load(PathBuf),
    Status,
    Help,
    Quit,
    Query(String),
    Empty,
}

/// Parse one line of input. Lines starting with `:` are commands; anything
/// else is a query.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Empty);
    }
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Command::Query(line.to_string()));
    };

    let (name, argument) = match command.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (command, ""),
    };

    match name {
        "load" | "l" if argument.is_empty() => Err("usage: :load <path>".to_string()),
        "load" | "l" => Ok(Command::Load(PathBuf::from(argument))),
        "status" | "s" => Ok(Command::Status),
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command ':{other}' (try :help)")),
    }
}

/// What the prompt should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print to stdout.
    Output(String),
    /// Print to stderr; the command failed.
    Failure(String),
    /// Print nothing.
    Nothing,
    /// Leave the prompt.
    Quit,
}

/// One user's session: owns the pipeline and executes commands against it,
/// one at a time.
pub struct Session {
    pipeline: RagPipeline,
}

impl Session {
    pub fn new(pipeline: RagPipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &RagPipeline {
        &self.pipeline
    }

    pub async fn handle(&mut self, command: Command) -> Reply {
        match command {
            Command::Load(path) => match self.pipeline.load_pdf(&path).await {
                Ok(summary) => Reply::Output(render_summary(&summary)),
                Err(e) => Reply::Failure(render_error(&e)),
            },
            Command::Query(query) => match self.pipeline.query(&query).await {
                Ok(Some(result)) => Reply::Output(render_answer(&result)),
                Ok(None) => Reply::Output(NO_DOCUMENT.to_string()),
                Err(e @ RagError::EmptyIndex) => Reply::Output(render_error(&e)),
                Err(e) => Reply::Failure(render_error(&e)),
            },
            Command::Status => Reply::Output(render_state(self.pipeline.state())),
            Command::Help => Reply::Output(HELP.to_string()),
            Command::Empty => Reply::Nothing,
            Command::Quit => Reply::Quit,
        }
    }
}

/// Print a reply. Returns `false` when the prompt should exit.
pub fn print_reply(reply: &Reply) -> bool {
    match reply {
        Reply::Output(text) => println!("{text}"),
        Reply::Failure(text) => eprintln!("error: {text}"),
        Reply::Nothing => {}
        Reply::Quit => return false,
    }
    true
}

/// Read commands until `:quit`, Ctrl-C or Ctrl-D.
///
/// `readline` blocks the calling thread, so this expects a current-thread
/// runtime with nothing else scheduled on it.
pub async fn run(session: &mut Session) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    println!("Type a question, or :help for commands.");

    loop {
        let line = match editor.readline("pdfq> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        if !line.trim().is_empty() {
            editor.add_history_entry(line.as_str())?;
        }

        let reply = match parse_command(&line) {
            Ok(command) => {
                debug!(?command, "running command");
                session.handle(command).await
            }
            Err(message) => Reply::Failure(message),
        };
        if !print_reply(&reply) {
            break;
        }
    }

    Ok(())
}
