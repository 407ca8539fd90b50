//! Interactive session

use crate::error::report_error;
use crate::session::Session;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = "+> ";
const HISTORY_FILE: &str = ".polyop_history";
const SOURCE_NAME: &str = "<repl>";

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    session: Session,
    history_path: Option<PathBuf>,
    line_no: usize,
}

impl Repl {
    pub fn new(session: Session) -> RlResult<Self> {
        let editor = DefaultEditor::new()?;
        let history_path =
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(HISTORY_FILE));

        let mut repl = Repl {
            editor,
            session: session.with_source(SOURCE_NAME),
            history_path,
            line_no: 0,
        };
        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }
        Ok(repl)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run until `:quit` or end of input
    pub fn run(&mut self) -> RlResult<()> {
        println!("polyop {}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.\n");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line);

                    if line.starts_with(':') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }
                    self.eval_input(line);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }
        Ok(())
    }

    /// Returns true when the REPL should exit
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":quit" | ":q" | ":exit" => true,
            ":help" | ":h" | ":?" => {
                print_help();
                false
            }
            ":cache" | ":c" => {
                match serde_json::to_string_pretty(&self.session.snapshot()) {
                    Ok(json) => println!("{json}"),
                    Err(err) => eprintln!("Error: {err}"),
                }
                false
            }
            _ => {
                println!("Unknown command: {cmd}");
                println!("Type :help for help.");
                false
            }
        }
    }

    fn eval_input(&mut self, input: &str) {
        self.line_no += 1;
        match self.session.eval_line(input, self.line_no) {
            Ok(text) => println!("{text}"),
            Err(err) => report_error(SOURCE_NAME, input, &err),
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  :help, :h, :?   Show this help");
    println!("  :cache, :c      Show every call site's cache as JSON");
    println!("  :quit, :q       Exit");
    println!();
    println!("Each line is `operand + operand + ...`; the n-th `+` is the n-th call site.");
    println!("Operands:");
    println!("  42  -7  123456789012345678901  5n");
    println!("  \"text\"  true  false  null  fn name");
    println!("  foreign int 1   foreign big 2   foreign text \"s\"");
    println!("  foreign null    foreign object Name");
}
