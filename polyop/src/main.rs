//! polyop CLI

use clap::{Parser, Subcommand};
use polyop::error::report_error;
use polyop::repl::Repl;
use polyop::{DriverError, RuntimeConfig, Session};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "polyop", version, about = "Self-specializing add and to-text call sites")]
struct Cli {
    /// Load node admission limits from a TOML file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print every call site's cache as JSON when done
    #[arg(long, global = true)]
    dump_cache: bool,

    /// Log cache installs, rewrites and collapses
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate each argument as a line, in one session
    Eval {
        #[arg(required = true)]
        lines: Vec<String>,
    },
    /// Evaluate every line of a file, skipping blank and `#` lines
    Run {
        file: PathBuf,
    },
    /// Start an interactive session
    Repl,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            report_error("polyop", "", &err);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

/// Returns whether every line evaluated
fn run(cli: Cli) -> Result<bool, DriverError> {
    let Cli {
        config,
        dump_cache,
        command,
        ..
    } = cli;

    let config = match config {
        Some(path) => RuntimeConfig::load(&path)?,
        None => RuntimeConfig::default(),
    };
    log::debug!("limits: add {}, to_text {}", config.add_limit, config.to_text_limit);

    let (ok, snapshot) = match command {
        Command::Eval { lines } => {
            let mut session = Session::new(config).with_source("<eval>");
            let ok = eval_lines(
                &mut session,
                "<eval>",
                lines.iter().map(String::as_str).enumerate(),
            );
            (ok, session.snapshot())
        }
        Command::Run { file } => {
            let source = std::fs::read_to_string(&file)?;
            let name = file.display().to_string();
            let mut session = Session::new(config).with_source(name.as_str());
            let lines = source.lines().enumerate().filter(|(_, line)| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with('#')
            });
            let ok = eval_lines(&mut session, &name, lines);
            (ok, session.snapshot())
        }
        Command::Repl => {
            let mut repl = Repl::new(Session::new(config)).map_err(readline_error)?;
            repl.run().map_err(readline_error)?;
            (true, repl.session().snapshot())
        }
    };

    if dump_cache {
        let json = serde_json::to_string_pretty(&snapshot).map_err(std::io::Error::from)?;
        println!("{json}");
    }
    Ok(ok)
}

fn eval_lines<'a>(
    session: &mut Session,
    name: &str,
    lines: impl Iterator<Item = (usize, &'a str)>,
) -> bool {
    let mut ok = true;
    for (index, line) in lines {
        match session.eval_line(line, index + 1) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                report_error(name, line, &err);
                ok = false;
            }
        }
    }
    ok
}

fn readline_error(err: rustyline::error::ReadlineError) -> DriverError {
    DriverError::Io(std::io::Error::other(err.to_string()))
}
