//! Turtle BASIC console
//!
//! Reads statements from standard input, prints PRINT/LIST/DIR output and
//! errors, and paints drawing deltas onto an in-memory canvas that can be
//! previewed as text.

use clap::Parser;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use turtle_basic::graphics::Canvas;
use turtle_basic::{Interpreter, InterpreterConfig, RunReport};

/// Line-numbered BASIC that drives a turtle.
///
/// EXAMPLES:
///     turtle-basic                         Start the console
///     turtle-basic --load square.bas --run Run a program and exit
///     turtle-basic --preview               Show the canvas after each command
///
/// Set RUST_LOG=turtle_basic=trace to trace every executed statement.
#[derive(Parser, Debug)]
#[command(name = "turtle-basic")]
#[command(version)]
struct Cli {
    /// Directory used by SAVE, LOAD and DIR
    #[arg(long, default_value = ".")]
    program_dir: PathBuf,
    /// Program text file to load at startup
    #[arg(long)]
    load: Option<PathBuf>,
    /// Run the loaded program and exit instead of starting the console
    #[arg(long, requires = "load")]
    run: bool,
    /// Stop runaway programs after this many statements
    #[arg(long)]
    max_steps: Option<u64>,
    /// Print a text preview of the canvas after each command
    #[arg(long, short = 'p')]
    preview: bool,
    /// Preview size as COLUMNSxROWS
    #[arg(long, default_value = "64x36", value_parser = parse_size)]
    preview_size: (usize, usize),
    /// Debug logging (same as RUST_LOG=turtle_basic=debug)
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn parse_size(raw: &str) -> Result<(usize, usize), String> {
    let (columns, rows) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected COLUMNSxROWS, got {}", raw))?;
    let columns = columns.parse().map_err(|e| format!("bad columns: {}", e))?;
    let rows = rows.parse().map_err(|e| format!("bad rows: {}", e))?;
    Ok((columns, rows))
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose { "turtle_basic=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .with(filter)
        .init();
}

struct Console {
    interpreter: Interpreter,
    canvas: Canvas,
    preview: Option<(usize, usize)>,
}

impl Console {
    fn new(cli: &Cli) -> Self {
        let config = InterpreterConfig::new()
            .with_program_dir(cli.program_dir.clone())
            .with_max_steps(cli.max_steps);
        let canvas = Canvas::new(
            config.canvas_width as usize,
            config.canvas_height as usize,
            config.background,
        );
        Self {
            interpreter: Interpreter::with_config(config),
            canvas,
            preview: cli.preview.then_some(cli.preview_size),
        }
    }

    fn show(&mut self, report: &RunReport) {
        for command in &report.deltas {
            self.canvas.apply(command);
        }
        for line in &report.output {
            println!("{}", line);
        }
        if let Some(error) = &report.error {
            println!("{}", error);
        }
        if let Some((columns, rows)) = self.preview {
            if !report.deltas.is_empty() {
                print!("{}", self.canvas.render_text(columns, rows));
            }
        }
    }

    fn submit(&mut self, line: &str) {
        let report = self.interpreter.submit(line);
        self.show(&report);
    }

    fn repl(&mut self) -> io::Result<()> {
        println!("TURTLE BASIC");
        println!("READY.");

        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            print!("> ");
            io::stdout().flush()?;

            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            let input = line.trim();

            if input.is_empty() {
                continue;
            }
            if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
                break;
            }
            if input.eq_ignore_ascii_case("help") {
                print_help();
                continue;
            }
            self.submit(input);
        }
        Ok(())
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut console = Console::new(&cli);

    if let Some(path) = &cli.load {
        let loaded = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| {
                console
                    .interpreter
                    .load_program(&text)
                    .map_err(|e| e.to_string())
            });
        if let Err(message) = loaded {
            eprintln!("{}: {}", path.display(), message);
            std::process::exit(1);
        }
    }

    if cli.run {
        console.interpreter.run();
        let report = console.interpreter.run_to_end();
        let failed = report.error.is_some();
        console.show(&report);
        if console.preview.is_none() && !report.deltas.is_empty() {
            print!("{}", console.canvas.render_text(cli.preview_size.0, cli.preview_size.1));
        }
        if failed {
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = console.repl() {
        eprintln!("console error: {}", e);
        std::process::exit(1);
    }
}

fn print_help() {
    println!("Turtle BASIC - Available Commands:");
    println!();
    println!("Program Mode (with line numbers):");
    println!("  10 FD 100                - Store program line");
    println!("  10                       - Delete line 10");
    println!("  LIST / RUN [line] / NEW  - Show, run or clear the program");
    println!("  SAVE \"NAME\" / LOAD \"NAME\" / DIR");
    println!();
    println!("Turtle:");
    println!("  FD n / BK n              - Move forward / back");
    println!("  RT n / LT n              - Turn right / left (degrees)");
    println!("  GO x, y                  - Move to a position");
    println!("  PU / PD                  - Pen up / pen down");
    println!("  PEN colour / BG colour   - Pen and background (name or 0-15)");
    println!("  THICK n / CIRCLE r       - Line width / circle to the right");
    println!();
    println!("Statements:");
    println!("  LET A = 5 / A = 5        - Assign variable");
    println!("  PRINT \"A=\"; A, B         - Print values");
    println!("  FOR I = 1 TO 10 STEP 2   - Start FOR loop");
    println!("  NEXT [I]                 - End FOR loop");
    println!("  IF A > 3 THEN 100        - Conditional jump or statement");
    println!("  GOTO 100 / END / REM");
    println!();
    println!("Type EXIT to quit.");
}
