//! Execution engine for Turtle BASIC
//!
//! The interpreter is a state machine over the program store. `step` runs
//! exactly one line and moves the instruction pointer according to the
//! `Flow` the statement returned, so a host can interleave rendering and
//! input between statements and stop a run simply by no longer stepping.

mod for_stack;

use for_stack::{ForFrame, ForStack, NextOutcome};

use crate::config::InterpreterConfig;
use crate::error::{BasicError, LineError, Result};
use crate::evaluator::{eval, eval_number};
use crate::filesystem::{DirectoryStorage, ProgramStorage};
use crate::graphics::{self, DrawCommand, Turtle};
use crate::parser::{parse_statement, ColorArg, Expression, PrintItem, Statement};
use crate::program::{parse_numbered_line, ProgramStore};
use crate::tokenizer::tokenize;
use crate::variables::{Value, VariableStore};
use std::mem;

/// Where execution goes after a statement
#[derive(Debug, Clone, Copy, PartialEq)]
enum Flow {
    /// Next line in ascending order
    Advance,
    /// Explicit target line (GOTO, NEXT loop-back, RUN)
    Jump(u32),
    /// Stop the run
    Halt,
}

/// Result of executing one statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    /// Line that will run next; None once halted
    pub pointer: Option<u32>,
    /// Drawing primitives produced by the statement
    pub deltas: Vec<DrawCommand>,
    /// Text lines produced by PRINT, LIST or DIR
    pub output: Vec<String>,
    /// The error that halted the run, if any
    pub error: Option<LineError>,
}

/// Everything produced while driving a run to completion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub deltas: Vec<DrawCommand>,
    pub output: Vec<String>,
    pub error: Option<LineError>,
    /// Number of statements executed
    pub steps: u64,
}

impl RunReport {
    fn absorb(&mut self, step: Step) {
        self.deltas.extend(step.deltas);
        self.output.extend(step.output);
        if step.error.is_some() {
            self.error = step.error;
        }
    }
}

/// Turtle BASIC interpreter
#[derive(Debug)]
pub struct Interpreter {
    config: InterpreterConfig,
    program: ProgramStore,
    variables: VariableStore,
    for_stack: ForStack,
    turtle: Turtle,
    storage: Box<dyn ProgramStorage>,
    // Line to execute next; None when no run is active
    pointer: Option<u32>,
    // Collected during the current statement, handed out by `step`
    deltas: Vec<DrawCommand>,
    output: Vec<String>,
}

impl Interpreter {
    /// Create an interpreter with default settings
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    /// Create an interpreter saving programs under `config.program_dir`
    pub fn with_config(config: InterpreterConfig) -> Self {
        let storage = Box::new(DirectoryStorage::new(config.program_dir.clone()));
        Self::with_storage(config, storage)
    }

    /// Create an interpreter with a custom storage backend
    pub fn with_storage(config: InterpreterConfig, storage: Box<dyn ProgramStorage>) -> Self {
        Self {
            turtle: Turtle::new(&config),
            config,
            program: ProgramStore::new(),
            variables: VariableStore::new(),
            for_stack: ForStack::new(),
            storage,
            pointer: None,
            deltas: Vec::new(),
            output: Vec::new(),
        }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    pub fn turtle(&self) -> &Turtle {
        &self.turtle
    }

    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    pub fn program(&self) -> &ProgramStore {
        &self.program
    }

    /// Line that the next `step` will execute
    pub fn pointer(&self) -> Option<u32> {
        self.pointer
    }

    pub fn is_running(&self) -> bool {
        self.pointer.is_some()
    }

    /// Number of active FOR loops
    pub fn for_depth(&self) -> usize {
        self.for_stack.depth()
    }

    /// Replace the program with program text (`<number> <statement>` lines)
    pub fn load_program(&mut self, source: &str) -> Result<()> {
        let program = ProgramStore::from_text(source)?;
        tracing::debug!(lines = program.len(), "program loaded");
        self.program = program;
        self.stop();
        Ok(())
    }

    /// Listing as (number, text) pairs in ascending order
    pub fn list_program(&self) -> Vec<(u32, String)> {
        self.program.list()
    }

    /// Program in its text file format
    pub fn program_text(&self) -> String {
        self.program.to_text()
    }

    /// NEW: forget the program and all run state
    pub fn reset(&mut self) {
        self.program.clear();
        self.variables.clear();
        self.turtle.reset(&self.config);
        self.stop();
        tracing::debug!("interpreter reset");
    }

    /// RUN: fresh variables, loops and turtle, pointer at the first line
    pub fn run(&mut self) {
        // Starting from the first line cannot name a missing line
        if let Ok(flow) = self.start_run(None) {
            self.apply_flow(flow, None);
        }
    }

    /// Console input: numbered lines edit the program, anything else runs now
    pub fn enter_line(&mut self, text: &str) -> Step {
        match parse_numbered_line(text) {
            Ok(Some((number, body))) => {
                let error = self
                    .program
                    .set_line(number, body)
                    .err()
                    .map(|e| LineError::new(Some(number), e));
                Step {
                    pointer: self.pointer,
                    error,
                    ..Step::default()
                }
            }
            Ok(None) => self.run_immediate(text),
            Err(e) => Step {
                pointer: self.pointer,
                error: Some(LineError::new(None, e)),
                ..Step::default()
            },
        }
    }

    /// Execute one statement outside the stored program
    ///
    /// RUN and GOTO leave the pointer set; keep calling `step` to run the
    /// program they started.
    pub fn run_immediate(&mut self, text: &str) -> Step {
        let result = tokenize(text)
            .and_then(|line| parse_statement(&line))
            .and_then(|statement| self.execute_statement(&statement, None));

        let error = match result {
            Ok(flow) => {
                self.apply_flow(flow, None);
                None
            }
            Err(e) => Some(LineError::new(None, e)),
        };
        self.take_step(error)
    }

    /// Execute exactly one program line
    pub fn step(&mut self) -> Step {
        let Some(line_number) = self.pointer else {
            return Step::default();
        };

        let error = match self.execute_line(line_number) {
            Ok(flow) => {
                self.apply_flow(flow, Some(line_number));
                None
            }
            Err(e) => {
                self.stop();
                Some(LineError::new(Some(line_number), e))
            }
        };
        self.take_step(error)
    }

    /// Step until the run halts, an error occurs, or the step budget runs out
    pub fn run_to_end(&mut self) -> RunReport {
        let mut report = RunReport::default();
        while let Some(line_number) = self.pointer {
            if self.config.max_steps.is_some_and(|max| report.steps >= max) {
                self.stop();
                report.error = Some(LineError::new(
                    Some(line_number),
                    BasicError::runtime("step limit exceeded"),
                ));
                break;
            }
            let step = self.step();
            report.steps += 1;
            report.absorb(step);
        }
        report
    }

    /// Enter a console line and drive whatever run it started to the end
    pub fn submit(&mut self, text: &str) -> RunReport {
        let mut report = RunReport::default();
        report.absorb(self.enter_line(text));
        if report.error.is_none() {
            let run = self.run_to_end();
            report.steps = run.steps;
            report.deltas.extend(run.deltas);
            report.output.extend(run.output);
            report.error = run.error;
        }
        report
    }

    fn take_step(&mut self, error: Option<LineError>) -> Step {
        Step {
            pointer: self.pointer,
            deltas: mem::take(&mut self.deltas),
            output: mem::take(&mut self.output),
            error,
        }
    }

    fn apply_flow(&mut self, flow: Flow, current: Option<u32>) {
        match flow {
            // Immediate statements leave a paused run where it was
            Flow::Advance => {
                if let Some(line_number) = current {
                    self.pointer = self.program.next_line_after(line_number);
                    if self.pointer.is_none() {
                        self.stop();
                    }
                }
            }
            Flow::Jump(target) => self.pointer = Some(target),
            Flow::Halt => self.stop(),
        }
    }

    /// End the run; variables and turtle keep their final values
    fn stop(&mut self) {
        if self.pointer.is_some() {
            tracing::debug!("run halted");
        }
        self.pointer = None;
        self.for_stack.clear();
    }

    fn start_run(&mut self, start: Option<&Expression>) -> Result<Flow> {
        let target = match start {
            Some(expr) => Some(self.line_target(expr)?),
            None => self.program.first_line(),
        };

        self.variables.clear();
        self.for_stack.clear();
        self.turtle.reset(&self.config);

        match target {
            Some(line_number) => {
                tracing::debug!(line = line_number, "run started");
                Ok(Flow::Jump(line_number))
            }
            None => Ok(Flow::Halt),
        }
    }

    fn execute_line(&mut self, line_number: u32) -> Result<Flow> {
        // The line may have been deleted while the run was paused
        let Some(line) = self.program.get_line(line_number) else {
            return Ok(Flow::Halt);
        };
        let statement = parse_statement(&line.tokens)?;
        tracing::trace!(line = line_number, ?statement, "execute");
        self.execute_statement(&statement, Some(line_number))
    }

    /// Execute a statement; `line` is None in immediate mode
    fn execute_statement(&mut self, statement: &Statement, line: Option<u32>) -> Result<Flow> {
        match statement {
            Statement::Let {
                variable,
                expression,
            } => {
                let value = eval(expression, &self.variables)?;
                self.variables.set(variable, value);
            }
            Statement::Print { items } => self.execute_print(items)?,
            Statement::Goto { target } => {
                let target = self.line_target(target)?;
                return Ok(Flow::Jump(target));
            }
            Statement::If {
                condition,
                then_part,
            } => {
                if eval(condition, &self.variables)?.is_truthy()? {
                    return self.execute_statement(then_part, line);
                }
            }
            Statement::For {
                variable,
                start,
                end,
                step,
            } => self.execute_for(variable, start, end, step.as_ref(), line)?,
            Statement::Next { variable } => return self.execute_next(variable.as_deref()),
            Statement::Rem | Statement::Empty => {}
            Statement::End => return Ok(Flow::Halt),
            Statement::Forward { distance } => {
                let distance = self.number(distance, "FD")?;
                let delta = self.turtle.forward(distance);
                self.deltas.extend(delta);
            }
            Statement::Back { distance } => {
                let distance = self.number(distance, "BK")?;
                let delta = self.turtle.back(distance);
                self.deltas.extend(delta);
            }
            Statement::Right { degrees } => {
                let degrees = self.number(degrees, "RT")?;
                self.turtle.right(degrees);
            }
            Statement::Left { degrees } => {
                let degrees = self.number(degrees, "LT")?;
                self.turtle.left(degrees);
            }
            Statement::Go { x, y } => {
                let x = self.number(x, "GO")?;
                let y = self.number(y, "GO")?;
                let delta = self.turtle.go_to(x, y);
                self.deltas.extend(delta);
            }
            Statement::PenUp => self.turtle.pen_up(),
            Statement::PenDown => self.turtle.pen_down(),
            Statement::Pen { color } => {
                let index = self.resolve_color(color)?;
                self.turtle.set_pen_color(index);
            }
            Statement::Background { color } => {
                let index = self.resolve_color(color)?;
                let delta = self.turtle.set_background(index);
                self.deltas.push(delta);
            }
            Statement::Thick { width } => {
                let width = self.number(width, "THICK")?;
                self.turtle.set_thickness(width)?;
            }
            Statement::Circle { radius } => {
                let radius = self.number(radius, "CIRCLE")?;
                let delta = self.turtle.circle(radius)?;
                self.deltas.push(delta);
            }
            Statement::List => {
                let listing = self
                    .program
                    .list()
                    .into_iter()
                    .map(|(number, text)| format!("{} {}", number, text));
                self.output.extend(listing);
            }
            Statement::Run { start } => return self.start_run(start.as_ref()),
            Statement::New => {
                self.reset();
                return Ok(Flow::Halt);
            }
            Statement::Save { name } => {
                let name = self.program_name(name)?;
                self.storage.save(&name, &self.program.to_text())?;
                self.output.push(format!("SAVED {}", name));
            }
            Statement::Load { name } => {
                let name = self.program_name(name)?;
                let text = self.storage.load(&name)?;
                self.load_program(&text)?;
                return Ok(Flow::Halt);
            }
            Statement::Dir => {
                let names = self.storage.list()?;
                self.output.extend(names);
            }
        }
        Ok(Flow::Advance)
    }

    /// Execute a PRINT statement: `;` joins items, `,` joins with a space
    fn execute_print(&mut self, items: &[PrintItem]) -> Result<()> {
        let mut text = String::new();
        for item in items {
            match item {
                PrintItem::Expression(expr) => {
                    let value = eval(expr, &self.variables)?;
                    text.push_str(&value.to_string());
                }
                PrintItem::Semicolon => {}
                PrintItem::Comma => text.push(' '),
            }
        }
        self.output.push(text);
        Ok(())
    }

    /// Execute FOR statement
    fn execute_for(
        &mut self,
        variable: &str,
        start: &Expression,
        end: &Expression,
        step: Option<&Expression>,
        line: Option<u32>,
    ) -> Result<()> {
        let line = line.ok_or_else(|| BasicError::syntax("FOR not allowed in immediate mode"))?;

        let start_val = self.number(start, "FOR")?;
        let end_val = self.number(end, "TO")?;
        let step_val = match step {
            Some(expr) => self.number(expr, "STEP")?,
            None => 1.0, // Default step is 1
        };
        if step_val == 0.0 {
            return Err(BasicError::value("STEP must not be zero"));
        }

        self.for_stack.push(ForFrame {
            variable: variable.to_ascii_uppercase(),
            limit: end_val,
            step: step_val,
            line,
        })?;
        self.variables.set(variable, Value::Number(start_val));
        Ok(())
    }

    /// Execute NEXT statement
    fn execute_next(&mut self, variable: Option<&str>) -> Result<Flow> {
        match self.for_stack.next(variable, &mut self.variables)? {
            NextOutcome::LoopBack(for_line) => Ok(self
                .program
                .next_line_after(for_line)
                .map_or(Flow::Halt, Flow::Jump)),
            NextOutcome::Finished => Ok(Flow::Advance),
        }
    }

    fn number(&self, expr: &Expression, context: &str) -> Result<f64> {
        let value = eval_number(expr, &self.variables, context)?;
        if !value.is_finite() {
            return Err(BasicError::value(format!("{} needs a finite number", context)));
        }
        Ok(value)
    }

    /// Evaluate a GOTO/RUN target and check that the line exists
    fn line_target(&self, expr: &Expression) -> Result<u32> {
        let value = self.number(expr, "GOTO")?;
        let exists = value.fract() == 0.0
            && value >= 1.0
            && value <= f64::from(u32::MAX)
            && self.program.contains(value as u32);
        if !exists {
            return Err(BasicError::runtime("undefined line"));
        }
        Ok(value as u32)
    }

    fn resolve_color(&self, color: &ColorArg) -> Result<u8> {
        let unknown = || BasicError::value("unknown color");
        match color {
            ColorArg::Named(name) => {
                if let Some(index) = graphics::color_by_name(name) {
                    return Ok(index);
                }
                match self.variables.lookup(name) {
                    Some(Value::Number(n)) => graphics::color_by_index(*n),
                    Some(Value::Text(text)) => graphics::color_by_name(text).ok_or_else(unknown),
                    None => Err(unknown()),
                }
            }
            ColorArg::Expression(expr) => match eval(expr, &self.variables)? {
                Value::Number(n) => graphics::color_by_index(n),
                Value::Text(text) => graphics::color_by_name(&text).ok_or_else(unknown),
            },
        }
    }

    fn program_name(&self, expr: &Expression) -> Result<String> {
        match eval(expr, &self.variables)? {
            Value::Text(name) => Ok(name),
            Value::Number(_) => Err(BasicError::type_mismatch("program name must be text")),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
