//! FOR/NEXT loop frames
//!
//! Frames form a stack. A bare NEXT works on the innermost frame; `NEXT V`
//! unwinds to the frame for V, discarding any unfinished inner loops on the
//! way.

use crate::error::{BasicError, Result};
use crate::variables::{Value, VariableStore};

/// One active FOR loop
#[derive(Debug, Clone, PartialEq)]
pub struct ForFrame {
    /// Loop variable, upper-cased
    pub variable: String,
    pub limit: f64,
    pub step: f64,
    /// Line holding the FOR; the body starts on the line after it
    pub line: u32,
}

impl ForFrame {
    /// True once `value` has passed the limit in the direction of the step
    fn finished(&self, value: f64) -> bool {
        if self.step > 0.0 {
            value > self.limit
        } else {
            value < self.limit
        }
    }
}

/// What NEXT decided
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NextOutcome {
    /// Run the body again: continue after this FOR line
    LoopBack(u32),
    /// Loop done and popped: continue after the NEXT
    Finished,
}

/// Stack of active FOR frames
#[derive(Debug, Clone, Default)]
pub struct ForStack {
    frames: Vec<ForFrame>,
}

impl ForStack {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Push a frame for a FOR statement
    ///
    /// Re-running the FOR line of an active loop restarts that loop and drops
    /// everything nested in it. Reusing an active variable from a different
    /// FOR line is an error.
    pub fn push(&mut self, frame: ForFrame) -> Result<()> {
        if let Some(index) = self.position(&frame.variable) {
            if self.frames[index].line != frame.line {
                return Err(BasicError::runtime(format!(
                    "FOR variable {} already active",
                    frame.variable
                )));
            }
            self.frames.truncate(index);
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Execute NEXT on the matching frame and report where to continue
    pub fn next(&mut self, variable: Option<&str>, vars: &mut VariableStore) -> Result<NextOutcome> {
        let index = match variable {
            None => self.frames.len().checked_sub(1),
            Some(name) => self.position(name),
        }
        .ok_or_else(|| BasicError::runtime("NEXT without FOR"))?;

        // A failed NEXT must leave the stack untouched
        let current = vars.get(&self.frames[index].variable).as_number("NEXT")?;

        // Discard inner loops left unfinished by a labelled NEXT
        self.frames.truncate(index + 1);
        let frame = &self.frames[index];
        let value = current + frame.step;
        vars.set(&frame.variable, Value::Number(value));

        if frame.finished(value) {
            self.frames.pop();
            Ok(NextOutcome::Finished)
        } else {
            Ok(NextOutcome::LoopBack(frame.line))
        }
    }

    fn position(&self, variable: &str) -> Option<usize> {
        self.frames
            .iter()
            .rposition(|f| f.variable.eq_ignore_ascii_case(variable))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
