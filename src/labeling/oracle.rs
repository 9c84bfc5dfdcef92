//! Label providers consulted by a labeling session.
//!
//! The session never talks to a terminal directly: it asks a [`LabelOracle`].
//! [`ConsoleOracle`] prompts a human over any reader/writer pair, while
//! [`ScriptedOracle`] and [`FnOracle`] answer programmatically.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use thiserror::Error;

use super::label::LabelType;
use crate::table::{RowId, Value};

/// Errors raised while waiting for an oracle answer.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Reading the response or writing the prompt failed.
    #[error("operator prompt failed: {0}")]
    Io(#[from] std::io::Error),
    /// The oracle has no further answers (end of input).
    #[error("labeling aborted: no response from the operator")]
    Aborted,
}

/// Everything shown to the oracle when asking for one row's label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelContext {
    /// Row being labeled.
    pub row: RowId,
    /// Declared label type for the session.
    pub label_type: LabelType,
    /// Selected feature columns and their values, in selection order.
    pub features: Vec<(String, Value)>,
}

impl LabelContext {
    /// Value of a feature column, if it was selected.
    pub fn feature(&self, column: &str) -> Option<&Value> {
        self.features
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

/// Synchronous source of labels.
///
/// Both requests return the raw response; the session validates and coerces it.
pub trait LabelOracle {
    /// Ask which type the labels in `label_column` should have.
    fn request_label_type(&mut self, label_column: &str) -> Result<String, OracleError>;

    /// Ask for the label of a single row. Blocks until answered.
    fn request_label(&mut self, context: &LabelContext) -> Result<String, OracleError>;
}

impl<O: LabelOracle + ?Sized> LabelOracle for &mut O {
    fn request_label_type(&mut self, label_column: &str) -> Result<String, OracleError> {
        (**self).request_label_type(label_column)
    }

    fn request_label(&mut self, context: &LabelContext) -> Result<String, OracleError> {
        (**self).request_label(context)
    }
}

/// Text prompt oracle for a human operator.
pub struct ConsoleOracle<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleOracle<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the oracle, returning the output writer.
    pub fn into_output(self) -> W {
        self.output
    }

    fn read_response(&mut self) -> Result<String, OracleError> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(OracleError::Aborted);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl ConsoleOracle<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Prompt on the process stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> LabelOracle for ConsoleOracle<R, W> {
    fn request_label_type(&mut self, label_column: &str) -> Result<String, OracleError> {
        writeln!(self.output)?;
        writeln!(self.output, "What type of data should the label column be?")?;
        writeln!(
            self.output,
            "Here's the label column's name for reference: {label_column}"
        )?;
        writeln!(self.output, "You have the following options:")?;
        for label_type in LabelType::ALL {
            writeln!(self.output, "* {label_type}")?;
        }
        write!(self.output, "> ")?;
        self.read_response()
    }

    fn request_label(&mut self, context: &LabelContext) -> Result<String, OracleError> {
        writeln!(self.output)?;
        for (column, value) in &context.features {
            writeln!(self.output, "{column} : {value}")?;
        }
        write!(
            self.output,
            "What label should the above data have? ({}) > ",
            context.label_type
        )?;
        self.read_response()
    }
}

/// Replays canned responses in order. Useful for tests and batch runs.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOracle {
    label_type: Option<String>,
    responses: VecDeque<String>,
    asked: Vec<RowId>,
}

impl ScriptedOracle {
    pub fn new<I, S>(label_type: impl Into<String>, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label_type: Some(label_type.into()),
            responses: responses.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Rows asked for a label so far, in prompt order.
    pub fn asked(&self) -> &[RowId] {
        &self.asked
    }
}

impl LabelOracle for ScriptedOracle {
    fn request_label_type(&mut self, _label_column: &str) -> Result<String, OracleError> {
        self.label_type.clone().ok_or(OracleError::Aborted)
    }

    fn request_label(&mut self, context: &LabelContext) -> Result<String, OracleError> {
        self.asked.push(context.row);
        self.responses.pop_front().ok_or(OracleError::Aborted)
    }
}

/// Answers labels from a closure over the row context.
pub struct FnOracle<F> {
    label_type: String,
    answer: F,
}

impl<F> FnOracle<F>
where
    F: FnMut(&LabelContext) -> String,
{
    pub fn new(label_type: impl Into<String>, answer: F) -> Self {
        Self {
            label_type: label_type.into(),
            answer,
        }
    }
}

impl<F> LabelOracle for FnOracle<F>
where
    F: FnMut(&LabelContext) -> String,
{
    fn request_label_type(&mut self, _label_column: &str) -> Result<String, OracleError> {
        Ok(self.label_type.clone())
    }

    fn request_label(&mut self, context: &LabelContext) -> Result<String, OracleError> {
        Ok((self.answer)(context))
    }
}
