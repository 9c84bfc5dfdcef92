//! Interactive hand-labeling session.

use std::collections::BTreeSet;

use rand::Rng;
use tracing::{debug, info, warn};

use super::consistency::{ConsistencyReport, draw_sample, validate_fraction};
use super::error::LabelError;
use super::label::{Label, LabelType};
use super::oracle::{LabelContext, LabelOracle};
use crate::table::{RowId, Table, Value};

/// Bounds for [`HandLabelSession::run_until_consistent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPolicy {
    /// Passes always run before a perfect check may stop the loop.
    pub min_passes: u32,
    /// Hard upper bound on passes.
    pub max_passes: u32,
}

impl RunPolicy {
    /// Build a policy, forcing `1 <= max_passes` and `min_passes <= max_passes`.
    pub fn new(min_passes: u32, max_passes: u32) -> Self {
        let max_passes = max_passes.max(1);
        Self {
            min_passes: min_passes.min(max_passes),
            max_passes,
        }
    }
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self::new(1, 5)
    }
}

/// Why the consistency loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// A check reached full agreement after the minimum number of passes.
    Consistent,
    /// `max_passes` ran without a qualifying perfect check.
    PassLimitReached,
    /// The session never hand-labeled a row, so there was nothing to re-check.
    NothingToVerify,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Consistent => "consistent",
            RunStatus::PassLimitReached => "pass_limit_reached",
            RunStatus::NothingToVerify => "nothing_to_verify",
        }
    }
}

/// Result of the consistency loop. The labels themselves live in the caller's table.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// One report per pass, in pass order.
    pub reports: Vec<ConsistencyReport>,
    pub status: RunStatus,
}

/// Collects labels for rows with a null label column from a [`LabelOracle`].
///
/// The session remembers the declared label type and every row it has
/// hand-labeled, so later passes and consistency checks reuse both.
pub struct HandLabelSession<O> {
    oracle: O,
    label_type: Option<LabelType>,
    hand_labeled: BTreeSet<RowId>,
}

impl<O: LabelOracle> HandLabelSession<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            label_type: None,
            hand_labeled: BTreeSet::new(),
        }
    }

    /// Start a session whose label type is already known; the operator is not asked.
    pub fn with_label_type(oracle: O, label_type: LabelType) -> Self {
        Self {
            label_type: Some(label_type),
            ..Self::new(oracle)
        }
    }

    pub fn label_type(&self) -> Option<LabelType> {
        self.label_type
    }

    /// Rows hand-labeled by this session so far, ascending.
    pub fn hand_labeled(&self) -> Vec<RowId> {
        self.hand_labeled.iter().copied().collect()
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn into_oracle(self) -> O {
        self.oracle
    }

    /// Ask the operator for the label type and fix it for the session.
    pub fn declare_label_type(&mut self, label_column: &str) -> Result<LabelType, LabelError> {
        let response = self.oracle.request_label_type(label_column)?;
        let label_type = LabelType::parse(&response)?;
        info!("Label column {label_column:?} declared as {label_type}");
        self.label_type = Some(label_type);
        Ok(label_type)
    }

    fn ensure_label_type(&mut self, label_column: &str) -> Result<LabelType, LabelError> {
        match self.label_type {
            Some(label_type) => Ok(label_type),
            None => self.declare_label_type(label_column),
        }
    }

    /// Resolve the feature columns shown to the oracle.
    ///
    /// A non-empty request is used verbatim once every name is known to exist;
    /// otherwise all columns except `label_column`, in table order.
    pub fn select_feature_columns(
        table: &Table,
        label_column: &str,
        requested: &[String],
    ) -> Result<Vec<String>, LabelError> {
        if requested.is_empty() {
            return Ok(table
                .columns()
                .iter()
                .filter(|column| column.as_str() != label_column)
                .cloned()
                .collect());
        }
        for column in requested {
            require_column(table, column)?;
        }
        Ok(requested.to_vec())
    }

    /// Ask the oracle for one label per row, in the order given.
    ///
    /// Blocks until every row is answered; any failure aborts the whole batch.
    pub fn collect_labels(
        &mut self,
        table: &Table,
        rows: &[RowId],
        feature_columns: &[String],
        label_type: LabelType,
    ) -> Result<Vec<Label>, LabelError> {
        for column in feature_columns {
            require_column(table, column)?;
        }
        let mut labels = Vec::with_capacity(rows.len());
        for &row in rows {
            if row >= table.row_count() {
                return Err(LabelError::RowOutOfRange {
                    row,
                    row_count: table.row_count(),
                });
            }
            let features = feature_columns
                .iter()
                .map(|column| {
                    let value = table.get(row, column).cloned().unwrap_or_default();
                    (column.clone(), value)
                })
                .collect();
            let context = LabelContext {
                row,
                label_type,
                features,
            };
            let response = self.oracle.request_label(&context)?;
            labels.push(label_type.coerce(row, &response)?);
        }
        debug!("Collected {} label(s)", labels.len());
        Ok(labels)
    }

    /// Write `labels[i]` into `label_column` of `rows[i]`.
    ///
    /// Nothing is written unless every row exists and the lengths match.
    pub fn apply_labels(
        mut table: Table,
        label_column: &str,
        rows: &[RowId],
        labels: Vec<Label>,
    ) -> Result<(Table, Vec<RowId>), LabelError> {
        let written = write_labels(&mut table, label_column, rows, labels)?;
        Ok((table, written))
    }

    /// One labeling pass: label every row whose `label_column` is null.
    ///
    /// Labels are written into `table` in place, so rows labeled before a
    /// later failure keep their labels. The label type is only requested when
    /// there is something to label.
    pub fn hand_label(
        &mut self,
        table: &mut Table,
        label_column: &str,
        requested_columns: &[String],
    ) -> Result<Vec<RowId>, LabelError> {
        require_column(table, label_column)?;
        let unlabeled = table.null_rows(label_column);
        if unlabeled.is_empty() {
            debug!("No unlabeled rows in {label_column:?}");
            return Ok(Vec::new());
        }
        let label_type = self.ensure_label_type(label_column)?;
        let feature_columns = Self::select_feature_columns(table, label_column, requested_columns)?;
        info!(
            "Hand labeling {} row(s) using columns [{}]",
            unlabeled.len(),
            feature_columns.join(", ")
        );
        let labels = self.collect_labels(table, &unlabeled, &feature_columns, label_type)?;
        let labeled = write_labels(table, label_column, &unlabeled, labels)?;
        self.hand_labeled.extend(labeled.iter().copied());
        Ok(labeled)
    }

    /// Re-label a random sample of `labeled_rows` blind and measure agreement.
    ///
    /// Works on a copy: the recorded labels in `table` are never changed.
    pub fn verify_consistency(
        &mut self,
        table: &Table,
        labeled_rows: &[RowId],
        label_column: &str,
        feature_columns: &[String],
        sample_fraction: f64,
    ) -> Result<ConsistencyReport, LabelError> {
        self.verify_consistency_with_rng(
            table,
            labeled_rows,
            label_column,
            feature_columns,
            sample_fraction,
            &mut rand::rng(),
        )
    }

    /// [`Self::verify_consistency`] drawing the sample from `rng`.
    pub fn verify_consistency_with_rng<R: Rng + ?Sized>(
        &mut self,
        table: &Table,
        labeled_rows: &[RowId],
        label_column: &str,
        feature_columns: &[String],
        sample_fraction: f64,
        rng: &mut R,
    ) -> Result<ConsistencyReport, LabelError> {
        require_column(table, label_column)?;
        if let Some(&row) = labeled_rows.iter().find(|&&row| row >= table.row_count()) {
            return Err(LabelError::RowOutOfRange {
                row,
                row_count: table.row_count(),
            });
        }
        let sample = draw_sample(rng, labeled_rows, sample_fraction)?;
        let label_type = self.ensure_label_type(label_column)?;
        debug!(
            "Re-checking {} of {} labeled row(s)",
            sample.len(),
            labeled_rows.len()
        );

        let recorded: Vec<Value> = sample
            .iter()
            .map(|&row| table.get(row, label_column).cloned().unwrap_or_default())
            .collect();
        let mut blind = table.clone();
        for &row in &sample {
            blind.set(row, label_column, Value::Null);
        }
        let relabels = self.collect_labels(&blind, &sample, feature_columns, label_type)?;
        let (blind, rechecked) = Self::apply_labels(blind, label_column, &sample, relabels)?;
        let relabeled: Vec<Label> = rechecked
            .iter()
            .filter_map(|&row| blind.get(row, label_column))
            .filter_map(|value| label_from_value(value, label_type))
            .collect();

        let report = ConsistencyReport::compare(&sample, &recorded, &relabeled)?;
        info!(
            "Consistency check: {}/{} agree ({:.1}%)",
            report.agreement_count,
            report.sample_size,
            report.agreement_ratio * 100.0
        );
        for disagreement in &report.disagreements {
            warn!(
                "Row {} relabeled {:?}, recorded {:?}",
                disagreement.row, disagreement.relabeled, disagreement.original
            );
        }
        Ok(report)
    }

    /// Alternate labeling passes and consistency checks within `policy`.
    ///
    /// Each check samples from every row this session has hand-labeled so far.
    /// Disagreements are reported but never rewrite recorded labels. Labels
    /// land in `table` as each pass completes, so an error from a later check
    /// leaves the rows labeled so far in place.
    pub fn run_until_consistent(
        &mut self,
        table: &mut Table,
        label_column: &str,
        policy: RunPolicy,
        requested_columns: &[String],
        sample_fraction: f64,
    ) -> Result<RunOutcome, LabelError> {
        self.run_until_consistent_with_rng(
            table,
            label_column,
            policy,
            requested_columns,
            sample_fraction,
            &mut rand::rng(),
        )
    }

    /// [`Self::run_until_consistent`] drawing samples from `rng`.
    pub fn run_until_consistent_with_rng<R: Rng + ?Sized>(
        &mut self,
        table: &mut Table,
        label_column: &str,
        policy: RunPolicy,
        requested_columns: &[String],
        sample_fraction: f64,
        rng: &mut R,
    ) -> Result<RunOutcome, LabelError> {
        validate_fraction(sample_fraction)?;
        let policy = RunPolicy::new(policy.min_passes, policy.max_passes);
        let mut reports = Vec::new();
        for pass in 1..=policy.max_passes {
            self.hand_label(table, label_column, requested_columns)?;
            let labeled = self.hand_labeled();
            if labeled.is_empty() {
                info!("Nothing was hand labeled; skipping consistency checks");
                return Ok(RunOutcome {
                    reports,
                    status: RunStatus::NothingToVerify,
                });
            }
            let feature_columns =
                Self::select_feature_columns(table, label_column, requested_columns)?;
            let report = self.verify_consistency_with_rng(
                table,
                &labeled,
                label_column,
                &feature_columns,
                sample_fraction,
                &mut *rng,
            )?;
            let consistent = report.is_consistent();
            reports.push(report);
            if consistent && pass >= policy.min_passes {
                info!("Labels consistent after {pass} pass(es)");
                return Ok(RunOutcome {
                    reports,
                    status: RunStatus::Consistent,
                });
            }
        }
        warn!(
            "Labels still inconsistent after {} pass(es)",
            policy.max_passes
        );
        Ok(RunOutcome {
            reports,
            status: RunStatus::PassLimitReached,
        })
    }
}

fn require_column(table: &Table, column: &str) -> Result<(), LabelError> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(LabelError::MissingColumn {
            column: column.to_string(),
            available: table.columns().to_vec(),
        })
    }
}

/// Validate lengths and row bounds, then write every label in place.
fn write_labels(
    table: &mut Table,
    label_column: &str,
    rows: &[RowId],
    labels: Vec<Label>,
) -> Result<Vec<RowId>, LabelError> {
    require_column(table, label_column)?;
    if rows.len() != labels.len() {
        return Err(LabelError::LabelCountMismatch {
            rows: rows.len(),
            labels: labels.len(),
        });
    }
    if let Some(&row) = rows.iter().find(|&&row| row >= table.row_count()) {
        return Err(LabelError::RowOutOfRange {
            row,
            row_count: table.row_count(),
        });
    }
    for (&row, label) in rows.iter().zip(labels) {
        table.set(row, label_column, label.into());
    }
    Ok(rows.to_vec())
}

fn label_from_value(value: &Value, label_type: LabelType) -> Option<Label> {
    match (value, label_type) {
        (Value::Text(v), LabelType::String) => Some(Label::Text(v.clone())),
        (Value::Integer(v), LabelType::Integer) => Some(Label::Integer(*v)),
        (Value::Float(v), LabelType::Float) => Some(Label::Float(*v)),
        _ => None,
    }
}
