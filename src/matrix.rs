/*!
This module holds the confusion matrix itself: an immutable label set paired with a
square grid of true-versus-predicted counts, along with the per-label counts derived
from that grid (true/false positives, true/false negatives, support).
*/
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use ndarray::Array2;
use serde::Serialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{self, Display};

/// Per-label integer counts, in matrix label order.
pub type LabelCounts = Vec<(String, usize)>;

const CELL_WIDTH: usize = 8;
const ROW_LABEL_WIDTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The label set given to a constructor was empty.
pub struct EmptyLabelsError;

impl Display for EmptyLabelsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "labels cannot be empty")
    }
}
impl Error for EmptyLabelsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The matrix row count, or the width of one of its rows, does not match the label
/// count.
pub struct SizeMismatchError {
    pub expected: usize,
    pub found: usize,
}

impl Display for SizeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "matrix dimensions must match the label count: expected {}, found {}",
            self.expected, self.found
        )
    }
}
impl Error for SizeMismatchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The true/predicted label sequences cannot be tallied into a confusion matrix.
pub enum InconsistentPredictionsError {
    /// One of the input sequences is empty. The field names the offending input.
    EmptyInput(String),
    /// The true and predicted sequences have different lengths.
    LengthMismatch(usize, usize),
    /// Predicted labels that never occur in the true labels.
    PredictionsOutsideTruth(Vec<String>),
    /// The supplied label set omits labels present in the data. The list carries
    /// every offending label, the missing ones first.
    MissingLabels(Vec<String>),
    /// The supplied label set adds labels absent from the data. The list carries
    /// every offending label, the missing ones first.
    ExtraLabels(Vec<String>),
}

impl Display for InconsistentPredictionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput(which) => write!(f, "missing or empty labels: {}", which),
            Self::LengthMismatch(true_len, pred_len) => write!(
                f,
                "true and predicted labels must have the same length: {} != {}",
                true_len, pred_len
            ),
            Self::PredictionsOutsideTruth(labels) => write!(
                f,
                "each predicted label must be present in the true labels, unknown: [ {} ]",
                labels.iter().join(", ")
            ),
            Self::MissingLabels(labels) => write!(
                f,
                "the supplied labels must cover all dataset labels, missing: [ {} ]",
                labels.iter().join(", ")
            ),
            Self::ExtraLabels(labels) => write!(
                f,
                "the supplied labels contain labels absent from the dataset, extra: [ {} ]",
                labels.iter().join(", ")
            ),
        }
    }
}
impl Error for InconsistentPredictionsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A query named a label that is not part of the matrix's label set.
pub struct UnknownLabelError(pub String);

impl Display for UnknownLabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "label '{}' not found in the confusion matrix labels",
            self.0
        )
    }
}
impl Error for UnknownLabelError {}

#[derive(Debug, Clone, PartialEq)]
/// Enum error encompassing every way building or querying a confusion matrix can
/// fail.
pub enum EvaluationError {
    EmptyLabels(EmptyLabelsError),
    SizeMismatch(SizeMismatchError),
    InconsistentPredictions(InconsistentPredictionsError),
    UnknownLabel(UnknownLabelError),
}

impl Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLabels(err) => Display::fmt(err, f),
            Self::SizeMismatch(err) => Display::fmt(err, f),
            Self::InconsistentPredictions(err) => Display::fmt(err, f),
            Self::UnknownLabel(err) => Display::fmt(err, f),
        }
    }
}
impl Error for EvaluationError {}

impl From<EmptyLabelsError> for EvaluationError {
    fn from(value: EmptyLabelsError) -> Self {
        Self::EmptyLabels(value)
    }
}
impl From<SizeMismatchError> for EvaluationError {
    fn from(value: SizeMismatchError) -> Self {
        Self::SizeMismatch(value)
    }
}
impl From<InconsistentPredictionsError> for EvaluationError {
    fn from(value: InconsistentPredictionsError) -> Self {
        Self::InconsistentPredictions(value)
    }
}
impl From<UnknownLabelError> for EvaluationError {
    fn from(value: UnknownLabelError) -> Self {
        Self::UnknownLabel(value)
    }
}

/// Sorted, deduplicated copy of a label sequence.
pub fn sort_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    BTreeSet::from_iter(labels)
        .into_iter()
        .map(String::from)
        .collect()
}

/// A square table of true-versus-predicted label counts.
///
/// Cell `(i, j)` counts the instances whose true label is the `i`-th label and whose
/// predicted label is the `j`-th label. The label order is fixed at construction and
/// the matrix never changes afterwards, so reading it from several threads is safe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfusionMatrix {
    labels: Vec<String>,
    matrix: Array2<usize>,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from an already tallied grid.
    ///
    /// `rows` is taken row-major: `rows[i][j]` counts the instances with true label
    /// `labels[i]` predicted as `labels[j]`. Labels keep the order they are given
    /// in; they are not sorted or deduplicated here.
    ///
    /// Fails with [`EmptyLabelsError`] when `labels` is empty and with
    /// [`SizeMismatchError`] when the row count or the width of any row differs
    /// from the label count.
    pub fn new<S: AsRef<str>>(labels: &[S], rows: Vec<Vec<usize>>) -> Result<Self, EvaluationError> {
        if labels.is_empty() {
            return Err(EmptyLabelsError.into());
        }
        let size = labels.len();
        if rows.len() != size {
            return Err(SizeMismatchError {
                expected: size,
                found: rows.len(),
            }
            .into());
        }
        let mut cells = Vec::with_capacity(size * size);
        for row in &rows {
            if row.len() != size {
                return Err(SizeMismatchError {
                    expected: size,
                    found: row.len(),
                }
                .into());
            }
            cells.extend_from_slice(row);
        }
        let matrix = Array2::from_shape_vec((size, size), cells)
            .expect("a validated square grid always matches its own shape");
        Ok(Self {
            labels: labels.iter().map(|label| String::from(label.as_ref())).collect(),
            matrix,
        })
    }

    /// Tally true/predicted label pairs into a confusion matrix.
    ///
    /// The working label set defaults to the unique `y_true` labels and can be
    /// overridden with `labels`; either way it is sorted ascending and
    /// deduplicated, and the sorted order fixes the matrix indices.
    ///
    /// Fails with [`InconsistentPredictionsError`] when either sequence is empty,
    /// when their lengths differ, when a predicted label never occurs in `y_true`,
    /// or when the supplied `labels` disagree with the labels observed in the data.
    pub fn from_predictions(
        y_true: &[&str],
        y_pred: &[&str],
        labels: Option<&[&str]>,
    ) -> Result<Self, EvaluationError> {
        validate_predictions(y_true, y_pred)?;
        let resolved = match labels {
            Some(custom) => sort_labels(custom.iter().copied()),
            None => sort_labels(y_true.iter().copied()),
        };
        ensure_labels_consistent(y_true, y_pred, &resolved)?;
        Self::new(&resolved, tally(y_true, y_pred, &resolved))
    }

    /// The class labels, in the order that fixes the matrix indices.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Read-only view of the count grid.
    pub fn matrix(&self) -> &Array2<usize> {
        &self.matrix
    }

    /// Total number of tallied instances: the sum over every cell.
    pub fn total(&self) -> usize {
        self.matrix.sum()
    }

    fn index_of(&self, label: &str) -> Result<usize, UnknownLabelError> {
        self.labels
            .iter()
            .position(|known| known == label)
            .ok_or_else(|| UnknownLabelError(String::from(label)))
    }

    pub(crate) fn tp_at(&self, k: usize) -> usize {
        self.matrix[[k, k]]
    }

    pub(crate) fn fp_at(&self, k: usize) -> usize {
        self.matrix.column(k).sum() - self.tp_at(k)
    }

    pub(crate) fn fn_at(&self, k: usize) -> usize {
        self.matrix.row(k).sum() - self.tp_at(k)
    }

    pub(crate) fn tn_at(&self, k: usize) -> usize {
        self.total() - self.tp_at(k) - self.fp_at(k) - self.fn_at(k)
    }

    pub(crate) fn support_at(&self, k: usize) -> usize {
        self.matrix.row(k).sum()
    }

    /// True positives of `label`: its diagonal cell.
    ///
    /// Fails with [`UnknownLabelError`] when `label` is not part of the matrix.
    /// The other per-label count queries share that contract.
    pub fn true_positives(&self, label: &str) -> Result<usize, UnknownLabelError> {
        self.index_of(label).map(|k| self.tp_at(k))
    }

    /// False positives of `label`: its column sum without the diagonal cell.
    pub fn false_positives(&self, label: &str) -> Result<usize, UnknownLabelError> {
        self.index_of(label).map(|k| self.fp_at(k))
    }

    /// False negatives of `label`: its row sum without the diagonal cell.
    pub fn false_negatives(&self, label: &str) -> Result<usize, UnknownLabelError> {
        self.index_of(label).map(|k| self.fn_at(k))
    }

    /// True negatives of `label`: every cell outside its row and column.
    pub fn true_negatives(&self, label: &str) -> Result<usize, UnknownLabelError> {
        self.index_of(label).map(|k| self.tn_at(k))
    }

    /// Support of `label`: its row sum, the number of its true instances.
    pub fn support(&self, label: &str) -> Result<usize, UnknownLabelError> {
        self.index_of(label).map(|k| self.support_at(k))
    }

    /// True positives of every label, in label order.
    pub fn true_positives_per_label(&self) -> LabelCounts {
        self.per_label(Self::tp_at)
    }

    /// False positives of every label, in label order.
    pub fn false_positives_per_label(&self) -> LabelCounts {
        self.per_label(Self::fp_at)
    }

    /// False negatives of every label, in label order.
    pub fn false_negatives_per_label(&self) -> LabelCounts {
        self.per_label(Self::fn_at)
    }

    /// True negatives of every label, in label order.
    pub fn true_negatives_per_label(&self) -> LabelCounts {
        self.per_label(Self::tn_at)
    }

    /// Support of every label, in label order.
    pub fn support_per_label(&self) -> LabelCounts {
        self.per_label(Self::support_at)
    }

    fn per_label(&self, count: impl Fn(&Self, usize) -> usize) -> LabelCounts {
        self.labels
            .iter()
            .enumerate()
            .map(|(k, label)| (label.clone(), count(self, k)))
            .collect()
    }
}

/// Fixed-width table rendering: one 12-character row-label column followed by
/// 8-character right-aligned cells.
impl Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>width$}", "", width = ROW_LABEL_WIDTH)?;
        for label in &self.labels {
            write!(f, "{:>width$}", label, width = CELL_WIDTH)?;
        }
        writeln!(f)?;
        for (k, label) in self.labels.iter().enumerate() {
            write!(f, "{:>width$}", label, width = ROW_LABEL_WIDTH)?;
            for cell in self.matrix.row(k) {
                write!(f, "{:>width$}", cell, width = CELL_WIDTH)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn validate_predictions(
    y_true: &[&str],
    y_pred: &[&str],
) -> Result<(), InconsistentPredictionsError> {
    if y_true.is_empty() {
        return Err(InconsistentPredictionsError::EmptyInput(String::from(
            "y_true",
        )));
    }
    if y_pred.is_empty() {
        return Err(InconsistentPredictionsError::EmptyInput(String::from(
            "y_pred",
        )));
    }
    if y_true.len() != y_pred.len() {
        return Err(InconsistentPredictionsError::LengthMismatch(
            y_true.len(),
            y_pred.len(),
        ));
    }
    let known: AHashSet<&str> = y_true.iter().copied().collect();
    let foreign = sort_labels(y_pred.iter().copied().filter(|label| !known.contains(label)));
    if !foreign.is_empty() {
        return Err(InconsistentPredictionsError::PredictionsOutsideTruth(
            foreign,
        ));
    }
    Ok(())
}

fn ensure_labels_consistent(
    y_true: &[&str],
    y_pred: &[&str],
    labels: &[String],
) -> Result<(), InconsistentPredictionsError> {
    let dataset: BTreeSet<&str> = y_true.iter().chain(y_pred.iter()).copied().collect();
    let supplied: BTreeSet<&str> = labels.iter().map(String::as_str).collect();
    let missing: Vec<&str> = dataset.difference(&supplied).copied().collect();
    let extra: Vec<&str> = supplied.difference(&dataset).copied().collect();
    if missing.is_empty() && extra.is_empty() {
        return Ok(());
    }
    // Both kinds are reported in the same list, the missing labels first.
    let offending: Vec<String> = missing
        .iter()
        .chain(extra.iter())
        .map(|label| String::from(*label))
        .collect();
    if missing.is_empty() {
        Err(InconsistentPredictionsError::ExtraLabels(offending))
    } else {
        Err(InconsistentPredictionsError::MissingLabels(offending))
    }
}

fn tally(y_true: &[&str], y_pred: &[&str], labels: &[String]) -> Vec<Vec<usize>> {
    let index: AHashMap<&str, usize> = labels
        .iter()
        .enumerate()
        .map(|(k, label)| (label.as_str(), k))
        .collect();
    let size = labels.len();
    let mut rows = vec![vec![0usize; size]; size];
    for (true_label, predicted_label) in y_true.iter().zip(y_pred) {
        // Consistency validation guarantees both lookups succeed.
        if let (Some(&row), Some(&column)) = (index.get(true_label), index.get(predicted_label)) {
            rows[row][column] += 1;
        }
    }
    rows
}
