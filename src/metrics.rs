/*!
This module measures precision, recall and F1 over a confusion matrix, either raw
per label or reduced to a scalar by an averaging strategy configured at
construction.
*/
use crate::average::Average;
use crate::matrix::{ConfusionMatrix, EvaluationError};
use crate::reporter::Reporter;
use either::Either;
use num::Float;

/// Per-label metric values, in matrix label order.
pub type LabelScores = Vec<(String, f64)>;

/// What a measurement yields: the raw per-label mapping when no averaging strategy
/// was configured (`Left`), a single aggregated scalar otherwise (`Right`).
pub type Measurement = Either<LabelScores, f64>;

/// A classification metric, measured over a whole confusion matrix.
pub trait Metric {
    /// Compute the per-label values, then reduce them to a scalar when an averaging
    /// strategy was configured at construction.
    fn measure(&self, matrix: &ConfusionMatrix) -> Measurement;
}

/// Round `value` to `places` decimal places, half away from zero.
pub(crate) fn round_to<F: Float>(value: F, places: i32) -> F {
    let factor = F::from(10.0)
        .expect("a small integer constant always casts to a float type")
        .powi(places);
    (value * factor).round() / factor
}

fn measure_with(
    average: Option<Average>,
    matrix: &ConfusionMatrix,
    scores: LabelScores,
) -> Measurement {
    match average {
        None => Either::Left(scores),
        Some(strategy) => Either::Right(strategy.calculator().calculate(matrix, &scores)),
    }
}

fn precision_at(matrix: &ConfusionMatrix, k: usize) -> f64 {
    let true_positives = matrix.tp_at(k);
    let denominator = true_positives + matrix.fp_at(k);
    if denominator > 0 {
        true_positives as f64 / denominator as f64
    } else {
        0.0
    }
}

fn recall_at(matrix: &ConfusionMatrix, k: usize) -> f64 {
    let true_positives = matrix.tp_at(k);
    let denominator = true_positives + matrix.fn_at(k);
    if denominator > 0 {
        true_positives as f64 / denominator as f64
    } else {
        0.0
    }
}

pub(crate) fn precision_scores(matrix: &ConfusionMatrix) -> LabelScores {
    matrix
        .labels()
        .iter()
        .enumerate()
        .map(|(k, label)| (label.clone(), round_to(precision_at(matrix, k), 4)))
        .collect()
}

pub(crate) fn recall_scores(matrix: &ConfusionMatrix) -> LabelScores {
    matrix
        .labels()
        .iter()
        .enumerate()
        .map(|(k, label)| (label.clone(), round_to(recall_at(matrix, k), 4)))
        .collect()
}

pub(crate) fn f1_scores(matrix: &ConfusionMatrix) -> LabelScores {
    matrix
        .labels()
        .iter()
        .enumerate()
        .map(|(k, label)| {
            let precision = precision_at(matrix, k);
            let recall = recall_at(matrix, k);
            let denominator = precision + recall;
            // F1 is rounded to 2 decimal places, unlike precision and recall (4).
            let score = if denominator == 0.0 {
                0.0
            } else {
                round_to(2.0 * precision * recall / denominator, 2)
            };
            (label.clone(), score)
        })
        .collect()
}

/// Fraction of the predictions of a label that were correct: `TP / (TP + FP)`,
/// 0.0 when the label was never predicted. Rounded to 4 decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Precision {
    average: Option<Average>,
}

impl Precision {
    /// Raw mode: [`Metric::measure`] returns the per-label mapping.
    pub fn new() -> Self {
        Self { average: None }
    }

    /// Aggregated mode: [`Metric::measure`] reduces the mapping with `average`.
    pub fn averaged(average: Average) -> Self {
        Self {
            average: Some(average),
        }
    }
}

impl Metric for Precision {
    fn measure(&self, matrix: &ConfusionMatrix) -> Measurement {
        measure_with(self.average, matrix, precision_scores(matrix))
    }
}

/// Fraction of the true instances of a label that were found: `TP / (TP + FN)`,
/// 0.0 when the label has no true instances. Rounded to 4 decimal places. Also
/// known as sensitivity or true positive rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Recall {
    average: Option<Average>,
}

impl Recall {
    /// Raw mode: [`Metric::measure`] returns the per-label mapping.
    pub fn new() -> Self {
        Self { average: None }
    }

    /// Aggregated mode: [`Metric::measure`] reduces the mapping with `average`.
    pub fn averaged(average: Average) -> Self {
        Self {
            average: Some(average),
        }
    }
}

impl Metric for Recall {
    fn measure(&self, matrix: &ConfusionMatrix) -> Measurement {
        measure_with(self.average, matrix, recall_scores(matrix))
    }
}

/// Harmonic mean of precision and recall:
/// `2 * precision * recall / (precision + recall)`, 0.0 when both are zero. The
/// underlying precision and recall are recomputed unrounded; the harmonic mean is
/// then rounded to 2 decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct F1Score {
    average: Option<Average>,
}

impl F1Score {
    /// Raw mode: [`Metric::measure`] returns the per-label mapping.
    pub fn new() -> Self {
        Self { average: None }
    }

    /// Aggregated mode: [`Metric::measure`] reduces the mapping with `average`.
    pub fn averaged(average: Average) -> Self {
        Self {
            average: Some(average),
        }
    }
}

impl Metric for F1Score {
    fn measure(&self, matrix: &ConfusionMatrix) -> Measurement {
        measure_with(self.average, matrix, f1_scores(matrix))
    }
}

/// Main entrypoint of the library. Tallies the predictions into a confusion matrix
/// and reports precision, recall, F1 and support for every class, together with one
/// overall row per averaging strategy. The returned [`Reporter`] can be
/// prettyprinted or converted into a `HashSet`.
///
/// * `y_true`: ground-truth labels
/// * `y_pred`: predicted labels
/// * `labels`: optional custom label set; defaults to the unique `y_true` labels
///
/// # Example
/// ```rust
/// use confmat::classification_report;
///
/// let y_true = vec!["cat", "dog", "cat", "dog"];
/// let y_pred = vec!["dog", "cat", "cat", "cat"];
///
/// let reporter = classification_report(&y_true, &y_pred, None).unwrap();
///
/// let expected = "\
/// Class, Precision, Recall, Fscore, Support
/// Overall_Weighted, 0.1667, 0.25, 0.2, 4
/// Overall_Micro, 0.25, 0.25, 0.25, 4
/// Overall_Macro, 0.1667, 0.25, 0.2, 4
/// cat, 0.3333, 0.5, 0.4, 2
/// dog, 0, 0, 0, 2
/// ";
/// assert_eq!(expected, reporter.to_string());
/// ```
pub fn classification_report(
    y_true: &[&str],
    y_pred: &[&str],
    labels: Option<&[&str]>,
) -> Result<Reporter, EvaluationError> {
    let matrix = ConfusionMatrix::from_predictions(y_true, y_pred, labels)?;
    Ok(Reporter::from(&matrix))
}
