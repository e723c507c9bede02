/*!
This library scores multiclass classifiers from a confusion matrix. It is built
around three pieces:

* [`ConfusionMatrix`]: an ordered label set with the square grid of
  true-versus-predicted counts, constructed directly or tallied from prediction
  pairs, exposing the derived per-label counts (true/false positives, true/false
  negatives, support).
* The metrics [`Precision`], [`Recall`] and [`F1Score`], measuring a matrix either
  raw per label or reduced to a single scalar.
* The [`Average`] strategies `Macro`, `Micro` and `Weighted`, each dispatching to
  the [`Calculator`] that performs the reduction.

# Terminology
* A label is the string identifier of a class, such as `"cat"` or `"spam"`. A
  matrix keeps its labels in a fixed order and row/column indices follow it.
* Cell `(i, j)` of the matrix counts the instances whose true label is the `i`-th
  label and whose predicted label is the `j`-th label.
* The support of a label is the number of its true instances, the sum of its row.
* Macro averaging takes the unweighted mean of the per-label values, micro
  averaging recomputes globally from the counts, and weighted averaging weighs
  every label by its support.

Precision and recall values are rounded to 4 decimal places, F1 values to 2.

# Example
```rust
use confmat::{Average, ConfusionMatrix, Metric, Precision};

let matrix = ConfusionMatrix::new(
    &["A", "B", "C"],
    vec![vec![8, 1, 1], vec![2, 6, 2], vec![0, 3, 7]],
)
.unwrap();

let per_label = Precision::new().measure(&matrix).left().unwrap();
assert_eq!(
    per_label,
    vec![
        (String::from("A"), 0.8),
        (String::from("B"), 0.6),
        (String::from("C"), 0.7),
    ]
);

let aggregated = Precision::averaged(Average::Macro)
    .measure(&matrix)
    .right()
    .unwrap();
assert_eq!(aggregated, 0.7);
```
*/

mod average;
mod matrix;
mod metrics;
mod reporter;

// The public api starts here
pub use average::{
    Average, AverageParsingError, Calculator, MacroAverage, MicroAverage, WeightedAverage,
};

pub use matrix::{
    sort_labels, ConfusionMatrix, EmptyLabelsError, EvaluationError,
    InconsistentPredictionsError, LabelCounts, SizeMismatchError, UnknownLabelError,
};

pub use metrics::{
    classification_report, F1Score, LabelScores, Measurement, Metric, Precision, Recall,
};

pub use reporter::{ClassMetrics, Reporter};
