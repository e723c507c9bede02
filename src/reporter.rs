/*!
This module gives a few tools to collect and prettyprint the per-class and overall
metrics of a classification run.
*/
use crate::average::Average;
use crate::matrix::ConfusionMatrix;
use crate::metrics::{f1_scores, precision_scores, recall_scores};
use enum_iterator::all;
use itertools::multizip;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

/// The reporter holds the metrics of every class along with the overall averaged
/// rows. Displaying it prints the rows as if they were collected into a dataframe;
/// consuming it yields a `HashSet` of [`ClassMetrics`]. A reporter is built with
/// the [`classification_report`](crate::classification_report) function or from a
/// [`ConfusionMatrix`] reference.
///
/// # Example
///
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
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Reporter {
    pub(crate) classes: BTreeSet<ClassMetricsInner>,
}

impl Reporter {
    pub(crate) fn insert(&mut self, metrics: ClassMetricsInner) -> bool {
        self.classes.insert(metrics)
    }
}

/// Converting the reporter into a `HashSet` of `ClassMetrics` drops the display
/// ordering; rows are then looked up by class name and average.
impl From<Reporter> for HashSet<ClassMetrics> {
    fn from(value: Reporter) -> Self {
        value.classes.into_iter().map(ClassMetrics::from).collect()
    }
}

/// Builds the per-class rows and one overall row per averaging strategy. Overall
/// rows report the total instance count as their support.
impl From<&ConfusionMatrix> for Reporter {
    fn from(matrix: &ConfusionMatrix) -> Self {
        let precision = precision_scores(matrix);
        let recall = recall_scores(matrix);
        let f1 = f1_scores(matrix);
        let support = matrix.support_per_label();
        let mut reporter = Reporter::default();
        for (p, r, f, s) in multizip((
            precision.iter(),
            recall.iter(),
            f1.iter(),
            support.iter(),
        )) {
            reporter.insert(ClassMetricsInner {
                class: p.0.clone(),
                average: None,
                precision: p.1,
                recall: r.1,
                fscore: f.1,
                support: s.1,
            });
        }
        let total = matrix.total();
        for strategy in all::<Average>() {
            let calculator = strategy.calculator();
            reporter.insert(ClassMetricsInner::new_overall(
                strategy,
                calculator.calculate(matrix, &precision),
                calculator.calculate(matrix, &recall),
                calculator.calculate(matrix, &f1),
                total,
            ));
        }
        reporter
    }
}

/// The reporter acts as a dataframe when displayed.
impl Display for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Class, Precision, Recall, Fscore, Support")?;
        // Ascending set order keeps the overall rows last; the display wants them
        // first, so the set is walked backwards.
        for row in self.classes.iter().rev() {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Metrics of a single class, or of one of the overall rows.
pub struct ClassMetrics {
    /// The class label, or `Overall_<average>` for the aggregated rows.
    pub class: String,
    /// The averaging strategy behind this row; `None` for per-class rows.
    pub average: Option<Average>,
    /// Precision metric
    pub precision: f64,
    /// Recall metric
    pub recall: f64,
    /// Fscore metric
    pub fscore: f64,
    /// Support metric
    pub support: usize,
}

impl Hash for ClassMetrics {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.class.hash(state);
        self.average.hash(state);
    }
}

/// Rows are identified by class name and average, not by their metric values.
impl PartialEq for ClassMetrics {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.average == other.average
    }
}
impl Eq for ClassMetrics {}

impl From<ClassMetricsInner> for ClassMetrics {
    fn from(value: ClassMetricsInner) -> Self {
        Self {
            class: value.class,
            average: value.average,
            precision: value.precision,
            recall: value.recall,
            fscore: value.fscore,
            support: value.support,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
/// Metrics row of a single class. Rows cannot be constructed outside the crate and
/// carry a display implementation that renders them as the line of a dataframe.
pub(crate) struct ClassMetricsInner {
    pub(crate) class: String,
    pub(crate) average: Option<Average>,
    pub(crate) precision: f64,
    pub(crate) recall: f64,
    pub(crate) fscore: f64,
    pub(crate) support: usize,
}

impl PartialEq for ClassMetricsInner {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.average == other.average
    }
}
impl Eq for ClassMetricsInner {}

impl Ord for ClassMetricsInner {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.average, &other.average) {
            // Per-class rows compare in reverse name order: the display walks the
            // set backwards and wants them ascending.
            (None, None) => other.class.cmp(&self.class),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(_), Some(_)) => self.class.cmp(&other.class),
        }
    }
}

impl PartialOrd for ClassMetricsInner {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl ClassMetricsInner {
    pub(crate) fn new_overall(
        average: Average,
        precision: f64,
        recall: f64,
        fscore: f64,
        support: usize,
    ) -> Self {
        ClassMetricsInner {
            class: format!("Overall_{}", average),
            average: Some(average),
            precision,
            recall,
            fscore,
            support,
        }
    }
}

/// A class metrics row acts as a line in a dataframe when displayed.
impl Display for ClassMetricsInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}",
            self.class, self.precision, self.recall, self.fscore, self.support
        )
    }
}
