/*
 * The averaging side of the crate: the closed set of strategies and the calculator
 * each strategy dispatches to.
 */
use crate::matrix::ConfusionMatrix;
use crate::metrics::round_to;
use enum_iterator::Sequence;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{self, Display};
use std::str::FromStr;

/// Enumeration of the averaging strategies supported by this crate. `&str` can be
/// parsed into an `Average`.
#[derive(
    Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Sequence, Serialize, Deserialize,
)]
pub enum Average {
    /// Unweighted mean of the per-label values. Label imbalance is ignored.
    Macro,
    /// Global recomputation from the matrix counts. Every instance weighs equally.
    Micro,
    /// Mean of the per-label values, weighted by support.
    Weighted,
}

impl Average {
    /// The calculator implementing this strategy. The match is exhaustive: adding a
    /// strategy is a compile-time-visible change here.
    pub fn calculator(self) -> &'static dyn Calculator {
        match self {
            Average::Macro => &MacroAverage,
            Average::Micro => &MicroAverage,
            Average::Weighted => &WeightedAverage,
        }
    }
}

impl Display for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct AverageParsingError(String);

impl Display for AverageParsingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "impossible to parse the string ({}) into an Average",
            self.0
        )
    }
}
impl Error for AverageParsingError {}

impl FromStr for Average {
    type Err = AverageParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "macro" => Ok(Average::Macro),
            "micro" => Ok(Average::Micro),
            "weighted" => Ok(Average::Weighted),
            _ => Err(AverageParsingError(String::from(s))),
        }
    }
}

/// Reduces a per-label mapping, together with the matrix it was measured on, to a
/// single scalar.
pub trait Calculator {
    fn calculate(&self, matrix: &ConfusionMatrix, measures: &[(String, f64)]) -> f64;
}

/// Unweighted mean of the mapping values. The matrix is not consulted.
#[derive(Debug, Clone, Copy)]
pub struct MacroAverage;

impl Calculator for MacroAverage {
    fn calculate(&self, _matrix: &ConfusionMatrix, measures: &[(String, f64)]) -> f64 {
        let values = Array1::from_iter(measures.iter().map(|(_, value)| *value));
        values.mean().map_or(0.0, |mean| round_to(mean, 4))
    }
}

/// Recomputes the metric globally from the matrix counts; the supplied mapping is
/// ignored. For exhaustive single-label classification this one formula equals
/// micro precision, micro recall, micro F1 and accuracy, which is why all three
/// metrics share it.
#[derive(Debug, Clone, Copy)]
pub struct MicroAverage;

impl Calculator for MicroAverage {
    fn calculate(&self, matrix: &ConfusionMatrix, _measures: &[(String, f64)]) -> f64 {
        let mut true_positives = 0;
        let mut false_positives = 0;
        for k in 0..matrix.labels().len() {
            true_positives += matrix.tp_at(k);
            false_positives += matrix.fp_at(k);
        }
        let denominator = true_positives + false_positives;
        if denominator > 0 {
            round_to(true_positives as f64 / denominator as f64, 4)
        } else {
            0.0
        }
    }
}

/// Support-weighted mean of the mapping values. Support comes fresh from the
/// matrix: a mapping label the matrix does not know contributes a support of 0,
/// while the denominator stays the total support of the matrix labels.
#[derive(Debug, Clone, Copy)]
pub struct WeightedAverage;

impl Calculator for WeightedAverage {
    fn calculate(&self, matrix: &ConfusionMatrix, measures: &[(String, f64)]) -> f64 {
        if measures.is_empty() {
            return 0.0;
        }
        let supports = matrix.support_per_label();
        let total_support: usize = supports.iter().map(|(_, support)| support).sum();
        if total_support == 0 {
            return 0.0;
        }
        let weighted_sum: f64 = measures
            .iter()
            .map(|(label, value)| {
                let support = supports
                    .iter()
                    .find(|(known, _)| known == label)
                    .map_or(0, |(_, support)| *support);
                value * support as f64
            })
            .sum();
        round_to(weighted_sum / total_support as f64, 4)
    }
}
