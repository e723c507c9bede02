use confmat::{
    classification_report, Average, ClassMetrics, ConfusionMatrix, EvaluationError,
    InconsistentPredictionsError, Metric, Precision, Recall, Reporter,
};
use std::collections::HashSet;

/// Expand a count grid back into the (true, predicted) pairs that tally to it.
fn pairs_from_grid(labels: &[&'static str], grid: &[&[usize]]) -> (Vec<&'static str>, Vec<&'static str>) {
    let mut y_true = Vec::new();
    let mut y_pred = Vec::new();
    for (i, row) in grid.iter().enumerate() {
        for (j, &count) in row.iter().enumerate() {
            for _ in 0..count {
                y_true.push(labels[i]);
                y_pred.push(labels[j]);
            }
        }
    }
    (y_true, y_pred)
}

#[test]
fn classification_report_prints_per_class_and_overall_rows() {
    let labels = ["A", "B", "C"];
    let grid: &[&[usize]] = &[&[8, 1, 1], &[2, 6, 2], &[0, 3, 7]];
    let (y_true, y_pred) = pairs_from_grid(&labels, grid);

    let reporter = classification_report(&y_true, &y_pred, None).unwrap();

    let expected = "\
Class, Precision, Recall, Fscore, Support
Overall_Weighted, 0.7, 0.7, 0.7, 30
Overall_Micro, 0.7, 0.7, 0.7, 30
Overall_Macro, 0.7, 0.7, 0.7, 30
A, 0.8, 0.8, 0.8, 10
B, 0.6, 0.6, 0.6, 10
C, 0.7, 0.7, 0.7, 10
";
    assert_eq!(reporter.to_string(), expected);
}

#[test]
fn reported_rows_can_be_consumed_as_a_hash_set() {
    let labels = ["A", "B", "C"];
    let grid: &[&[usize]] = &[&[80, 10, 10], &[15, 70, 15], &[5, 20, 75]];
    let (y_true, y_pred) = pairs_from_grid(&labels, grid);

    let reporter = classification_report(&y_true, &y_pred, None).unwrap();
    let rows: HashSet<ClassMetrics> = reporter.into();

    let probe = |class: &str, average: Option<Average>| ClassMetrics {
        class: String::from(class),
        average,
        precision: 0.0,
        recall: 0.0,
        fscore: 0.0,
        support: 0,
    };

    let class_b = rows.get(&probe("B", None)).unwrap();
    assert_eq!(class_b.precision, 0.7);
    assert_eq!(class_b.recall, 0.7);
    assert_eq!(class_b.fscore, 0.7);
    assert_eq!(class_b.support, 100);

    for average in [Average::Macro, Average::Micro, Average::Weighted] {
        let overall = rows
            .get(&probe(&format!("Overall_{average}"), Some(average)))
            .unwrap();
        assert_eq!(overall.precision, 0.75);
        assert_eq!(overall.recall, 0.75);
        assert_eq!(overall.fscore, 0.75);
        assert_eq!(overall.support, 300);
    }
}

#[test]
fn tallied_and_directly_constructed_matrices_agree() {
    let labels = ["A", "B", "C"];
    let grid: &[&[usize]] = &[&[8, 1, 1], &[2, 6, 2], &[0, 3, 7]];
    let (y_true, y_pred) = pairs_from_grid(&labels, grid);

    let tallied = ConfusionMatrix::from_predictions(&y_true, &y_pred, None).unwrap();
    let direct = ConfusionMatrix::new(
        &labels,
        vec![vec![8, 1, 1], vec![2, 6, 2], vec![0, 3, 7]],
    )
    .unwrap();

    assert_eq!(tallied, direct);
    assert_eq!(Reporter::from(&tallied), Reporter::from(&direct));
}

#[test]
fn custom_label_sets_must_match_the_data() {
    let y_true = vec!["cat", "dog", "cat"];
    let y_pred = vec!["cat", "cat", "cat"];
    let labels = vec!["cat", "dog", "bird"];

    let err = classification_report(&y_true, &y_pred, Some(&labels)).unwrap_err();
    assert_eq!(
        err,
        EvaluationError::InconsistentPredictions(InconsistentPredictionsError::ExtraLabels(
            vec![String::from("bird")]
        ))
    );
}

#[test]
fn metrics_and_report_use_the_same_rounded_values() {
    let y_true = vec!["cat", "dog", "cat", "dog", "dog"];
    let y_pred = vec!["cat", "cat", "cat", "dog", "cat"];

    let matrix = ConfusionMatrix::from_predictions(&y_true, &y_pred, None).unwrap();
    let precision = Precision::new().measure(&matrix).left().unwrap();
    let recall = Recall::averaged(Average::Weighted)
        .measure(&matrix)
        .right()
        .unwrap();

    let rows: HashSet<ClassMetrics> = Reporter::from(&matrix).into();
    for (label, value) in precision {
        let probe = ClassMetrics {
            class: label,
            average: None,
            precision: 0.0,
            recall: 0.0,
            fscore: 0.0,
            support: 0,
        };
        assert_eq!(rows.get(&probe).unwrap().precision, value);
    }
    let overall_probe = ClassMetrics {
        class: String::from("Overall_Weighted"),
        average: Some(Average::Weighted),
        precision: 0.0,
        recall: 0.0,
        fscore: 0.0,
        support: 0,
    };
    assert_eq!(rows.get(&overall_probe).unwrap().recall, recall);
}
