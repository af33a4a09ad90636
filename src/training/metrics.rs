//! Evaluation metrics for binary classification

use crate::schema::DependencyLabel;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Binary confusion counts, positive class = 1
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_positives: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let mut cm = Self::default();

        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (*t > 0.5, *p > 0.5) {
                (true, true) => cm.true_positives += 1,
                (false, true) => cm.false_positives += 1,
                (false, false) => cm.true_negatives += 1,
                (true, false) => cm.false_negatives += 1,
            }
        }

        cm
    }

    pub fn total(&self) -> usize {
        self.true_negatives + self.false_positives + self.false_negatives + self.true_positives
    }
}

/// Precision, recall and F1 for one class
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

impl ClassMetrics {
    fn from_counts(tp: usize, fp: usize, fn_: usize, support: usize) -> Self {
        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };
        let recall = if tp + fn_ > 0 {
            tp as f64 / (tp + fn_) as f64
        } else {
            0.0
        };
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            precision,
            recall,
            f1_score,
            support,
        }
    }
}

/// Metrics computed on a held-out set
///
/// The headline precision, recall and F1 score the positive (dependent)
/// class; per-class breakdowns carry the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub confusion: ConfusionMatrix,
    pub negative_class: ClassMetrics,
    pub positive_class: ClassMetrics,
    pub n_samples: usize,
}

impl ClassificationMetrics {
    /// Compute all metrics from true and predicted labels
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let confusion = ConfusionMatrix::from_predictions(y_true, y_pred);
        let ConfusionMatrix {
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_,
            true_positives: tp,
        } = confusion;

        let n_samples = confusion.total();
        let accuracy = if n_samples > 0 {
            (tp + tn) as f64 / n_samples as f64
        } else {
            0.0
        };

        let positive_class = ClassMetrics::from_counts(tp, fp, fn_, tp + fn_);
        // The negative class sees the same counts with the roles swapped
        let negative_class = ClassMetrics::from_counts(tn, fn_, fp, tn + fp);

        Self {
            accuracy,
            precision: positive_class.precision,
            recall: positive_class.recall,
            f1_score: positive_class.f1_score,
            confusion,
            negative_class,
            positive_class,
            n_samples,
        }
    }

    /// F1 of the positive class, used as the tuning score
    pub fn f1(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        Self::compute(y_true, y_pred).f1_score
    }

    /// Per-class text report
    pub fn classification_report(&self) -> String {
        let mut report = String::new();

        report.push_str(&format!(
            "{:<16} {:>9} {:>9} {:>9} {:>9}\n\n",
            "", "precision", "recall", "f1-score", "support"
        ));

        let rows = [
            (DependencyLabel::NotDependent, &self.negative_class),
            (DependencyLabel::Dependent, &self.positive_class),
        ];
        for (label, m) in rows {
            report.push_str(&format!(
                "{:<16} {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
                label.to_string(),
                m.precision,
                m.recall,
                m.f1_score,
                m.support
            ));
        }

        report.push_str(&format!(
            "\n{:<16} {:>9} {:>9} {:>9.2} {:>9}\n",
            "accuracy", "", "", self.accuracy, self.n_samples
        ));

        report
    }
}
