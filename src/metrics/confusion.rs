use std::fmt;

/// Counts of (true class, predicted class) pairs.
///
/// `counts[t][p]` is the number of samples of true class `t` predicted as
/// `p`. Rows are true classes, columns predicted classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<u64>>,
}

/// One off-diagonal cell of a confusion matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confusion {
    pub truth: usize,
    pub predicted: usize,
    pub count: u64,
}

impl ConfusionMatrix {
    /// # Panics
    /// Panics if the slices differ in length or a label is `>= num_classes`.
    pub fn new(truth: &[usize], predicted: &[usize], num_classes: usize) -> ConfusionMatrix {
        assert_eq!(truth.len(), predicted.len(), "ConfusionMatrix: {} labels but {} predictions", truth.len(), predicted.len());
        let mut counts = vec![vec![0u64; num_classes]; num_classes];
        for (&t, &p) in truth.iter().zip(predicted) {
            assert!(t < num_classes && p < num_classes, "ConfusionMatrix: class out of range ({} -> {})", t, p);
            counts[t][p] += 1;
        }
        ConfusionMatrix { counts }
    }

    /// Like [`ConfusionMatrix::new`], but grows past `min_classes` to fit
    /// every label and prediction seen, so it never panics on range.
    pub fn covering(truth: &[usize], predicted: &[usize], min_classes: usize) -> ConfusionMatrix {
        let num_classes = truth
            .iter()
            .chain(predicted)
            .map(|&c| c + 1)
            .max()
            .unwrap_or(0)
            .max(min_classes);
        ConfusionMatrix::new(truth, predicted, num_classes)
    }

    pub fn num_classes(&self) -> usize {
        self.counts.len()
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u64 {
        self.counts[truth][predicted]
    }

    pub fn row_sums(&self) -> Vec<u64> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn total(&self) -> u64 {
        self.row_sums().iter().sum()
    }

    /// Trace over total; 0 when empty.
    pub fn overall_accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: u64 = (0..self.num_classes()).map(|i| self.counts[i][i]).sum();
        correct as f64 / total as f64
    }

    /// Correct / total for each true class; 0 for a class with no samples.
    pub fn per_class_accuracy(&self) -> Vec<f64> {
        self.row_sums()
            .iter()
            .enumerate()
            .map(|(i, &n)| if n > 0 { self.counts[i][i] as f64 / n as f64 } else { 0.0 })
            .collect()
    }

    /// Non-zero off-diagonal cells, largest count first. Equal counts keep
    /// row-major order.
    pub fn top_confusions(&self, limit: usize) -> Vec<Confusion> {
        let mut cells: Vec<Confusion> = Vec::new();
        for (t, row) in self.counts.iter().enumerate() {
            for (p, &count) in row.iter().enumerate() {
                if t != p && count > 0 {
                    cells.push(Confusion { truth: t, predicted: p, count });
                }
            }
        }
        cells.sort_by(|a, b| b.count.cmp(&a.count));
        cells.truncate(limit);
        cells
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .counts
            .iter()
            .flatten()
            .map(|c| c.to_string().len())
            .max()
            .unwrap_or(1)
            .max(self.num_classes().to_string().len());

        write!(f, "{:>w$} |", "t\\p", w = width.max(3))?;
        for p in 0..self.num_classes() {
            write!(f, " {:>w$}", p, w = width)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "-".repeat(width.max(3) + 2 + (width + 1) * self.num_classes()))?;
        for (t, row) in self.counts.iter().enumerate() {
            write!(f, "{:>w$} |", t, w = width.max(3))?;
            for c in row {
                write!(f, " {:>w$}", c, w = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
