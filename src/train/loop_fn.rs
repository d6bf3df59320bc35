use std::time::Instant;

use tracing::{debug, info};

use crate::data::Dataset;
use crate::error::{NetError, Result};
use crate::metrics::accuracy;
use crate::network::TwoLayerNet;
use crate::train::batch::BatchIterator;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` for `config.epochs` epochs of mini-batch SGD and returns
/// the statistics of every completed epoch.
///
/// Each epoch walks a fresh [`BatchIterator`] seeded with
/// `config.seed + epoch`, calls [`TwoLayerNet::train_step`] per batch and
/// then measures accuracy on the leading `config.train_eval_samples`
/// training rows and, when given, on the whole test set.
///
/// # Errors
/// - `NetError::Config` if the config is invalid
/// - `NetError::Data` if the training set is empty or holds labels the
///   network cannot output
/// - `NetError::ShapeMismatch` if the feature count differs from the
///   network's input width
pub fn train_loop(
    network: &mut TwoLayerNet,
    train: &Dataset,
    test: Option<&Dataset>,
    config: &TrainConfig,
) -> Result<Vec<EpochStats>> {
    config.validate()?;
    check_dataset("training set", network, train)?;
    if train.is_empty() {
        return Err(NetError::Data("training set is empty".into()));
    }
    if let Some(test) = test {
        check_dataset("test set", network, test)?;
    }

    let eval_subset = train.head(config.train_eval_samples);
    let mut history = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        let train_loss = run_one_epoch(network, train, config, epoch);

        let train_accuracy = evaluate(network, &eval_subset);
        let test_accuracy = test.map(|t| evaluate(network, t));
        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        match test_accuracy {
            Some(test_acc) => info!(
                "Epoch {}/{} | loss={:.4} | train_acc~={:.4} | test_acc={:.4}",
                epoch, config.epochs, train_loss, train_accuracy, test_acc
            ),
            None => info!(
                "Epoch {}/{} | loss={:.4} | train_acc~={:.4}",
                epoch, config.epochs, train_loss, train_accuracy
            ),
        }

        history.push(EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            train_accuracy,
            test_accuracy,
            elapsed_ms,
        });
    }

    Ok(history)
}

/// Accuracy of `network` on a dataset; 0 for an empty dataset.
pub fn evaluate(network: &TwoLayerNet, dataset: &Dataset) -> f64 {
    if dataset.is_empty() {
        return 0.0;
    }
    accuracy(&network.predict(&dataset.images), &dataset.labels)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// One pass of mini-batch SGD. Returns the mean of the batch losses.
fn run_one_epoch(network: &mut TwoLayerNet, train: &Dataset, config: &TrainConfig, epoch: usize) -> f64 {
    let seed = config.seed.wrapping_add(epoch as u64);
    let batches = BatchIterator::new(train, config.batch_size, config.shuffle, seed);
    let n_batches = batches.len();

    let mut total_loss = 0.0f64;
    for (i, (xb, yb)) in batches.enumerate() {
        let loss = network.train_step(&xb, &yb, config.learning_rate);
        total_loss += loss as f64;
        if (i + 1) % 100 == 0 {
            debug!(epoch, batch = i + 1, of = n_batches, loss, "progress");
        }
    }
    total_loss / n_batches as f64
}

fn check_dataset(name: &str, network: &TwoLayerNet, dataset: &Dataset) -> Result<()> {
    if dataset.features() != network.input_dim() && !dataset.is_empty() {
        return Err(NetError::shape(name, network.input_dim(), dataset.features()));
    }
    if let Some(&bad) = dataset.labels.iter().find(|&&y| y >= network.num_classes()) {
        return Err(NetError::Data(format!(
            "{} holds label {} but the network has {} classes",
            name, bad, network.num_classes()
        )));
    }
    Ok(())
}
