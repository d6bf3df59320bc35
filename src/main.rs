//! Command-line driver for ferrite-mnist.
//!
//! Usage:
//!   cargo run --release -- train --epochs 5
//!   cargo run --release -- confusion
//!   cargo run --release -- classify digit.png --invert

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::{rngs::StdRng, seq::index::sample, SeedableRng};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ferrite_mnist::data::preprocess::image_bytes_to_input;
use ferrite_mnist::network::NUM_CLASSES;
use ferrite_mnist::train::evaluate;
use ferrite_mnist::{
    top_k, train_loop, ConfusionMatrix, DataConfig, DataSource, Dataset, Matrix, TrainConfig, TwoLayerNet,
};

#[derive(Parser, Debug)]
#[command(name = "ferrite-mnist")]
#[command(about = "Train, evaluate and query a two-layer MNIST classifier")]
struct Cli {
    #[command(flatten)]
    data: DataArgs,

    /// Model file to write (train) or read (everything else)
    #[arg(long, global = true, default_value = "artifacts/model_mnist.json")]
    model: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct DataArgs {
    /// Directory with the four MNIST IDX files
    #[arg(long, global = true, default_value = "data/mnist")]
    data_dir: PathBuf,

    /// Read a single ARFF export instead of the IDX directory
    #[arg(long, global = true)]
    arff: Option<PathBuf>,

    /// Test fraction when splitting an ARFF export
    #[arg(long, global = true, default_value = "0.2")]
    test_size: f64,

    /// Shuffle seed when splitting an ARFF export
    #[arg(long, global = true, default_value = "42")]
    split_seed: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print dataset shapes and value ranges
    Data,
    /// Train a fresh network and save it
    Train(TrainArgs),
    /// Report test accuracy of a saved model
    Eval,
    /// Confusion matrix, per-class accuracy and top confusions on the test set
    Confusion {
        /// Number of off-diagonal confusions to list
        #[arg(long, default_value = "10")]
        top: usize,
    },
    /// Show predictions for random test samples
    Predict {
        #[arg(long, default_value = "10")]
        count: usize,
        #[arg(long, default_value = "0")]
        seed: u64,
    },
    /// Classify an image file (PNG/JPEG/BMP/GIF)
    Classify {
        image: PathBuf,
        /// Invert intensities (for dark digits on a light background)
        #[arg(long)]
        invert: bool,
        #[arg(long, default_value = "3")]
        top: usize,
    },
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// JSON TrainConfig; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    epochs: Option<usize>,
    #[arg(long)]
    batch_size: Option<usize>,
    #[arg(long)]
    lr: Option<f32>,
    #[arg(long)]
    hidden: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
}

impl DataArgs {
    fn to_config(&self) -> DataConfig {
        let source = match &self.arff {
            Some(path) => DataSource::Arff { path: path.clone() },
            None => DataSource::Idx { dir: self.data_dir.clone() },
        };
        DataConfig { source, test_size: self.test_size, split_seed: self.split_seed }
    }
}

impl TrainArgs {
    fn to_config(&self) -> Result<TrainConfig> {
        let mut config = match &self.config {
            Some(path) => TrainConfig::load_json(path)
                .with_context(|| format!("cannot read training config {}", path.display()))?,
            None => TrainConfig::default(),
        };
        if let Some(v) = self.epochs { config.epochs = v; }
        if let Some(v) = self.batch_size { config.batch_size = v; }
        if let Some(v) = self.lr { config.learning_rate = v; }
        if let Some(v) = self.hidden { config.hidden_dim = v; }
        if let Some(v) = self.seed { config.seed = v; }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to install logger")?;

    let data = cli.data.to_config();
    match &cli.command {
        Command::Data => cmd_data(&data),
        Command::Train(args) => cmd_train(&data, args, &cli.model),
        Command::Eval => cmd_eval(&data, &cli.model),
        Command::Confusion { top } => cmd_confusion(&data, &cli.model, *top),
        Command::Predict { count, seed } => cmd_predict(&data, &cli.model, *count, *seed),
        Command::Classify { image, invert, top } => cmd_classify(&cli.model, image, *invert, *top),
    }
}

fn load_data(config: &DataConfig) -> Result<(Dataset, Dataset)> {
    config.load_split().context("failed to load dataset")
}

fn load_model(path: &Path) -> Result<TwoLayerNet> {
    TwoLayerNet::load(path).with_context(|| format!("failed to load model from {}", path.display()))
}

/// Rejects a model whose input width does not match the dataset rows.
fn check_features(model: &TwoLayerNet, dataset: &Dataset) -> Result<()> {
    if model.input_dim() != dataset.features() {
        anyhow::bail!(
            "model expects {} input features but the dataset has {}",
            model.input_dim(),
            dataset.features()
        );
    }
    Ok(())
}

fn cmd_data(config: &DataConfig) -> Result<()> {
    let (train, test) = load_data(config)?;
    println!("Train shapes: ({}, {}) ({},)", train.len(), train.features(), train.labels.len());
    println!("Test shapes:  ({}, {}) ({},)", test.len(), test.features(), test.labels.len());
    println!(
        "X min/max:    {} {}",
        train.images.min_value().unwrap_or(0.0),
        train.images.max_value().unwrap_or(0.0)
    );
    println!("Labels:       {:?}", train.classes());
    println!("Features:     {} (should be 784)", train.features());
    Ok(())
}

fn cmd_train(data: &DataConfig, args: &TrainArgs, model_path: &Path) -> Result<()> {
    let config = args.to_config()?;
    let (train, test) = load_data(data)?;

    let mut network = TwoLayerNet::new(train.features(), config.hidden_dim, NUM_CLASSES, config.seed);
    info!(
        epochs = config.epochs,
        batch_size = config.batch_size,
        learning_rate = config.learning_rate,
        hidden_dim = config.hidden_dim,
        "training"
    );
    train_loop(&mut network, &train, Some(&test), &config)?;

    network.save(model_path).with_context(|| format!("failed to save model to {}", model_path.display()))?;
    println!("Saved model to: {}", model_path.display());
    Ok(())
}

fn cmd_eval(data: &DataConfig, model_path: &Path) -> Result<()> {
    let model = load_model(model_path)?;
    let (_, test) = load_data(data)?;
    check_features(&model, &test)?;
    println!("Test accuracy: {}", evaluate(&model, &test));
    Ok(())
}

fn cmd_confusion(data: &DataConfig, model_path: &Path, top: usize) -> Result<()> {
    let model = load_model(model_path)?;
    let (_, test) = load_data(data)?;
    check_features(&model, &test)?;

    let predicted = model.predict(&test.images);
    let cm = ConfusionMatrix::covering(&test.labels, &predicted, NUM_CLASSES.max(model.num_classes()));

    println!("Overall test accuracy: {}", cm.overall_accuracy());
    println!("\nConfusion matrix (rows=true, cols=pred):\n");
    print!("{}", cm);

    println!("\nPer-class accuracy:");
    let row_sums = cm.row_sums();
    for (class, acc) in cm.per_class_accuracy().iter().enumerate() {
        println!("  {}: {:.4}  (n={})", class, acc, row_sums[class]);
    }

    println!("\nTop confusions (true -> pred : count):");
    for c in cm.top_confusions(top) {
        println!("  {} -> {} : {}", c.truth, c.predicted, c.count);
    }
    Ok(())
}

fn cmd_predict(data: &DataConfig, model_path: &Path, count: usize, seed: u64) -> Result<()> {
    let model = load_model(model_path)?;
    let (_, test) = load_data(data)?;
    check_features(&model, &test)?;

    let count = count.min(test.len());
    let picked = sample(&mut StdRng::seed_from_u64(seed), test.len(), count).into_vec();
    let subset = test.select(&picked);

    let probs = model.predict_proba(&subset.images);
    let predicted = probs.argmax_rows();

    for (i, row) in probs.iter_rows().enumerate() {
        println!("Example {}", i + 1);
        println!("  true: {}  pred: {}", subset.labels[i], predicted[i]);
        println!("  top-3: {:?}", top_k(row, 3));
        println!();
    }
    Ok(())
}

fn cmd_classify(model_path: &Path, image: &Path, invert: bool, top: usize) -> Result<()> {
    let model = load_model(model_path)?;
    let bytes = std::fs::read(image).with_context(|| format!("cannot read {}", image.display()))?;
    let pixels = image_bytes_to_input(&bytes, invert)?;
    if pixels.len() != model.input_dim() {
        anyhow::bail!("model expects {} inputs, image yields {}", model.input_dim(), pixels.len());
    }

    let x = Matrix::from_vec(1, pixels.len(), pixels);
    let probs = model.predict_proba(&x);
    let ranked = top_k(probs.row(0), top);
    if let Some((class, p)) = ranked.first() {
        println!("Prediction: {} ({:.2}%)", class, p * 100.0);
    }
    for (class, p) in &ranked {
        println!("  {}: {:.4}", class, p);
    }
    Ok(())
}
