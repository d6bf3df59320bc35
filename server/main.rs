/// ferrite-mnist inference server
///
/// Serves a trained two-layer network over plain HTTP/JSON with tiny_http,
/// plus a single drawing page for trying it from a browser.
///
/// Run with:
///   cargo run --bin serve --release -- --model artifacts/model_mnist.json
///
/// Routes:
///   GET  /         drawing page
///   GET  /health   liveness check
///   POST /predict  {"pixels": [784 floats]} -> pred, probs, hidden

mod handlers;
mod render;
mod routes;
mod state;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tiny_http::Server;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ferrite_mnist::TwoLayerNet;
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "serve", about = "HTTP inference service for a trained MNIST model")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1:8000")]
    addr: String,

    /// Model file produced by `ferrite-mnist train`
    #[arg(long, default_value = "artifacts/model_mnist.json")]
    model: PathBuf,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to install logger")?;

    // No model, no service.
    let model = TwoLayerNet::load(&args.model)
        .with_context(|| format!("failed to load model from {}", args.model.display()))?;
    let state = AppState::new(model);

    let server = Server::http(&args.addr).map_err(|e| anyhow!("failed to bind {}: {}", args.addr, e))?;
    info!("listening on http://{}", args.addr);

    for request in server.incoming_requests() {
        let state = state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, &state);
        });
    }
    Ok(())
}
