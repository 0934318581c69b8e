//! Train a small network on a table of examples with online backpropagation.
//!
//! Usage: cargo run --example xor -- --data demos/xor.csv --hidden 3 --epochs 5000

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use csv::ReaderBuilder;
use ndarray::{s, Array2};
use synapse::{BackpropNetwork, NetworkConfig};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const XOR: [[f64; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [0.0, 1.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 0.0],
];

#[derive(Parser)]
#[command(name = "xor")]
#[command(about = "Train a feedforward network with online backpropagation", long_about = None)]
struct Cli {
    /// Headerless CSV; the first `--inputs` columns are inputs, the rest are targets.
    /// The XOR table is used when omitted.
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Number of input columns
    #[arg(long, default_value_t = 2)]
    inputs: usize,

    /// Number of hidden nodes
    #[arg(long, default_value_t = 3)]
    hidden: usize,

    /// Passes over the training examples
    #[arg(short, long, default_value_t = 5000)]
    epochs: usize,

    #[arg(long, default_value_t = 0.5)]
    learning_rate: f64,

    /// Seed for the initial weights
    #[arg(long)]
    seed: Option<u64>,

    /// Print the mean error every this many epochs
    #[arg(long, default_value_t = 500)]
    report_every: usize,

    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

fn load_rows(path: &Path) -> Result<Vec<Vec<f64>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    reader
        .records()
        .map(|record| {
            let record = record?;
            record
                .iter()
                .map(|field| {
                    field
                        .trim()
                        .parse::<f64>()
                        .with_context(|| format!("invalid number `{}`", field))
                })
                .collect()
        })
        .collect()
}

// Split rows into (inputs, targets) matrices.
fn split_columns(rows: Vec<Vec<f64>>, inputs: usize) -> Result<(Array2<f64>, Array2<f64>)> {
    let width = match rows.first() {
        Some(row) => row.len(),
        None => bail!("no training examples"),
    };
    if width <= inputs {
        bail!("rows have {} columns, need more than {} inputs", width, inputs);
    }
    if let Some(row) = rows.iter().find(|row| row.len() != width) {
        bail!("ragged row {:?}, expected {} columns", row, width);
    }

    let n = rows.len();
    let table = Array2::from_shape_vec((n, width), rows.into_iter().flatten().collect())?;
    Ok((
        table.slice(s![.., ..inputs]).to_owned(),
        table.slice(s![.., inputs..]).to_owned(),
    ))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let rows = match &cli.data {
        Some(path) => load_rows(path)?,
        None => XOR.iter().map(|row| row.to_vec()).collect(),
    };
    let (x, y) = split_columns(rows, cli.inputs)?;

    let mut config = NetworkConfig::new(x.ncols(), cli.hidden, y.ncols())
        .with_all_connections(true)
        .with_learning_rate(cli.learning_rate);
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    let mut trainer = BackpropNetwork::with_data(&config, x.view(), y.view())?;
    info!(
        examples = x.nrows(),
        connections = trainer.network().connection_count(),
        "training"
    );

    for epoch in 1..=cli.epochs {
        for _ in 0..x.nrows() {
            trainer.backpropagate()?;
        }
        if epoch % cli.report_every.max(1) == 0 {
            if let Some(error) = trainer.average_error().last() {
                println!("epoch {}: mean error = {}", epoch, error);
            }
        }
    }

    let network = trainer.network_mut();
    for (input, target) in x.rows().into_iter().zip(y.rows()) {
        network.set_inputs(&input.to_vec())?;
        network.calculate();
        println!(
            "{} -> {} (target {})",
            input,
            network.output_values(),
            target
        );
    }
    Ok(())
}
