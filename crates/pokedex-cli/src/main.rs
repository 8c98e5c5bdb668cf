mod classify;
mod display;
mod train;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use pokedex_ai::KnnClassifier;
use pokedex_core::PokedexConfig;

#[derive(Parser)]
#[command(name = "pokedex")]
#[command(version, about = "Classify Pokemon images with a pretrained CNN and a KNN classifier")]
struct Cli {
    /// JSON config file; every field is optional.
    #[arg(long, global = true, env = "POKEDEX_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Embed a directory of labelled images and save the trained dataset.
    Train {
        /// Directory with one subdirectory per class (`bulbasaur/`, `charmander/`, ...).
        data_dir: PathBuf,
        /// Directory containing the feature extractor's `model.onnx`.
        #[arg(long, env = "POKEDEX_MODEL")]
        model: PathBuf,
        /// Where to write the dataset.
        #[arg(long, env = "POKEDEX_DATASET", default_value = "model.json")]
        out: PathBuf,
        /// Add to the examples already in `--out` instead of starting fresh.
        #[arg(long)]
        append: bool,
    },
    /// Classify one image with the trained dataset.
    Classify {
        image: PathBuf,
        #[arg(long, env = "POKEDEX_MODEL")]
        model: PathBuf,
        #[arg(long, env = "POKEDEX_DATASET", default_value = "model.json")]
        dataset: PathBuf,
        /// Neighbours to consult (defaults to `classifier.k` from the config).
        #[arg(short)]
        k: Option<usize>,
        /// Print the prediction as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show the classes and example counts of a trained dataset.
    Inspect {
        #[arg(long, env = "POKEDEX_DATASET", default_value = "model.json")]
        dataset: PathBuf,
    },
    /// Remove every trained example from a dataset.
    Reset {
        #[arg(long, env = "POKEDEX_DATASET", default_value = "model.json")]
        dataset: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PokedexConfig> {
    match path {
        Some(path) => Ok(PokedexConfig::load(path)?),
        None => Ok(PokedexConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("pokedex v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Train {
            data_dir,
            model,
            out,
            append,
        } => {
            let stats = train::run_train(&model, &data_dir, &out, &config, append).await?;
            println!("{}", display::render_training(&stats.summary));
            println!(
                "Saved {} examples to {} in {:.1}s",
                stats.total_examples,
                out.display(),
                stats.elapsed_secs
            );
        }
        Command::Classify {
            image,
            model,
            dataset,
            k,
            json,
        } => {
            let k = k.unwrap_or(config.classifier.k);
            let prediction = classify::run_classify(&model, &dataset, &image, k, &config).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&prediction)?);
            } else {
                println!("{}", display::render_prediction(&prediction));
            }
        }
        Command::Inspect { dataset } => {
            let store = pokedex_store::load(&dataset)?;
            println!("{}", display::render_dataset(&store));
        }
        Command::Reset { dataset } => {
            let mut classifier = KnnClassifier::with_dataset(
                pokedex_store::load_or_empty(&dataset),
                config.classifier.metric,
            );
            let removed = classifier.num_examples();
            classifier.clear_all_classes();
            pokedex_store::save(&dataset, classifier.dataset())?;
            println!("Removed {removed} examples from {}", dataset.display());
        }
    }
    Ok(())
}
