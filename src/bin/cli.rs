//! PartDB CLI Binary
//!
//! Loads ratings, builds partition sets, and routes inserts against a
//! data directory.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use partdb::{Engine, PartError, Rating, SchemeKind};
use tracing_subscriber::{fmt, EnvFilter};

/// PartDB command-line interface
#[derive(Parser, Debug)]
#[command(name = "partdb")]
#[command(about = "Single-node partitioned ratings store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./partdb_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a ratings file (userId::itemId::score::timestamp) into the base collection
    Load {
        /// Path to the ratings file
        file: PathBuf,
    },

    /// Build (or rebuild) the partition set for a scheme
    Partition {
        /// Partitioning scheme
        #[arg(short, long, value_enum)]
        scheme: Scheme,

        /// Number of partitions
        #[arg(short, long)]
        count: usize,
    },

    /// Insert a single rating under the active scheme
    Insert {
        /// Partitioning scheme
        #[arg(short, long, value_enum)]
        scheme: Scheme,

        /// User id
        #[arg(short, long)]
        user: u64,

        /// Item id
        #[arg(short, long)]
        item: u64,

        /// Score in [0.0, 5.0]
        #[arg(long)]
        score: f64,
    },

    /// Show base collection and partition sizes
    Stats,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Scheme {
    Range,
    Roundrobin,
}

impl From<Scheme> for SchemeKind {
    fn from(scheme: Scheme) -> Self {
        match scheme {
            Scheme::Range => SchemeKind::Range,
            Scheme::Roundrobin => SchemeKind::RoundRobin,
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,partdb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = Args::parse();

    tracing::info!("PartDB v{}", partdb::VERSION);

    if let Err(e) = run(args) {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), PartError> {
    let engine = Engine::open_path(&args.data_dir)?;

    match args.command {
        Command::Load { file } => {
            let loaded = engine.load_ratings(&file)?;
            println!("Loaded {} ratings", loaded);
        }

        Command::Partition { scheme, count } => {
            let kind: SchemeKind = scheme.into();
            let sizes = engine.build_partitions(kind, count)?;
            println!("Built {} {} partitions", sizes.len(), kind);
            for (i, size) in sizes.iter().enumerate() {
                println!("  {}: {} records", kind.partition_name(i), size);
            }
        }

        Command::Insert {
            scheme,
            user,
            item,
            score,
        } => {
            let kind: SchemeKind = scheme.into();
            let index = engine.insert(kind, Rating::new(user, item, score))?;
            println!("Inserted into {}", kind.partition_name(index));
        }

        Command::Stats => {
            println!("Base collection: {} records", engine.base_count()?);
            for kind in [SchemeKind::Range, SchemeKind::RoundRobin] {
                let sizes = engine.partition_sizes(kind)?;
                if sizes.is_empty() {
                    println!("{}: no partitions", kind);
                    continue;
                }
                println!("{}: {} partitions", kind, sizes.len());
                for (i, size) in sizes.iter().enumerate() {
                    println!("  {}: {} records", kind.partition_name(i), size);
                }
            }
        }
    }

    engine.close()
}
