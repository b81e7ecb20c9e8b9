//! CLI frontend for the tabletop console dice service.

mod commands;

use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tt",
    about = "Tabletop console dice service and tools",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP and WebSocket server
    Serve {
        /// Interface to bind (overrides TT_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides TT_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Classify rolls that carry a resolver key
        #[arg(long)]
        enable_success_types: bool,
    },

    /// Roll dice locally, without any delay
    Roll {
        /// Number of dice
        num: i64,

        /// Faces per die
        size: i64,

        /// Reference value to classify each die against
        #[arg(short, long = "ref")]
        reference: Option<i64>,

        /// Resolver key: 20, 20b, 100 or 100b
        #[arg(short, long)]
        key: Option<String>,

        /// RNG seed for reproducible rolls
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Classify a single rolled value
    Classify {
        /// Resolver key: 20, 20b, 100 or 100b
        key: String,

        /// Reference value (skill or attribute)
        reference: i64,

        /// The rolled value
        value: i64,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            host,
            port,
            enable_success_types,
        } => commands::serve::run(host, port, enable_success_types),
        Commands::Roll {
            num,
            size,
            reference,
            key,
            seed,
        } => commands::roll::run(num, size, reference, key.as_deref(), seed),
        Commands::Classify {
            key,
            reference,
            value,
        } => commands::classify::run(&key, reference, value),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
