//! mixwire CLI Application
//!
//! A command-line interface for decoding and building wire payloads.

use clap::{Parser, Subcommand};
use mixwire::cli::{self, VersionOverrides};
use mixwire::wire::PROTOCOL_VERSION;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mixwire")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Inspect addrv2 and mixing wire messages", long_about = None)]
struct Cli {
    /// JSON file with protocol version thresholds
    #[arg(long, global = true)]
    versions_file: Option<PathBuf>,

    /// Version at which addrv2 becomes valid
    #[arg(long, global = true)]
    addr_v2_version: Option<u32>,

    /// Version at which Tor v3 addresses are relayed
    #[arg(long, global = true)]
    tor_v3_version: Option<u32>,

    /// Version at which mixing messages become valid
    #[arg(long, global = true)]
    mix_version: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a message payload given as hex
    Decode {
        /// Command string, e.g. addrv2 or mixpr
        #[arg(short, long)]
        command: String,

        /// Negotiated protocol version
        #[arg(short, long, default_value_t = PROTOCOL_VERSION)]
        pver: u32,

        /// Check signatures against the identity the message carries
        #[arg(long)]
        verify: bool,

        /// Payload bytes in hex
        payload: String,
    },

    /// Build an addrv2 payload from ip:port pairs
    EncodeAddrs {
        /// Negotiated protocol version
        #[arg(short, long, default_value_t = PROTOCOL_VERSION)]
        pver: u32,

        /// Advertised service bits
        #[arg(short, long, default_value_t = 1)]
        services: u64,

        /// Addresses as ip:port
        #[arg(required = true)]
        addrs: Vec<String>,
    },

    /// Show category, routability and group of IP addresses
    Classify {
        #[arg(required = true)]
        addrs: Vec<String>,
    },

    /// Generate a mixing session identity
    Keygen,

    /// Print the effective protocol version thresholds
    Versions,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let overrides = VersionOverrides {
        addr_v2: cli.addr_v2_version,
        tor_v3_relay: cli.tor_v3_version,
        mix: cli.mix_version,
    };
    let versions = cli::resolve_versions(cli.versions_file.as_deref(), overrides)?;

    match cli.command {
        Commands::Decode {
            command,
            pver,
            verify,
            payload,
        } => {
            cli::cmd_decode(&versions, &command, pver, &payload, verify)?;
        }

        Commands::EncodeAddrs {
            pver,
            services,
            addrs,
        } => {
            cli::cmd_encode_addrs(&versions, pver, &addrs, services)?;
        }

        Commands::Classify { addrs } => {
            cli::cmd_classify(&addrs)?;
        }

        Commands::Keygen => {
            cli::cmd_keygen()?;
        }

        Commands::Versions => {
            cli::cmd_versions(&versions)?;
        }
    }

    Ok(())
}
