use clap::{Parser, Subcommand};
use fastfile::archive::{decode_file_to, inspect, output_path_for, DecodeOptions};
use fastfile::{ByteOrder, KeyRegistry, Platform};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fastfile", about = "Decrypt and inflate FastFile containers")]
struct Cli {
    /// Log filter (e.g. info, debug, fastfile=trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a container into its concatenated zone data
    Decode {
        input: PathBuf,
        /// Output path (default: <input>.zone)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Platform whose key decrypts the sections
        #[arg(long, value_enum, default_value = "wiiu")]
        source: Platform,
        /// Platform version the header must declare
        #[arg(long, value_enum, default_value = "wiiu")]
        target: Platform,
        #[arg(long, value_enum, default_value = "big")]
        source_order: ByteOrder,
        #[arg(long, value_enum, default_value = "big")]
        target_order: ByteOrder,
        /// Print the decode summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show header fields without decoding
    Info {
        input: PathBuf,
        #[arg(long, value_enum, default_value = "big")]
        order: ByteOrder,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {

        // ── Decode ───────────────────────────────────────────────────────────
        Commands::Decode { input, output, source, target, source_order, target_order, json } => {
            let opts = DecodeOptions { source, target, source_order, target_order };
            let output = output.unwrap_or_else(|| output_path_for(&input));
            let summary = decode_file_to(&input, &output, opts, &KeyRegistry::builtin())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                for s in &summary.sections {
                    println!("  section {:>4}  lane {}  {:>10} -> {:>10} B",
                        s.index, s.lane, s.compressed_len, s.inflated_len);
                }
                println!("Wrote {} bytes from {} section(s) to {}",
                    summary.total_out, summary.sections.len(), output.display());
            }
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input, order, json } => {
            let header = inspect(BufReader::new(File::open(&input)?), order)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&header)?);
            } else {
                let platform = header.platform()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "unknown".into());
                println!("── FastFile ─────────────────────────────────────────────");
                println!("  Path        {}", input.display());
                println!("  Magic       {:?} (0x{:016X})", header.magic, header.magic.value());
                println!("  Version     0x{:08x} ({})", header.version, platform);
                println!("  Identifier  {}", header.name());
                println!("  Raw         {}", hex::encode(header.identifier));
            }
        }
    }

    Ok(())
}
