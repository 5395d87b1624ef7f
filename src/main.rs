use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::Verbosity;
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use pcap_decode::{AnomalyGenerator, CaptureConfig, CaptureReader, GeneratorSettings, Pattern, TcpFlags};

#[derive(Parser)]
#[command(name = "pcap-decode", version, about = "Decode pcap captures and generate labeled synthetic traffic")]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Frames carry an 802.1Q tag
    #[arg(long, global = true)]
    vlan: bool,
    /// Log every raw header and record as hex
    #[arg(long, global = true)]
    hex: bool,
    #[command(flatten)]
    verbose: Verbosity,
}

#[derive(Subcommand)]
enum Command {
    /// Print every IP packet of a capture
    Dump {
        file: PathBuf,
    },
    /// Replay a capture with injected anomalies
    Generate {
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = PatternArg::Dos)]
        pattern: PatternArg,
        /// Share of anomalous packets, 0 disables injection
        #[arg(long)]
        percentage: Option<u8>,
        /// Number of packets to generate
        #[arg(short, long, default_value_t = 100)]
        count: usize,
        #[arg(long)]
        src_ip: Vec<Ipv4Addr>,
        #[arg(long)]
        dst_ip: Vec<Ipv4Addr>,
        #[arg(long)]
        src_port: Vec<u16>,
        #[arg(long)]
        dst_port: Vec<u16>,
        /// Raw TCP flags byte of the crafted packets
        #[arg(long)]
        flags: Vec<u8>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PatternArg {
    Custom,
    Dos,
    SynFlood,
}

impl From<PatternArg> for Pattern {
    fn from(arg: PatternArg) -> Self {
        match arg {
            PatternArg::Custom => Pattern::Custom,
            PatternArg::Dos => Pattern::Dos,
            PatternArg::SynFlood => Pattern::SynFlood,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Hex dumps are logged at info level
    let mut level = cli.verbose.log_level_filter();
    if cli.hex {
        level = level.max(LevelFilter::Info);
    }

    if let Err(e) = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto) {
        eprintln!("Unable to set up logging: {e}");
    }

    if let Err(e) = run(cli) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = CaptureConfig::default().with_vlan_tag(cli.vlan).with_verbose(cli.hex);

    match cli.command {
        Command::Dump { file } => dump(&file, config),
        Command::Generate { file, pattern, percentage, count, src_ip, dst_ip, src_port, dst_port, flags } => {
            let settings = GeneratorSettings {
                src_ips: src_ip,
                dst_ips: dst_ip,
                src_ports: src_port,
                dst_ports: dst_port,
                flags: flags.into_iter().map(TcpFlags::from_byte).collect(),
                percentage,
            };
            generate(&file, config, pattern.into(), &settings, count)
        },
    }
}

fn dump(file: &Path, config: CaptureConfig) -> Result<()> {
    let mut reader = CaptureReader::open(file, config)
        .with_context(|| format!("Failed to open {}", file.display()))?;

    let mut printed = 0_usize;
    while let Some(packet) = reader.read_next().context("Failed to read the capture")? {
        if packet.is_ip() {
            println!("{packet}");
            printed += 1;
        }
    }

    info!("{printed} IP packets out of {} records", reader.records_read());
    reader.close();
    Ok(())
}

fn generate(file: &Path, config: CaptureConfig, pattern: Pattern, settings: &GeneratorSettings, count: usize) -> Result<()> {
    let mut reader = CaptureReader::open(file, config)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    let mut generator = AnomalyGenerator::from_capture(&mut reader).context("Failed to read the capture")?;
    reader.close();

    generator
        .configure(pattern, settings)
        .context("Invalid generator settings")?;

    for generated in generator.take(count) {
        let label = if generated.anomalous { "ANOMALY" } else { "NORMAL" };
        println!("[{label}]");
        println!("{}", generated.packet);
    }

    Ok(())
}
