//! ntprims CLI
//!
//! Command-line front end for the date-time parser, the DOSATTRIB
//! encoder and the wraparound 64-bit arithmetic.

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use ntprims::logging::{self, LogLevel};
use ntprims::{
    encode_dos_attrib_at, from_hex, parse_datetime, to_hex, AppConfig, DosInfo, EpochTimestamp,
    OutputFormat, Uint64,
};

/// ntprims - exact primitives for file metadata tooling
#[derive(Parser)]
#[command(name = "ntprims")]
#[command(author = "ntprims Contributors")]
#[command(version)]
#[command(about = "Date-time parsing, DOSATTRIB encoding and 64-bit wraparound arithmetic", long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Minimum log level (debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Append log lines to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a date-time into Unix seconds and nanoseconds
    Parse {
        /// Text such as 2020-02-29T12:34:56.5+09:00
        text: String,
    },

    /// Encode a DOSATTRIB blob and print it as hex
    Encode {
        /// Attribute word (decimal or 0x-prefixed hex)
        #[arg(short, long, value_parser = parse_u32)]
        attribute: u32,

        /// Creation time as date-time text
        #[arg(short, long, conflicts_with = "seconds")]
        datetime: Option<String>,

        /// Creation time as Unix seconds
        #[arg(short, long)]
        seconds: Option<Uint64>,

        /// Nanoseconds added to --seconds
        #[arg(short, long, default_value = "0")]
        nanos: u32,
    },

    /// Decode a hex DOSATTRIB blob
    Decode {
        /// Blob as hex, whitespace allowed
        hex: String,
    },

    /// Apply a 64-bit wraparound operation
    U64 {
        #[arg(value_enum)]
        op: Op,
        lhs: Uint64,
        rhs: Uint64,
    },

    /// Split a value into its lower and upper 32-bit words
    Words { value: Uint64 },

    /// Join lower and upper 32-bit words into one value
    FromWords {
        lower: u32,
        #[arg(default_value = "0")]
        upper: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Lt,
    Le,
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid attribute '{}': {}", s, e))
}

fn main() {
    let cli = Cli::parse();

    let config = AppConfig {
        log_level: cli.log_level,
        log_file: cli.log_file.clone(),
        output: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        },
    };

    if let Err(e) = logging::init(&config.log_config()) {
        eprintln!("{} cannot open log file: {}", style("Warning:").yellow().bold(), e);
    }
    logging::separator(&format!("ntprims {}", ntprims::VERSION));

    let result = match cli.command {
        Commands::Parse { text } => cmd_parse(&config, &text),

        Commands::Encode {
            attribute,
            datetime,
            seconds,
            nanos,
        } => cmd_encode(&config, attribute, datetime.as_deref(), seconds, nanos),

        Commands::Decode { hex } => cmd_decode(&config, &hex),

        Commands::U64 { op, lhs, rhs } => cmd_u64(&config, op, lhs, rhs),

        Commands::Words { value } => cmd_words(&config, value),

        Commands::FromWords { lower, upper } => cmd_from_words(&config, lower, upper),
    };

    logging::flush();

    if let Err(e) = result {
        logging::error("MAIN", &e.to_string());
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn print_timestamp(ts: EpochTimestamp) {
    println!("  {} {}", style("Seconds:").bold(), ts.seconds);
    println!("  {} {}", style("Nanoseconds:").bold(), ts.nanoseconds);
    println!("  {} {}", style("NT time:").bold(), ts.to_nt_time());
    match ts.to_datetime() {
        Some(dt) => println!("  {} {}", style("UTC:").bold(), style(dt.to_rfc3339()).cyan()),
        None => println!("  {} {}", style("UTC:").bold(), style("out of range").dim()),
    }
}

/// Parse command implementation
fn cmd_parse(config: &AppConfig, text: &str) -> ntprims::Result<()> {
    let ts = parse_datetime(text)?;

    if config.output == OutputFormat::Json {
        println!(
            "{}",
            serde_json::json!({
                "seconds": ts.seconds,
                "nanoseconds": ts.nanoseconds,
                "nt_time": ts.to_nt_time(),
                "utc": ts.to_datetime().map(|dt| dt.to_rfc3339()),
            })
        );
    } else {
        println!("{} {}", style("→").cyan().bold(), style(text).yellow());
        print_timestamp(ts);
    }
    Ok(())
}

/// Encode command implementation
fn cmd_encode(
    config: &AppConfig,
    attribute: u32,
    datetime: Option<&str>,
    seconds: Option<Uint64>,
    nanos: u32,
) -> ntprims::Result<()> {
    let created = match (datetime, seconds) {
        (Some(text), _) => parse_datetime(text)?,
        (None, Some(seconds)) => EpochTimestamp::new(seconds.get(), nanos),
        (None, None) => EpochTimestamp::UNIX_EPOCH,
    };
    let blob = encode_dos_attrib_at(attribute, created);

    if config.output == OutputFormat::Json {
        println!(
            "{}",
            serde_json::json!({
                "attribute": attribute,
                "create_time": created,
                "length": blob.len(),
                "hex": to_hex(&blob),
            })
        );
    } else {
        println!("{}", to_hex(&blob));
    }
    Ok(())
}

/// Decode command implementation
fn cmd_decode(config: &AppConfig, hex: &str) -> ntprims::Result<()> {
    let blob = from_hex(hex)?;
    let info = DosInfo::from_bytes(&blob)?;
    if info.hex_attribute != info.attribute {
        logging::warn(
            "DECODE",
            &format!(
                "hex text 0x{:x} disagrees with attribute word 0x{:x}",
                info.hex_attribute, info.attribute
            ),
        );
    }

    if config.output == OutputFormat::Json {
        println!(
            "{}",
            serde_json::json!({
                "info": info,
                "create_time": info.create_time(),
            })
        );
    } else {
        println!(
            "  {} 0x{:x} (text 0x{:x})",
            style("Attribute:").bold(),
            info.attribute,
            info.hex_attribute
        );
        println!("  {} {}", style("Version:").bold(), info.version);
        println!("  {} 0x{:x}", style("Valid flags:").bold(), info.valid_flags);
        if info.has_create_time() {
            print_timestamp(info.create_time());
        }
    }
    Ok(())
}

/// Arithmetic command implementation
fn cmd_u64(config: &AppConfig, op: Op, lhs: Uint64, rhs: Uint64) -> ntprims::Result<()> {
    let value = match op {
        Op::Add => lhs.add(rhs).to_string(),
        Op::Sub => lhs.sub(rhs).to_string(),
        Op::Mul => lhs.mul(rhs).to_string(),
        Op::Div => lhs.div(rhs)?.to_string(),
        Op::Mod => lhs.rem(rhs)?.to_string(),
        Op::Eq => lhs.eq(rhs).to_string(),
        Op::Lt => lhs.lt(rhs).to_string(),
        Op::Le => lhs.le(rhs).to_string(),
    };

    if config.output == OutputFormat::Json {
        println!("{}", serde_json::json!({ "result": value }));
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn cmd_words(config: &AppConfig, value: Uint64) -> ntprims::Result<()> {
    let (lower, upper) = value.to_words();
    if config.output == OutputFormat::Json {
        println!("{}", serde_json::json!({ "lower": lower, "upper": upper }));
    } else {
        println!("{} {}", lower, upper);
    }
    Ok(())
}

fn cmd_from_words(config: &AppConfig, lower: u32, upper: u32) -> ntprims::Result<()> {
    let value = Uint64::from_words(lower, upper);
    if config.output == OutputFormat::Json {
        println!(
            "{}",
            serde_json::json!({ "value": value, "approx": value.to_approx_f64() })
        );
    } else {
        println!("{}", value);
    }
    Ok(())
}
