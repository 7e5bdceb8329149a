//! # textcodec CLI - Streaming Text Encoding Converter
//!
//! Command-line front end for converting, detecting and validating text
//! encodings without loading whole files into memory.

#[cfg(feature = "cli")]
use std::fs::File;
#[cfg(feature = "cli")]
use std::io::{self, BufReader, BufWriter, Read, Write};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use std::time::Instant;

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use serde::Serialize;
#[cfg(feature = "cli")]
use tracing::{debug, info, warn};
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
use textcodec::{Codec, CodecInfo, ConversionFlags, DetectionSource, Detector, Registry};

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features disabled. Enable with --features cli");
    std::process::exit(1);
}

/// textcodec: streaming character encoding converter
#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "textcodec")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Convert a stream between character encodings
    Convert(ConvertArgs),

    /// Detect the encoding of input from its BOM or charset declaration
    Detect(DetectArgs),

    /// List all supported encodings
    List(ListArgs),

    /// Validate that input is properly encoded
    Validate(ValidateArgs),

    /// Display detailed information about an encoding
    Info(InfoArgs),
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ConvertArgs {
    /// Source encoding
    #[arg(short = 'f', long = "from")]
    from: EncodingArg,

    /// Target encoding
    #[arg(short = 't', long = "to")]
    to: EncodingArg,

    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Drop a byte-order mark at the start of the input
    #[arg(long)]
    strip_bom: bool,

    /// Write the target encoding's byte-order mark
    #[arg(long)]
    add_bom: bool,

    /// Replace invalid input and unencodable characters with NUL
    #[arg(long)]
    null_invalid: bool,

    /// Read buffer size (KB)
    #[arg(long, default_value = "64")]
    buffer_size: usize,

    /// Exit with an error if any input was invalid or unencodable
    #[arg(long)]
    strict: bool,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct DetectArgs {
    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Treat input as HTML/XML and honor charset declarations
    #[arg(long)]
    html: bool,

    /// Encoding reported when nothing in the data decides
    #[arg(long)]
    fallback: Option<EncodingArg>,

    /// Maximum bytes to read for detection
    #[arg(long, default_value = "8192")]
    sample_size: usize,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ListArgs {
    /// Show aliases and byte-order marks
    #[arg(long)]
    details: bool,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ValidateArgs {
    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Expected encoding
    #[arg(short, long)]
    encoding: EncodingArg,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct InfoArgs {
    /// Encoding to describe
    encoding: EncodingArg,
}

#[cfg(feature = "cli")]
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Codec named on the command line, resolved through the registry
#[cfg(feature = "cli")]
#[derive(Clone, Debug)]
struct EncodingArg(Codec);

#[cfg(feature = "cli")]
impl std::str::FromStr for EncodingArg {
    type Err = textcodec::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Registry::global().resolve(s).map(EncodingArg)
    }
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ConversionReport {
    from: &'static str,
    to: &'static str,
    bytes_read: usize,
    bytes_written: usize,
    invalid_input: usize,
    unencodable: usize,
    truncated_bytes: usize,
    processing_time_ms: u64,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct DetectionReport {
    detected_encoding: Option<&'static str>,
    mib: Option<i32>,
    source: Option<&'static str>,
    sample_size: usize,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ValidationReport {
    encoding: &'static str,
    valid: bool,
    bytes_read: usize,
    invalid_units: usize,
    truncated_bytes: usize,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Convert(ref args) => convert_command(args, &cli)?,
        Commands::Detect(ref args) => detect_command(args, &cli)?,
        Commands::List(ref args) => list_command(args, &cli)?,
        Commands::Validate(ref args) => validate_command(args, &cli)?,
        Commands::Info(ref args) => info_command(args, &cli)?,
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "reading input file");
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => {
            debug!("reading from stdin");
            Ok(Box::new(io::stdin().lock()))
        }
    }
}

#[cfg(feature = "cli")]
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// Fill as much of `buf` as one read provides, retrying on interrupts.
#[cfg(feature = "cli")]
fn read_chunk(reader: &mut dyn Read, buf: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err).context("Failed to read input"),
        }
    }
}

#[cfg(feature = "cli")]
fn convert_command(args: &ConvertArgs, cli: &Cli) -> Result<()> {
    let start_time = Instant::now();
    let (from, to) = (args.from.0, args.to.0);
    info!(from = from.name(), to = to.name(), "converting");

    let mut decode_flags = ConversionFlags::empty();
    let mut encode_flags = ConversionFlags::empty();
    if args.strip_bom {
        decode_flags |= ConversionFlags::CONVERT_INITIAL_BOM;
    }
    if args.add_bom {
        encode_flags |= ConversionFlags::WRITE_BOM;
    }
    if args.null_invalid {
        decode_flags |= ConversionFlags::CONVERT_INVALID_TO_NULL;
        encode_flags |= ConversionFlags::CONVERT_INVALID_TO_NULL;
    }

    let mut decoder = from.make_decoder(decode_flags);
    let mut encoder = to.make_encoder(encode_flags);
    let mut reader = open_input(args.input.as_deref())?;
    let mut writer = open_output(args.output.as_deref())?;

    let mut buffer = vec![0u8; args.buffer_size.max(1) * 1024];
    let mut bytes_read = 0;
    let mut bytes_written = 0;
    loop {
        let n = read_chunk(&mut reader, &mut buffer)?;
        if n == 0 {
            break;
        }
        bytes_read += n;
        let text = decoder.to_unicode(&buffer[..n]);
        let encoded = encoder.from_unicode(&text);
        writer.write_all(&encoded).context("Failed to write output")?;
        bytes_written += encoded.len();
    }
    let truncated_bytes = decoder.finish();
    writer.flush().context("Failed to flush output")?;

    if truncated_bytes != 0 {
        warn!(truncated_bytes, "input ended in the middle of a character");
    }

    let report = ConversionReport {
        from: from.name(),
        to: to.name(),
        bytes_read,
        bytes_written,
        invalid_input: decoder.invalid_count(),
        unencodable: encoder.invalid_count(),
        truncated_bytes,
        processing_time_ms: start_time.elapsed().as_millis() as u64,
    };
    info!(
        bytes_read,
        bytes_written,
        elapsed = ?start_time.elapsed(),
        "conversion finished"
    );

    // the converted data may own stdout; reports then go to stderr
    let stdout_free = args.output.is_some();
    match cli.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)?;
            if stdout_free {
                println!("{json}");
            } else {
                eprintln!("{json}");
            }
        }
        OutputFormat::Text => {
            if report.invalid_input + report.unencodable != 0 {
                eprintln!(
                    "Converted with {} invalid input unit(s) and {} unencodable character(s)",
                    report.invalid_input, report.unencodable
                );
            } else if cli.verbose {
                eprintln!("✓ Conversion completed successfully");
            }
        }
    }

    if args.strict && (decoder.has_failure() || encoder.has_failure()) {
        anyhow::bail!(
            "Conversion from {} to {} was lossy ({} invalid, {} unencodable)",
            from,
            to,
            report.invalid_input,
            report.unencodable
        );
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn detect_command(args: &DetectArgs, cli: &Cli) -> Result<()> {
    let reader = open_input(args.input.as_deref())?;
    let mut sample = Vec::with_capacity(args.sample_size.min(1 << 20));
    reader
        .take(args.sample_size as u64)
        .read_to_end(&mut sample)
        .context("Failed to read input")?;

    let detector = Detector::new();
    let fallback = args.fallback.as_ref().map(|arg| arg.0);
    let detection = if args.html {
        detector.detect_html(&sample, fallback)
    } else {
        detector.detect_utf_text(&sample, fallback)
    };

    let report = DetectionReport {
        detected_encoding: detection.map(|found| found.codec.name()),
        mib: detection.map(|found| found.codec.mib_enum()),
        source: detection.map(|found| source_label(found.source)),
        sample_size: sample.len(),
    };

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            match detection {
                Some(found) => {
                    println!("Detected encoding: {}", found.codec);
                    println!("MIB: {}", found.codec.mib_enum());
                    println!("Source: {}", source_label(found.source));
                }
                None => println!("Detected encoding: unknown"),
            }
            println!("Sample size: {} bytes", sample.len());
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn source_label(source: DetectionSource) -> &'static str {
    match source {
        DetectionSource::Declaration => "declaration",
        DetectionSource::ByteOrderMark => "byte-order mark",
        DetectionSource::Fallback => "fallback",
    }
}

#[cfg(feature = "cli")]
fn list_command(args: &ListArgs, cli: &Cli) -> Result<()> {
    let registry = Registry::global();

    match cli.format {
        OutputFormat::Json => {
            let infos: Vec<CodecInfo> = registry.iter().map(|codec| codec.info()).collect();
            println!("{}", serde_json::to_string_pretty(&infos)?);
        }
        OutputFormat::Text => {
            println!("Supported Encodings ({} total):", registry.iter().count());
            println!();

            for codec in registry.iter() {
                println!("{:15} MIB {:>5}", codec.name(), codec.mib_enum());

                if args.details {
                    if !codec.aliases().is_empty() {
                        println!("                Aliases: {}", codec.aliases().join(", "));
                    }
                    if let Some(bom) = codec.byte_order_mark() {
                        println!("                BOM: {:02X?}", bom);
                    }
                    println!();
                }
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn validate_command(args: &ValidateArgs, cli: &Cli) -> Result<()> {
    let codec = args.encoding.0;
    let mut reader = open_input(args.input.as_deref())?;
    let mut decoder = codec.make_decoder(ConversionFlags::empty());

    let mut buffer = vec![0u8; 64 * 1024];
    let mut bytes_read = 0;
    loop {
        let n = read_chunk(&mut reader, &mut buffer)?;
        if n == 0 {
            break;
        }
        bytes_read += n;
        decoder.to_unicode(&buffer[..n]);
    }
    let truncated_bytes = decoder.finish();

    let report = ValidationReport {
        encoding: codec.name(),
        valid: !decoder.has_failure(),
        bytes_read,
        invalid_units: decoder.invalid_count(),
        truncated_bytes,
    };

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text if report.valid => println!("✓ Input is valid {}", codec),
        OutputFormat::Text => {
            println!("✗ Input is not valid {}", codec);
            println!("  Invalid units: {}", report.invalid_units);
            if truncated_bytes != 0 {
                println!("  Truncated final character: {} byte(s)", truncated_bytes);
            }
        }
    }

    if !report.valid {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn info_command(args: &InfoArgs, cli: &Cli) -> Result<()> {
    let codec = args.encoding.0;
    let info = codec.info();

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        OutputFormat::Text => {
            println!("Encoding Information: {}", info.name);
            println!("MIB: {}", info.mib);
            if info.aliases.is_empty() {
                println!("Aliases: None");
            } else {
                println!("Aliases: {}", info.aliases.join(", "));
            }
            match info.byte_order_mark {
                Some(ref bom) => println!("BOM: {:02X?}", bom),
                None => println!("BOM: None"),
            }
            println!(
                "Locale default: {}",
                if codec == textcodec::codec_for_locale() { "Yes" } else { "No" }
            );
        }
    }

    Ok(())
}
