// CLI definitions using clap, plus the offline report tooling behind them

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use razer_driver::report::{ARGUMENTS_LEN, REPORT_LEN};
use razer_driver::{
    apply_checksum, compute_checksum, verify_checksum, LightingFrame, ProtocolConfig, Report, Rgb,
};
use zerocopy::IntoBytes;

#[derive(Parser)]
#[command(name = "razer_driver")]
#[command(author, version, about = "Razer report protocol tooling")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Protocol config file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a checksummed report and print it as hex
    #[command(visible_alias = "enc")]
    Encode {
        /// Command class (decimal or 0x-prefixed hex)
        #[arg(value_parser = parse_byte)]
        class: u8,
        /// Command id
        #[arg(value_parser = parse_byte)]
        id: u8,
        /// Argument bytes
        #[arg(value_parser = parse_byte)]
        args: Vec<u8>,
        /// Override the configured transaction id
        #[arg(short, long, value_parser = parse_byte)]
        transaction_id: Option<u8>,
    },

    /// Decode a 90-byte report from hex
    #[command(visible_alias = "dec")]
    Decode {
        /// Report bytes; spaces and colons are ignored
        hex: String,
    },

    /// Build a lighting frame and print it as hex
    Frame {
        /// LED channel
        #[arg(value_parser = parse_byte)]
        channel: u8,
        /// Colors as RRGGBB
        #[arg(required = true, value_parser = parse_rgb)]
        colors: Vec<Rgb>,
    },

    /// Print the effective protocol configuration
    Config,
}

/// Parse a byte given as decimal or `0x`-prefixed hex
pub fn parse_byte(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid byte '{s}': {e}"))
}

/// Parse an `RRGGBB` color, with optional `#` prefix
pub fn parse_rgb(s: &str) -> Result<Rgb, String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    let bytes = decode_hex(hex).map_err(|e| format!("invalid color '{s}': {e}"))?;
    match bytes[..] {
        [r, g, b] => Ok(Rgb::new(r, g, b)),
        _ => Err(format!("invalid color '{s}': expected RRGGBB")),
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let digits: Vec<char> = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    if digits.len() % 2 != 0 {
        bail!("odd number of hex digits");
    }
    digits
        .chunks(2)
        .map(|pair| {
            let text: String = pair.iter().collect();
            u8::from_str_radix(&text, 16).with_context(|| format!("bad hex byte '{text}'"))
        })
        .collect()
}

fn hex_line(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn load_config(path: Option<&PathBuf>) -> Result<ProtocolConfig> {
    let path = path.cloned().unwrap_or_else(ProtocolConfig::default_path);
    ProtocolConfig::load(&path).with_context(|| format!("loading {}", path.display()))
}

pub fn encode(
    config: &ProtocolConfig,
    class: u8,
    id: u8,
    args: &[u8],
    transaction_id: Option<u8>,
) -> Result<String> {
    if args.len() > ARGUMENTS_LEN {
        bail!("{} argument bytes exceed capacity ({ARGUMENTS_LEN})", args.len());
    }
    let tid = transaction_id.unwrap_or(config.transaction_id);
    if tid == 0 {
        bail!("transaction id 0x00 is never valid on the wire");
    }

    let mut report = Report::new(class, id, args.len() as u8).with_arguments(args);
    report.transaction_id = tid;
    apply_checksum(&mut report);
    Ok(hex_line(report.as_bytes()))
}

pub fn decode(hex: &str) -> Result<String> {
    let bytes = decode_hex(hex)?;
    let report = Report::from_bytes(&bytes)
        .with_context(|| format!("expected {REPORT_LEN} bytes, got {}", bytes.len()))?;

    let mut out = String::new();
    writeln!(out, "status:            0x{:02X} ({:?})", report.status, report.status())?;
    writeln!(out, "transaction_id:    0x{:02X}", report.transaction_id)?;
    writeln!(out, "remaining_packets: {}", report.remaining_packets())?;
    writeln!(out, "protocol_type:     0x{:02X}", report.protocol_type)?;
    writeln!(out, "data_size:         {}", report.data_size)?;
    writeln!(out, "command_class:     0x{:02X}", report.command_class)?;
    writeln!(
        out,
        "command_id:        0x{:02X}{}",
        report.command_id,
        if report.is_query() { " (query)" } else { "" }
    )?;
    writeln!(out, "arguments:         {}", hex_line(report.arguments_used()))?;
    if verify_checksum(&report) {
        writeln!(out, "checksum:          0x{:02X} ok", report.checksum)?;
    } else {
        writeln!(
            out,
            "checksum:          0x{:02X} MISMATCH (expected 0x{:02X})",
            report.checksum,
            compute_checksum(&report)
        )?;
    }
    if report.data_size as usize > ARGUMENTS_LEN {
        writeln!(
            out,
            "warning:           data_size exceeds argument capacity ({ARGUMENTS_LEN})"
        )?;
    }
    Ok(out)
}

pub fn frame(channel: u8, colors: &[Rgb]) -> Result<String> {
    let frame = LightingFrame::from_colors(channel, colors)?;
    Ok(hex_line(frame.as_bytes()))
}

pub fn show_config(config: &ProtocolConfig) -> Result<String> {
    Ok(config.to_toml_string()?)
}
