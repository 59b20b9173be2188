use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(version)]
/// Pack and unpack bit granular fields.
pub struct Args {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    /// Log more, repeat for even more.
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pack values into bytes, printed as hex.
    Pack {
        #[command(flatten)]
        fields: FieldArgs,
        #[arg(long)]
        /// Prefix the output with its length in bits, as a big endian u32.
        framed: bool,
        /// Values in field order, or `name=value` pairs with --layout.
        /// Accepts decimal, 0x and 0b literals.
        values: Vec<String>,
    },
    /// Unpack hex encoded bytes back into values.
    Unpack {
        #[command(flatten)]
        fields: FieldArgs,
        #[arg(long)]
        /// Input starts with a big endian u32 length in bits.
        framed: bool,
        /// The packed bytes as hex.
        hex: String,
    },
    /// Print the minimum width and set bit count of each value.
    Width {
        #[arg(value_parser = parse_value)]
        values: Vec<u32>,
    },
}

#[derive(Debug, clap::Args)]
#[group(required = true, multiple = false)]
pub struct FieldArgs {
    #[arg(long, value_delimiter = ',')]
    /// Comma separated field widths, e.g. `3,1,12`.
    pub widths: Option<Vec<u32>>,
    #[arg(long)]
    /// Path to a TOML layout file with named fields.
    pub layout: Option<PathBuf>,
}

pub fn parse_value(raw: &str) -> Result<u32> {
    let raw = raw.replace('_', "");
    let (digits, radix) = if let Some(hex) = raw.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(bin) = raw.strip_prefix("0b") {
        (bin, 2)
    } else {
        (raw.as_str(), 10)
    };

    u32::from_str_radix(digits, radix).with_context(|| format!("invalid value `{raw}`"))
}
