use anyhow::{ensure, Context, Result};
use clap::Parser;
use common::{
    bits::{minimum_bits, pop_count, BitReader},
    serde::{Deserializer, GrowableBuffer, Serializer, SliceDeserializer},
};
use itertools::Itertools;
use tracing::{debug, level_filters::LevelFilter, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

mod args;
mod hex;
mod layout;
use args::{parse_value, Args, Command, FieldArgs};
use layout::Layout;

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = filter::Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("bitpack", level)
        .with_target("common", level);
    let format = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();

    match args.command {
        Command::Pack {
            fields,
            framed,
            values,
        } => pack(&fields, framed, &values),
        Command::Unpack {
            fields,
            framed,
            hex,
        } => unpack(&fields, framed, &hex),
        Command::Width { values } => {
            for value in values {
                println!(
                    "{value}: {} bits, {} set",
                    minimum_bits(value),
                    pop_count(value)
                );
            }
            Ok(())
        }
    }
}

fn load_layout(fields: &FieldArgs) -> Result<Layout> {
    match (&fields.widths, &fields.layout) {
        (Some(widths), _) => Layout::from_widths(widths),
        (None, Some(path)) => Layout::load(path),
        (None, None) => unreachable!("clap requires one of --widths or --layout"),
    }
}

fn pack(fields: &FieldArgs, framed: bool, raw: &[String]) -> Result<()> {
    let layout = load_layout(fields)?;

    let raw = raw.iter().map(String::as_str).collect::<Vec<_>>();
    let ordered = match fields.layout {
        Some(_) => layout.assign(raw)?,
        None => raw,
    };
    let values = ordered
        .into_iter()
        .map(parse_value)
        .collect::<Result<Vec<_>>>()?;

    let writer = layout.pack(&values)?;
    let bit_len = u32::try_from(writer.bit_len()).context("packed stream too long")?;
    let bytes = writer.finish();

    let mut buffer = GrowableBuffer::new();
    let out = buffer.produce(|ser| write_output(ser, framed, bit_len, &bytes))?;

    println!("{}", hex::encode(out));
    debug!("output took {} retries", buffer.retries());
    Ok(())
}

/// Writes the packed bytes, behind a big endian bit length when `framed`. The
/// length slot is reserved first and patched once the payload is in place.
fn write_output(
    ser: &mut impl Serializer,
    framed: bool,
    bit_len: u32,
    bytes: &[u8],
) -> Result<()> {
    let header = framed.then(|| ser.reserve(4)).transpose()?;
    ser.write_bytes(bytes)?;

    if let Some(header) = header {
        ser.execute_at(header, |ser| ser.write_u32_be(bit_len))?;
    }

    Ok(())
}

fn unpack(fields: &FieldArgs, framed: bool, hex: &str) -> Result<()> {
    let layout = load_layout(fields)?;
    let bytes = hex::decode(hex)?;

    let mut des = SliceDeserializer::new(&bytes);
    if framed {
        let bit_len = des.read_u32_be().context("missing length prefix")?;
        ensure!(
            bit_len == layout.total_bits(),
            "stream holds {bit_len} bits but the layout describes {}",
            layout.total_bits()
        );
    }

    let mut reader = BitReader::with_source(des);
    let values = layout.unpack(&mut reader)?;

    let trailing = reader.into_inner().remaining().unwrap_or_default();
    if trailing > 0 {
        warn!("ignoring {trailing} trailing bytes");
    }

    if fields.layout.is_some() {
        for (field, value) in layout.fields.iter().zip(values) {
            println!("{} = {value}", field.name);
        }
    } else {
        println!("{}", values.iter().join(" "));
    }

    Ok(())
}
