use std::{collections::HashSet, fs, path::Path};

use anyhow::{bail, ensure, Context, Result};
use common::bits::{minimum_bits, BitReader, BitWriter, ByteSource, MAX_BITS};
use serde::Deserialize;
use tracing::{debug, info};

/// An ordered list of fields. Both ends of a stream have to agree on it, the
/// packed bytes carry no description of themselves.
#[derive(Debug, Deserialize)]
pub struct Layout {
    #[serde(rename = "field")]
    pub fields: Vec<Field>,
}

#[derive(Debug, Deserialize)]
pub struct Field {
    pub name: String,
    pub bits: u32,
}

impl Layout {
    pub fn load(path: &Path) -> Result<Self> {
        let file = fs::read(path)
            .with_context(|| format!("failed to read layout `{}`", path.display()))?;
        let layout = Self::parse(&String::from_utf8_lossy(&file))?;
        info!(
            "Loaded layout with {} fields ({} bits)",
            layout.fields.len(),
            layout.total_bits()
        );
        Ok(layout)
    }

    pub fn parse(string: &str) -> Result<Self> {
        let layout: Layout = toml::from_str(string)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Unnamed fields, labeled by their index.
    pub fn from_widths(widths: &[u32]) -> Result<Self> {
        let layout = Self {
            fields: widths
                .iter()
                .enumerate()
                .map(|(i, &bits)| Field {
                    name: i.to_string(),
                    bits,
                })
                .collect(),
        };
        layout.validate()?;
        Ok(layout)
    }

    fn validate(&self) -> Result<()> {
        ensure!(!self.fields.is_empty(), "layout has no fields");

        let mut seen = HashSet::new();
        for field in &self.fields {
            ensure!(
                (1..=MAX_BITS).contains(&field.bits),
                "field `{}` has width {}, must be between 1 and {MAX_BITS}",
                field.name,
                field.bits
            );
            ensure!(
                seen.insert(field.name.as_str()),
                "duplicate field `{}`",
                field.name
            );
        }

        Ok(())
    }

    pub fn total_bits(&self) -> u32 {
        self.fields.iter().map(|x| x.bits).sum()
    }

    /// Orders `name=value` assignments to match the layout. Every field must
    /// be assigned exactly once.
    pub fn assign<'a>(&self, pairs: impl IntoIterator<Item = &'a str>) -> Result<Vec<&'a str>> {
        let mut values = vec![None; self.fields.len()];
        for pair in pairs {
            let Some((name, value)) = pair.split_once('=') else {
                bail!("expected `name=value`, got `{pair}`");
            };

            let idx = self
                .fields
                .iter()
                .position(|x| x.name == name.trim())
                .with_context(|| format!("unknown field `{}`", name.trim()))?;
            ensure!(values[idx].is_none(), "field `{name}` assigned twice");
            values[idx] = Some(value.trim());
        }

        self.fields
            .iter()
            .zip(values)
            .map(|(field, value)| value.with_context(|| format!("missing field `{}`", field.name)))
            .collect()
    }

    pub fn pack(&self, values: &[u32]) -> Result<BitWriter> {
        ensure!(
            values.len() == self.fields.len(),
            "expected {} values, got {}",
            self.fields.len(),
            values.len()
        );

        let mut writer = BitWriter::new();
        for (field, &value) in self.fields.iter().zip(values) {
            ensure!(
                minimum_bits(value) <= field.bits,
                "value {value} doesn't fit in the {} bits of field `{}`",
                field.bits,
                field.name
            );
            writer.write(value, field.bits)?;
        }

        debug!("packed {} bits", writer.bit_len());
        Ok(writer)
    }

    pub fn unpack<S: ByteSource>(&self, reader: &mut BitReader<S>) -> Result<Vec<u32>> {
        self.fields
            .iter()
            .map(|field| {
                reader
                    .read(field.bits)
                    .with_context(|| format!("failed to read field `{}`", field.name))
            })
            .collect()
    }
}
