use anyhow::{bail, ensure, Context, Result};
use itertools::Itertools;

pub fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|x| format!("{x:02x}")).join("")
}

/// Accepts upper or lower case digits, ignoring whitespace and an optional
/// `0x` prefix.
pub fn decode(string: &str) -> Result<Vec<u8>> {
    let string = string.trim();
    let digits = string
        .strip_prefix("0x")
        .unwrap_or(string)
        .chars()
        .filter(|x| !x.is_whitespace())
        .collect::<Vec<_>>();
    ensure!(digits.len() % 2 == 0, "hex input has an odd number of digits");
    if let Some(bad) = digits.iter().find(|x| !x.is_ascii_hexdigit()) {
        bail!("invalid hex digit `{bad}`");
    }

    digits
        .chunks(2)
        .map(|pair| {
            let byte = pair.iter().collect::<String>();
            u8::from_str_radix(&byte, 16).with_context(|| format!("invalid hex byte `{byte}`"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_lower() {
        assert_eq!(encode(&[0xB0, 0x01, 0xFF]), "b001ff");
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn decode_variants() {
        assert_eq!(decode("b001ff").unwrap(), [0xB0, 0x01, 0xFF]);
        assert_eq!(decode("0xB0 01").unwrap(), [0xB0, 0x01]);
        assert!(decode("b0f").is_err());
        assert!(decode("zz").is_err());
        assert!(decode("+f+0").is_err());
        assert!(decode("-1").is_err());
    }
}
