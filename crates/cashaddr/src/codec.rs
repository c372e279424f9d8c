use std::iter;

use crate::error::CashAddrError;

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Number of 5-bit groups in the 40-bit checksum.
const CHECKSUM_GROUPS: usize = 8;

/// Hash sizes indexed by the low three bits of the version byte.
const HASH_SIZES: [usize; 8] = [20, 24, 28, 32, 40, 48, 56, 64];

/// Type tag carried in the version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashKind {
    PubKeyHash,
    ScriptHash,
}

impl HashKind {
    fn type_bits(self) -> u8 {
        match self {
            HashKind::PubKeyHash => 0,
            HashKind::ScriptHash => 1,
        }
    }

    fn from_type_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(HashKind::PubKeyHash),
            1 => Some(HashKind::ScriptHash),
            _ => None,
        }
    }
}

/// Result of decoding an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub prefix: String,
    pub kind: HashKind,
    pub hash: Vec<u8>,
}

/// Encodes `hash` under `prefix` as `prefix:payload`.
pub fn encode(prefix: &str, kind: HashKind, hash: &[u8]) -> Result<String, CashAddrError> {
    validate_prefix(prefix)?;
    let size_code = HASH_SIZES
        .iter()
        .position(|&size| size == hash.len())
        .ok_or_else(|| CashAddrError::MalformedPayload(format!("unsupported hash length {}", hash.len())))?;

    let version = (kind.type_bits() << 3) | size_code as u8;
    let mut raw = Vec::with_capacity(hash.len() + 1);
    raw.push(version);
    raw.extend_from_slice(hash);

    let mut groups = convert_bits(&raw, 8, 5, true)
        .ok_or_else(|| CashAddrError::MalformedPayload("cannot regroup payload".into()))?;
    let checksum = checksum(prefix, &groups);
    groups.extend((0..CHECKSUM_GROUPS).map(|i| ((checksum >> (5 * (CHECKSUM_GROUPS - 1 - i))) & 0x1f) as u8));

    let body: String = groups.iter().map(|&g| CHARSET[g as usize] as char).collect();
    Ok(format!("{prefix}:{body}"))
}

/// Decodes `address`, using `default_prefix` when the text has no `prefix:` part.
///
/// Upper- or lower-case input is accepted, mixed case is not. The returned
/// prefix is always lower case.
pub fn decode(address: &str, default_prefix: &str) -> Result<Decoded, CashAddrError> {
    let has_lower = address.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = address.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(CashAddrError::MalformedPayload("mixed case".into()));
    }

    let address = address.to_ascii_lowercase();
    let (prefix, body) = match address.rfind(':') {
        Some(split) => (address[..split].to_string(), &address[split + 1..]),
        None => (default_prefix.to_ascii_lowercase(), address.as_str()),
    };
    validate_prefix(&prefix)?;

    if body.len() <= CHECKSUM_GROUPS {
        return Err(CashAddrError::MalformedPayload(format!(
            "payload too short: {} characters",
            body.len()
        )));
    }

    let groups = body
        .chars()
        .map(|c| {
            CHARSET
                .iter()
                .position(|&symbol| symbol as char == c)
                .map(|p| p as u8)
                .ok_or_else(|| CashAddrError::MalformedPayload(format!("invalid character {c:?}")))
        })
        .collect::<Result<Vec<u8>, _>>()?;

    if polymod(prefix_groups(&prefix).chain(iter::once(0)).chain(groups.iter().copied())) != 0 {
        return Err(CashAddrError::ChecksumMismatch);
    }

    let payload = &groups[..groups.len() - CHECKSUM_GROUPS];
    let raw = convert_bits(payload, 5, 8, false)
        .ok_or_else(|| CashAddrError::MalformedPayload("non-zero padding".into()))?;
    let (&version, hash) = raw
        .split_first()
        .ok_or_else(|| CashAddrError::MalformedPayload("empty payload".into()))?;

    if version & 0x80 != 0 {
        return Err(CashAddrError::MalformedPayload(format!("reserved bit set in version 0x{version:02x}")));
    }
    let kind = HashKind::from_type_bits(version >> 3)
        .ok_or_else(|| CashAddrError::MalformedPayload(format!("unsupported version 0x{version:02x}")))?;
    let expected = HASH_SIZES[(version & 0x07) as usize];
    if hash.len() != expected {
        return Err(CashAddrError::MalformedPayload(format!(
            "version 0x{version:02x} declares {expected} hash bytes, found {}",
            hash.len()
        )));
    }

    Ok(Decoded {
        prefix,
        kind,
        hash: hash.to_vec(),
    })
}

fn validate_prefix(prefix: &str) -> Result<(), CashAddrError> {
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()) {
        return Err(CashAddrError::UnsupportedPrefix(prefix.to_string()));
    }
    Ok(())
}

/// Prefix characters reduced to their low five bits.
fn prefix_groups(prefix: &str) -> impl Iterator<Item = u8> + '_ {
    prefix.bytes().map(|c| c & 0x1f)
}

fn checksum(prefix: &str, groups: &[u8]) -> u64 {
    polymod(
        prefix_groups(prefix)
            .chain(iter::once(0))
            .chain(groups.iter().copied())
            .chain(iter::repeat(0).take(CHECKSUM_GROUPS)),
    )
}

fn polymod(values: impl Iterator<Item = u8>) -> u64 {
    const GENERATORS: [u64; 5] = [0x98f2bc8e61, 0x79b76d99e2, 0xf33e5fb3c4, 0xae2eabe2a8, 0x1e4f43e470];

    let mut c = 1u64;
    for d in values {
        let c0 = c >> 35;
        c = ((c & 0x07_ffff_ffff) << 5) ^ u64::from(d);
        for (bit, generator) in GENERATORS.iter().enumerate() {
            if (c0 >> bit) & 1 != 0 {
                c ^= generator;
            }
        }
    }
    c ^ 1
}

/// Regroups a bit stream from `from`-bit to `to`-bit values.
fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max_value = (1u32 << to) - 1;
    let max_acc = (1u32 << (from + to - 1)) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);

    for &value in data {
        let value = u32::from(value);
        if value >> from != 0 {
            return None;
        }
        acc = ((acc << from) | value) & max_acc;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max_value) as u8);
        }
    }

    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max_value) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max_value) != 0 {
        return None;
    }
    Some(out)
}
