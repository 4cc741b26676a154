//! CashAddr-style payload codec: 5-bit symbol conversion and the 40-bit
//! polymod checksum over `(prefix ‖ 0 ‖ payload)`.

use crate::{AddressError, Prefix};

const CHARSET: &[u8] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Maps an ASCII byte back to its 5-bit symbol value; 100 marks an invalid character.
const REV_CHARSET: [u8; 123] = {
    let mut rev = [100u8; 123];
    let mut i = 0;
    while i < CHARSET.len() {
        rev[CHARSET[i] as usize] = i as u8;
        i += 1;
    }
    rev
};

const CHECKSUM_LEN: usize = 8;

fn polymod(values: impl IntoIterator<Item = u8>) -> u64 {
    let mut c = 1u64;
    for d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x0007_ffff_ffff) << 5) ^ (d as u64);
        if c0 & 0x01 != 0 {
            c ^= 0x98f2bc8e61;
        }
        if c0 & 0x02 != 0 {
            c ^= 0x79b76d99e2;
        }
        if c0 & 0x04 != 0 {
            c ^= 0xf33e5fb3c4;
        }
        if c0 & 0x08 != 0 {
            c ^= 0xae2eabe2a8;
        }
        if c0 & 0x10 != 0 {
            c ^= 0x1e4f43e470;
        }
    }
    c ^ 1
}

/// The checksum absorbs the low 5 bits of each prefix character, a zero
/// separator, the 5-bit payload and eight zero sentinels.
fn checksum(payload_5bit: &[u8], prefix: Prefix) -> u64 {
    polymod(
        prefix
            .as_str()
            .bytes()
            .map(|c| c & 0x1f)
            .chain(std::iter::once(0))
            .chain(payload_5bit.iter().copied())
            .chain([0u8; CHECKSUM_LEN]),
    )
}

/// Regroups 8-bit bytes into 5-bit symbols, zero-padding the tail group.
fn conv8to5(payload: &[u8]) -> Vec<u8> {
    let mut five_bit = Vec::with_capacity((payload.len() * 8 + 4) / 5);
    let mut buff = 0u16;
    let mut bits = 0u32;
    for &byte in payload {
        buff = (buff << 8) | byte as u16;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            five_bit.push((buff >> bits) as u8 & 0x1f);
        }
    }
    if bits > 0 {
        five_bit.push((buff << (5 - bits)) as u8 & 0x1f);
    }
    five_bit
}

/// Regroups 5-bit symbols back into bytes. The residual group must be
/// shorter than 5 bits and all-zero, otherwise the encoding was not canonical.
fn conv5to8(payload_5bit: &[u8]) -> Result<Vec<u8>, AddressError> {
    let mut payload = Vec::with_capacity(payload_5bit.len() * 5 / 8);
    let mut buff = 0u16;
    let mut bits = 0u32;
    for &value in payload_5bit {
        buff = (buff << 5) | value as u16;
        bits += 5;
        while bits >= 8 {
            bits -= 8;
            payload.push((buff >> bits) as u8);
        }
    }
    if bits >= 5 || buff & ((1 << bits) - 1) != 0 {
        return Err(AddressError::BadPadding);
    }
    Ok(payload)
}

pub(crate) fn encode_payload(prefix: Prefix, version: u8, payload: &[u8]) -> String {
    let mut versioned = Vec::with_capacity(payload.len() + 1);
    versioned.push(version);
    versioned.extend_from_slice(payload);
    let mut five_bit = conv8to5(&versioned);

    let checksum = checksum(&five_bit, prefix);
    five_bit.extend((0..CHECKSUM_LEN).rev().map(|i| (checksum >> (5 * i)) as u8 & 0x1f));

    String::from_utf8(five_bit.into_iter().map(|c| CHARSET[c as usize]).collect()).expect("charset is ASCII")
}

pub(crate) fn decode_payload(prefix: Prefix, body: &str) -> Result<(u8, Vec<u8>), AddressError> {
    let mut five_bit = Vec::with_capacity(body.len());
    for c in body.chars() {
        let value = *REV_CHARSET.get(c as usize).ok_or(AddressError::BadChar(c))?;
        if value == 100 {
            return Err(AddressError::BadChar(c));
        }
        five_bit.push(value);
    }

    // The checksum must be verified against the full symbol stream before
    // any regrouping, so a flipped version symbol still surfaces here.
    if five_bit.len() <= CHECKSUM_LEN || checksum(&five_bit[..five_bit.len() - CHECKSUM_LEN], prefix) != read_checksum(&five_bit) {
        return Err(AddressError::BadChecksum);
    }

    let versioned = conv5to8(&five_bit[..five_bit.len() - CHECKSUM_LEN])?;
    match versioned.split_first() {
        Some((&version, payload)) => Ok((version, payload.to_vec())),
        None => Err(AddressError::BadChecksum),
    }
}

fn read_checksum(five_bit: &[u8]) -> u64 {
    five_bit[five_bit.len() - CHECKSUM_LEN..].iter().fold(0u64, |acc, &value| (acc << 5) | value as u64)
}
