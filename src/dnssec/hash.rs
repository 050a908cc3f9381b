use crate::error::{Result, WalkError};
use ring::digest;

/// A SHA-1 digest is 20 bytes, 32 base32hex characters
pub const NSEC3_HASH_LEN: usize = 32;

/// Compute the NSEC3 hash of a name (RFC 5155 §5)
///
/// `H(name || salt)` iterated `iterations` further times, with the name in
/// lowercase wire form. SHA-1 is the only algorithm ever defined for NSEC3.
/// Returns lowercase base32hex, the same form the owner labels of NSEC3
/// records use.
pub fn nsec3_hash(name: &str, salt_hex: &str, iterations: u16) -> Result<String> {
    let salt = decode_salt(salt_hex)?;

    let mut wire_name = Vec::new();
    for label in name.trim_end_matches('.').split('.') {
        if label.is_empty() {
            continue;
        }
        if label.len() > 63 {
            return Err(WalkError::Parse(format!("Label too long: {}", label)));
        }
        wire_name.push(label.len() as u8);
        wire_name.extend_from_slice(label.to_lowercase().as_bytes());
    }
    wire_name.push(0);

    let mut input = wire_name;
    input.extend_from_slice(&salt);
    let mut hash = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, &input);

    for _ in 0..iterations {
        let mut next_input = hash.as_ref().to_vec();
        next_input.extend_from_slice(&salt);
        hash = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, &next_input);
    }

    Ok(base32::encode(
        base32::Alphabet::Rfc4648HexLower { padding: false },
        hash.as_ref(),
    ))
}

/// Decode a presentation-form salt; "-" means empty
pub fn decode_salt(salt_hex: &str) -> Result<Vec<u8>> {
    if salt_hex == "-" || salt_hex.is_empty() {
        return Ok(Vec::new());
    }
    hex::decode(salt_hex).map_err(|_| WalkError::InvalidNsec3Params(salt_hex.to_string()))
}
