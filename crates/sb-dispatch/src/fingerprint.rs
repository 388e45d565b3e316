//! Request fingerprint derivation
//!
//! A fingerprint is a coarse, deterministic lookup key for the credential
//! table, not a unique request identity. Operations sharing a method, first
//! path segment, and modifier-presence pattern deliberately collide.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Serialize;
use sb_common::{Modifiers, Operation};

/// Characters kept from the base64-encoded hash
const FRAGMENT_LEN: usize = 8;

/// Modifier names in the fixed hash order. `joins` surfaces as `collections`.
const HASHED_MODIFIERS: [&str; 7] = [
    "fields",
    "hidden",
    "filter",
    "collections",
    "permissions",
    "validation",
    "nearby",
];

/// Derive the fingerprint for an operation: `<method>:<segment>><fragment>`.
///
/// Pure function of the operation's method, first path segment, and
/// modifier presence/values. Query parameters (`page`, `sort`, `search`),
/// the `session` modifier, and body contents are excluded; only the
/// body's array-shapedness participates.
pub fn fingerprint(operation: &Operation) -> String {
    let segment = operation.first_path_segment();
    let input = hash_input(segment, &operation.modifiers, operation.body_is_array());
    format!(
        "{}:{}>{}",
        operation.method.as_str(),
        segment,
        hash_fragment(&input)
    )
}

/// Ordered concatenation fed to the rolling hash
fn hash_input(segment: &str, modifiers: &Modifiers, body_is_array: bool) -> String {
    let mut input = String::from(segment);

    let values: [Option<String>; 7] = [
        modifiers.fields().map(|v| json_str(&v)),
        modifiers.hidden().map(|v| json_str(&v)),
        modifiers.filter().map(|v| json_str(v)),
        modifiers.joins().map(|v| json_str(&v)),
        modifiers.permissions().map(|v| json_str(&v)),
        modifiers.validation().map(|v| json_str(v)),
        modifiers.nearby().map(|v| json_str(v)),
    ];

    for (name, value) in HASHED_MODIFIERS.iter().zip(values) {
        if let Some(value) = value {
            input.push_str(name);
            input.push(':');
            input.push_str(&value);
        }
    }

    input.push_str("body_is_array:");
    input.push_str(if body_is_array { "true" } else { "false" });
    input
}

/// JSON rendering used for both hashing and header values. serde_json maps
/// keep sorted keys, so the output is stable for a given value.
pub(crate) fn json_str<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Classic 31-multiplier rolling hash over UTF-16 code units, wrapping at
/// 32 bits. The accumulator seeds with the first unit and the loop re-reads
/// it; overflow is discarded, never promoted to a wider width. Must stay
/// bit-exact: provisioned credential tables key off these values.
fn rolling_hash(input: &str) -> i32 {
    let mut acc = match input.encode_utf16().next() {
        Some(unit) => unit as i32,
        None => return 0,
    };
    for unit in input.encode_utf16() {
        acc = acc.wrapping_mul(31).wrapping_add(unit as i32);
    }
    acc
}

fn hash_fragment(input: &str) -> String {
    let encoded = BASE64.encode(rolling_hash(input).to_string());
    encoded.chars().take(FRAGMENT_LEN).collect()
}
