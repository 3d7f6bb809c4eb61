//! Track Code Generator
//!
//! Produces human-decodable shipment identifiers without a central
//! sequence: category code + YYMMDD + owner id suffix + category code +
//! random letters. Uniqueness is probabilistic — the record store's
//! duplicate check at creation time is the source of truth.

use rand::Rng;
use shared::models::Category;
use std::collections::HashSet;

/// Code length: 2 + 6 + 4 + 2 + 4
pub const TRACK_CODE_LEN: usize = 18;

const RANDOM_LEN: usize = 4;

/// Fallback code for shipments without a recognized category
const GENERIC_CODE: &str = "GN";

fn category_code(category: Option<Category>) -> &'static str {
    category.map_or(GENERIC_CODE, Category::code)
}

fn random_letters(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| (b'A' + rng.gen_range(0..26)) as char)
        .collect()
}

/// Generate one track code for an owner
///
/// Format: `CCYYMMDDNNNNCCRRRR` — 2-letter category code, 6-digit date
/// stamp, last 4 digits of the owner account id (zero-padded), the category
/// code again, 4 random uppercase letters.
pub fn generate(account_id: i64, category: Option<Category>) -> String {
    let code = category_code(category);
    let date_part = chrono::Utc::now().format("%y%m%d").to_string();

    let digits = account_id.unsigned_abs().to_string();
    let suffix = if digits.len() > 4 {
        digits[digits.len() - 4..].to_string()
    } else {
        format!("{digits:0>4}")
    };

    format!("{code}{date_part}{suffix}{code}{}", random_letters(RANDOM_LEN))
}

/// Structural parts of a decoded track code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackCodeParts {
    pub category_code: String,
    /// "20YY-MM-DD"
    pub date: String,
    pub owner_suffix: String,
    pub random: String,
}

/// Decode a track code into its structural parts
///
/// Returns `None` for strings too short to carry the fixed layout.
pub fn decode(track_code: &str) -> Option<TrackCodeParts> {
    if track_code.len() < TRACK_CODE_LEN || !track_code.is_ascii() {
        return None;
    }
    Some(TrackCodeParts {
        category_code: track_code[0..2].to_string(),
        date: format!(
            "20{}-{}-{}",
            &track_code[2..4],
            &track_code[4..6],
            &track_code[6..8]
        ),
        owner_suffix: track_code[8..12].to_string(),
        random: track_code[14..18].to_string(),
    })
}

/// Generate `count` pairwise-distinct codes for one owner
///
/// Inputs can be identical across the batch, so self-collisions are
/// regenerated until the set is full.
pub fn generate_bulk(count: usize, account_id: i64, category: Option<Category>) -> Vec<String> {
    let mut codes = HashSet::with_capacity(count);
    while codes.len() < count {
        codes.insert(generate(account_id, category));
    }
    codes.into_iter().collect()
}
