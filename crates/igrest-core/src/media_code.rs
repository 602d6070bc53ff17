//! Media shortcode <-> primary key conversion, and story permalinks.
//!
//! Shortcodes are the primary key written in a URL-safe base64 alphabet,
//! most significant digit first. Codes of private media carry a 28-character
//! suffix after the encoded key.

use thiserror::Error;
use url::Url;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

const PRIVATE_SUFFIX_LEN: usize = 28;

/// Path segments that precede a shortcode in media permalinks.
const MEDIA_PATH_KINDS: &[&str] = &["p", "reel", "reels", "tv"];

/// Shortcode conversion error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodeError {
    #[error("Shortcode is empty")]
    Empty,
    #[error("Invalid shortcode character '{0}'")]
    InvalidCharacter(char),
    #[error("Shortcode does not fit a media pk")]
    Overflow,
    #[error("Not a media or story URL: {0}")]
    InvalidUrl(String),
}

fn digit(c: char) -> Option<u64> {
    let byte = u8::try_from(c).ok()?;
    ALPHABET
        .iter()
        .position(|&b| b == byte)
        .and_then(|i| u64::try_from(i).ok())
}

/// Decode a shortcode into a media primary key.
///
/// # Errors
/// Returns error for empty codes, characters outside the alphabet, or values
/// that overflow `u64`.
pub fn media_pk_from_code(code: &str) -> Result<u64, CodeError> {
    let chars: Vec<char> = code.trim().chars().collect();
    let chars = if chars.len() > PRIVATE_SUFFIX_LEN {
        &chars[..chars.len() - PRIVATE_SUFFIX_LEN]
    } else {
        &chars[..]
    };
    if chars.is_empty() {
        return Err(CodeError::Empty);
    }

    chars.iter().try_fold(0_u64, |pk, &c| {
        let value = digit(c).ok_or(CodeError::InvalidCharacter(c))?;
        pk.checked_mul(64)
            .and_then(|pk| pk.checked_add(value))
            .ok_or(CodeError::Overflow)
    })
}

/// Encode a media primary key as a shortcode.
#[must_use]
pub fn media_code_from_pk(pk: u64) -> String {
    if pk == 0 {
        return char::from(ALPHABET[0]).to_string();
    }

    let mut digits = Vec::new();
    let mut rest = pk;
    while rest > 0 {
        let index = usize::try_from(rest % 64).unwrap_or_default();
        digits.push(ALPHABET[index]);
        rest /= 64;
    }
    digits.iter().rev().map(|&b| char::from(b)).collect()
}

/// Extract the media primary key from a permalink such as
/// `https://www.instagram.com/p/B1LbfVPlwIA/`.
///
/// # Errors
/// Returns error if the URL has no media path or the shortcode is invalid.
pub fn media_pk_from_url(raw: &str) -> Result<u64, CodeError> {
    let url = Url::parse(raw.trim()).map_err(|_| CodeError::InvalidUrl(raw.to_string()))?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let code = segments
        .windows(2)
        .find(|pair| MEDIA_PATH_KINDS.contains(&pair[0]))
        .map(|pair| pair[1])
        .ok_or_else(|| CodeError::InvalidUrl(raw.to_string()))?;

    media_pk_from_code(code)
}

/// Extract the story primary key from a permalink such as
/// `https://www.instagram.com/stories/someone/2581281926631793076/`.
///
/// The key is the first all-digit path segment.
///
/// # Errors
/// Returns error if the URL has no numeric segment or the key overflows.
pub fn story_pk_from_url(raw: &str) -> Result<u64, CodeError> {
    let url = Url::parse(raw.trim()).map_err(|_| CodeError::InvalidUrl(raw.to_string()))?;
    let segment = url
        .path_segments()
        .and_then(|mut segments| {
            segments.find(|seg| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()))
        })
        .ok_or_else(|| CodeError::InvalidUrl(raw.to_string()))?;

    segment.parse().map_err(|_| CodeError::Overflow)
}
