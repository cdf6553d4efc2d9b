//! # LZW encoder and decoder with growing code words
//!
//! This crate provides an [`Encoder`] and a [`Decoder`] for an LZW variant whose code words
//! start at 9 bits and grow by one bit at a time up to 20 bits. There is no clear code and
//! no end code. A width increase is announced in-band: before the first code word that does
//! not fit the current width, the encoder writes the all-ones value of the current width.
//!
//!  * codes `0..=255` are the literal bytes,
//!  * codes from `256` upwards are dictionary strings, assigned in order of first occurrence,
//!  * `(1 << width) - 1` at any width below 20 means "continue with `width + 1` bits".
//!
//! Once `1 << 20` codes have been assigned the dictionary is frozen and encoding continues
//! with the existing entries.
//!
//! Exemplary use of the encoder:
//!
//! ```
//! use lzwgrow::{BitOrder, Decoder, Encoder};
//! let data = b"TOBEORNOTTOBEORTOBEORNOT";
//!
//! let compressed = Encoder::new(BitOrder::Msb).encode(data).unwrap();
//! let decompressed = Decoder::new(BitOrder::Msb).decode(&compressed).unwrap();
//! assert_eq!(decompressed, data);
//! ```
#![forbid(unsafe_code)]

/// Width of the first code word of every stream.
pub const MIN_CODESIZE: u8 = 9;
/// The widest code word, after which the width stays fixed.
pub const MAX_CODESIZE: u8 = 20;
/// The first code assigned to a dictionary string.
pub const FIRST_CODE: Code = 1 << 8;
/// One more than the largest code that may ever be assigned.
pub const MAX_CODES: Code = 1 << MAX_CODESIZE;

/// Alias for a LZW code point.
pub type Code = u32;

const _: () = assert!(MIN_CODESIZE > 8, "code words must be wider than a byte");
const _: () = assert!(MAX_CODESIZE >= MIN_CODESIZE);
const _: () = assert!(MAX_CODESIZE < 32, "all codes must fit into a `Code`");

/// The order of bits in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitOrder {
    /// The most significant bit is processed first.
    Msb,
    /// The least significant bit is processed first.
    Lsb,
}

/// The search structure backing the encoder dictionary.
///
/// Both kinds assign codes in exactly the same order, so their output is identical. They only
/// differ in lookup cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DictionaryKind {
    /// An unbalanced search tree ordered by the composite key of prefix and suffix.
    ///
    /// Cheap for typical data, but inputs that produce keys in sorted order degrade it to a
    /// linear chain.
    Tree,
    /// A hash map keyed by prefix and suffix.
    Hashed,
}

impl Default for BitOrder {
    fn default() -> Self {
        BitOrder::Msb
    }
}

impl Default for DictionaryKind {
    fn default() -> Self {
        DictionaryKind::Tree
    }
}

/// The result of coding all data from a reader into a writer.
#[derive(Debug)]
pub struct AllResult {
    /// The total number of bytes consumed from the reader.
    pub bytes_read: usize,
    /// The total number of bytes written into the writer.
    pub bytes_written: usize,
    /// The final status of the operation.
    pub status: Result<(), LzwError>,
}

impl AllResult {
    pub(crate) fn failed(err: LzwError) -> Self {
        AllResult {
            bytes_read: 0,
            bytes_written: 0,
            status: Err(err),
        }
    }
}

pub mod decode;
pub mod dict;
pub mod encode;
mod error;
mod width;

pub use crate::decode::Decoder;
pub use crate::encode::Encoder;
pub use crate::error::LzwError;
