//! A module for all decoding needs.
use std::io::{BufRead, Write};

use log::{debug, warn};

use crate::width::CodeWidth;
use crate::{AllResult, BitOrder, Code, LzwError, FIRST_CODE, MAX_CODES};

/// The configuration of a decoding operation.
///
/// Like the [`Encoder`](crate::Encoder), a `Decoder` holds no state between operations.
pub struct Decoder {
    order: BitOrder,
    limit: Code,
}

/// A decoding stream sink.
///
/// See [`Decoder::into_stream`] on how to create this type and more information.
///
/// [`Decoder::into_stream`]: struct.Decoder.html#method.into_stream
pub struct IntoStream<'d, W> {
    decoder: &'d mut Decoder,
    writer: W,
}

trait Stateful {
    /// Decode all complete code words, appending the decoded bytes to `out`.
    fn advance(&mut self, inp: &[u8], out: &mut Vec<u8>) -> Result<(), LzwError>;
    /// Check the bits that remain after the input is exhausted.
    fn finish(&mut self);
}

struct DecodeState<R: Reader> {
    /// The table of decoded strings.
    table: Table,
    /// The width of the next code word.
    width: CodeWidth,
    /// The previously decoded code, `None` at the start of the stream.
    last: Option<Code>,
    /// The bit source.
    reader: R,
}

#[derive(Clone, Copy)]
struct Link {
    prefix: Code,
    byte: u8,
    /// The first byte of the whole string.
    first: u8,
}

struct Table {
    links: Vec<Link>,
    limit: Code,
}

struct MsbReader {
    /// The buffer bits, left aligned.
    buffer: u64,
    /// The number of valid buffer bits.
    bits: u8,
}

struct LsbReader {
    /// The buffer bits, right aligned.
    buffer: u64,
    /// The number of valid buffer bits.
    bits: u8,
}

/// Splits a byte stream into code words of varying width.
trait Reader {
    fn new() -> Self;
    /// Move bytes from `inp` into the bit buffer while there is room.
    fn refill(&mut self, inp: &mut &[u8]);
    /// Take the next `size` bits, if that many are buffered.
    fn next_code(&mut self, size: u8) -> Option<Code>;
    /// The number of buffered bits.
    fn bits(&self) -> u8;
}

impl Decoder {
    pub fn new(order: BitOrder) -> Self {
        Decoder {
            order,
            limit: MAX_CODES,
        }
    }

    /// Decode with a dictionary that stops growing at `limit`, exclusive.
    #[cfg(test)]
    pub(crate) fn with_code_limit(mut self, limit: Code) -> Self {
        self.limit = limit;
        self
    }

    /// Decode a complete buffer into a new vector.
    pub fn decode(&mut self, data: &[u8]) -> Result<Vec<u8>, LzwError> {
        let mut output = Vec::with_capacity(data.len() * 2);
        self.into_stream(&mut output).decode_all(data).status?;
        Ok(output)
    }

    /// Construct a decoder into a writer.
    ///
    /// The writer is flushed after decoding but not closed.
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            decoder: self,
            writer,
        }
    }

    fn start(&self) -> Box<dyn Stateful + Send + 'static> {
        type Boxed = Box<dyn Stateful + Send + 'static>;
        match self.order {
            BitOrder::Msb => Box::new(DecodeState::<MsbReader>::new(self.limit)) as Boxed,
            BitOrder::Lsb => Box::new(DecodeState::<LsbReader>::new(self.limit)) as Boxed,
        }
    }
}

impl<W: Write> IntoStream<'_, W> {
    /// Decode all data from a reader.
    ///
    /// The stream has no end marker, decoding stops when the reader is drained.
    pub fn decode_all(mut self, mut read: impl BufRead) -> AllResult {
        let IntoStream { decoder, writer } = &mut self;
        let mut state = decoder.start();

        let mut bytes_read = 0;
        let mut bytes_written = 0;
        let mut outbuf = Vec::new();

        let status = (|| -> Result<(), LzwError> {
            loop {
                let data = read.fill_buf()?;
                if data.is_empty() {
                    break;
                }

                let consumed = data.len();
                state.advance(data, &mut outbuf)?;
                read.consume(consumed);
                bytes_read += consumed;

                writer.write_all(&outbuf)?;
                bytes_written += outbuf.len();
                outbuf.clear();
            }

            state.finish();
            writer.flush()?;
            Ok(())
        })();

        AllResult {
            bytes_read,
            bytes_written,
            status,
        }
    }
}

impl<R: Reader> DecodeState<R> {
    fn new(limit: Code) -> Self {
        DecodeState {
            table: Table::new(limit),
            width: CodeWidth::new(),
            last: None,
            reader: R::new(),
        }
    }

    fn invalid(&self, code: Code) -> LzwError {
        LzwError::InvalidCode {
            code,
            width: self.width.size(),
        }
    }

    fn decode_code(&mut self, code: Code, out: &mut Vec<u8>) -> Result<(), LzwError> {
        let prev = match self.last {
            Some(prev) => prev,
            None if code < FIRST_CODE => {
                out.push(code as u8);
                self.last = Some(code);
                return Ok(());
            }
            None => return Err(self.invalid(code)),
        };

        let next = self.table.next_code();
        let first = if code < next {
            self.table.reconstruct(code, out);
            self.table.first_byte(code)
        } else if code == next && !self.table.is_full() {
            // The string of the previous code, extended by its own first byte.
            let first = self.table.first_byte(prev);
            self.table.reconstruct(prev, out);
            out.push(first);
            first
        } else {
            return Err(self.invalid(code));
        };

        self.table.push(prev, first)?;
        self.last = Some(code);
        Ok(())
    }
}

impl<R: Reader> Stateful for DecodeState<R> {
    fn advance(&mut self, mut inp: &[u8], out: &mut Vec<u8>) -> Result<(), LzwError> {
        loop {
            self.reader.refill(&mut inp);
            let code = match self.reader.next_code(self.width.size()) {
                Some(code) => code,
                None if inp.is_empty() => break,
                None => continue,
            };

            if self.width.is_escape(code) {
                self.width.grow();
                continue;
            }

            self.decode_code(code, out)?;
        }

        Ok(())
    }

    fn finish(&mut self) {
        if self.reader.bits() >= 8 {
            warn!(
                "{} trailing bits do not form a code word, the stream may be truncated",
                self.reader.bits()
            );
        }

        debug!(
            "decoded {} dictionary entries, final width {} bits",
            self.table.links.len(),
            self.width.size()
        );
    }
}

impl Table {
    fn new(limit: Code) -> Self {
        Table {
            links: Vec::new(),
            limit,
        }
    }

    fn next_code(&self) -> Code {
        FIRST_CODE + self.links.len() as Code
    }

    fn is_full(&self) -> bool {
        self.next_code() >= self.limit
    }

    fn first_byte(&self, code: Code) -> u8 {
        match code.checked_sub(FIRST_CODE) {
            None => code as u8,
            Some(idx) => self.links[idx as usize].first,
        }
    }

    /// Append the string of a known `code` to `out`.
    fn reconstruct(&self, mut code: Code, out: &mut Vec<u8>) {
        let start = out.len();
        while let Some(idx) = code.checked_sub(FIRST_CODE) {
            let link = self.links[idx as usize];
            out.push(link.byte);
            code = link.prefix;
        }
        out.push(code as u8);
        out[start..].reverse();
    }

    /// Add the string `prefix + byte`, unless the table is full.
    fn push(&mut self, prefix: Code, byte: u8) -> Result<(), LzwError> {
        if self.is_full() {
            return Ok(());
        }

        let code = self.next_code();
        self.links
            .try_reserve(1)
            .map_err(|_| LzwError::ResourceExhaustion { code })?;

        let first = self.first_byte(prefix);
        self.links.push(Link {
            prefix,
            byte,
            first,
        });
        Ok(())
    }
}

impl Reader for MsbReader {
    fn new() -> Self {
        MsbReader { buffer: 0, bits: 0 }
    }

    fn refill(&mut self, inp: &mut &[u8]) {
        while self.bits <= 56 {
            let (&byte, rest) = match inp.split_first() {
                Some(split) => split,
                None => break,
            };
            self.buffer |= u64::from(byte) << (56 - self.bits);
            self.bits += 8;
            *inp = rest;
        }
    }

    fn next_code(&mut self, size: u8) -> Option<Code> {
        if self.bits < size {
            return None;
        }

        let code = (self.buffer >> (64 - size)) as Code;
        self.buffer <<= size;
        self.bits -= size;
        Some(code)
    }

    fn bits(&self) -> u8 {
        self.bits
    }
}

impl Reader for LsbReader {
    fn new() -> Self {
        LsbReader { buffer: 0, bits: 0 }
    }

    fn refill(&mut self, inp: &mut &[u8]) {
        while self.bits <= 56 {
            let (&byte, rest) = match inp.split_first() {
                Some(split) => split,
                None => break,
            };
            self.buffer |= u64::from(byte) << self.bits;
            self.bits += 8;
            *inp = rest;
        }
    }

    fn next_code(&mut self, size: u8) -> Option<Code> {
        if self.bits < size {
            return None;
        }

        let code = (self.buffer & ((1 << size) - 1)) as Code;
        self.buffer >>= size;
        self.bits -= size;
        Some(code)
    }

    fn bits(&self) -> u8 {
        self.bits
    }
}
