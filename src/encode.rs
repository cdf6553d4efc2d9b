//! A module for all encoding needs.
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::{debug, warn};

use crate::dict::{Dictionary, HashDictionary, TreeDictionary};
use crate::width::CodeWidth;
use crate::{AllResult, BitOrder, Code, DictionaryKind, LzwError, MAX_CODES};

/// The configuration of an encoding operation.
///
/// An `Encoder` holds no coding state. Every call creates its own dictionary and code width,
/// and releases them before it returns, so one `Encoder` can be reused for many inputs.
pub struct Encoder {
    order: BitOrder,
    dictionary: DictionaryKind,
    limit: Code,
}

/// A encoding stream sink.
///
/// See [`Encoder::into_stream`] on how to create this type and more information.
///
/// [`Encoder::into_stream`]: struct.Encoder.html#method.into_stream
pub struct IntoStream<'d, W> {
    encoder: &'d mut Encoder,
    writer: W,
}

trait Stateful {
    /// Feed more input bytes.
    fn advance(&mut self, inp: &[u8]) -> Result<(), LzwError>;
    /// Write the trailing code after the input is exhausted.
    fn finish(&mut self) -> Result<(), LzwError>;
    /// Complete bytes that have not yet been handed to the sink.
    fn output(&mut self) -> &mut Vec<u8>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// No byte has been read yet.
    Init,
    /// Exactly one byte has been read.
    Seed,
    /// The dictionary has its first entry and the first code was written.
    Running,
}

struct EncodeState<B: Buffer, D: Dictionary> {
    /// The string table of this operation.
    dict: D,
    /// The width of the next code word.
    width: CodeWidth,
    /// How far the input has progressed.
    phase: Phase,
    /// The code corresponding to the currently read characters.
    current_code: Code,
    /// The number of strings that could not be stored because the dictionary was full.
    full_misses: u64,
    /// The number of code words written, escapes included.
    codes_written: u64,
    /// The bit buffer for encoding.
    buffer: B,
}

struct MsbBuffer {
    /// Complete bytes.
    bytes: Vec<u8>,
    /// The buffer bits, left aligned.
    buffer: u64,
    /// The number of valid buffer bits.
    bits_in_buffer: u8,
}

struct LsbBuffer {
    /// Complete bytes.
    bytes: Vec<u8>,
    /// The buffer bits, right aligned.
    buffer: u64,
    /// The number of valid buffer bits.
    bits_in_buffer: u8,
}

/// Appends code words of a given width to a byte stream.
trait Buffer {
    fn new() -> Self;
    /// Insert the lowest `size` bits of `code`.
    fn buffer_code(&mut self, code: Code, size: u8);
    /// Pad the buffer to a full byte with zero bits.
    fn buffer_pad(&mut self);
    /// The complete bytes written so far.
    fn bytes(&mut self) -> &mut Vec<u8>;
}

impl Encoder {
    /// Create an encoder using the default search tree dictionary.
    pub fn new(order: BitOrder) -> Self {
        Self::with_dictionary(order, DictionaryKind::default())
    }

    /// Create an encoder with a specific dictionary implementation.
    ///
    /// The choice does not change the output, only the lookup cost.
    pub fn with_dictionary(order: BitOrder, dictionary: DictionaryKind) -> Self {
        Encoder {
            order,
            dictionary,
            limit: MAX_CODES,
        }
    }

    /// Encode with a dictionary that stops growing at `limit`, exclusive.
    #[cfg(test)]
    pub(crate) fn with_code_limit(mut self, limit: Code) -> Self {
        self.limit = limit;
        self
    }

    /// Encode a complete buffer into a new vector.
    pub fn encode(&mut self, data: &[u8]) -> Result<Vec<u8>, LzwError> {
        let mut output = Vec::with_capacity(data.len() / 2 + 8);
        self.into_stream(&mut output).encode_all(data).status?;
        Ok(output)
    }

    /// Construct an encoder into a writer.
    ///
    /// The writer is flushed after encoding but not closed. Pass `&mut writer` to keep using
    /// it afterwards.
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            encoder: self,
            writer,
        }
    }

    /// Encode the file at `input` into the file at `output`, or standard output if `None`.
    ///
    /// Both files are closed before this returns. An output file is created, or truncated, even
    /// when encoding fails later.
    pub fn encode_file(&mut self, input: &Path, output: Option<&Path>) -> AllResult {
        let input = match File::open(input) {
            Ok(file) => BufReader::new(file),
            Err(source) => {
                return AllResult::failed(LzwError::Open {
                    path: input.to_owned(),
                    source,
                })
            }
        };

        match output {
            None => {
                let stdout = io::stdout();
                self.into_stream(stdout.lock()).encode_all(input)
            }
            Some(path) => match File::create(path) {
                Ok(file) => self.into_stream(BufWriter::new(file)).encode_all(input),
                Err(source) => AllResult::failed(LzwError::Open {
                    path: path.to_owned(),
                    source,
                }),
            },
        }
    }

    fn start(&self) -> Box<dyn Stateful + Send + 'static> {
        type Boxed = Box<dyn Stateful + Send + 'static>;
        let limit = self.limit;
        match (self.order, self.dictionary) {
            (BitOrder::Msb, DictionaryKind::Tree) => {
                Box::new(EncodeState::<MsbBuffer, _>::new(TreeDictionary::with_limit(limit)))
                    as Boxed
            }
            (BitOrder::Msb, DictionaryKind::Hashed) => {
                Box::new(EncodeState::<MsbBuffer, _>::new(HashDictionary::with_limit(limit)))
                    as Boxed
            }
            (BitOrder::Lsb, DictionaryKind::Tree) => {
                Box::new(EncodeState::<LsbBuffer, _>::new(TreeDictionary::with_limit(limit)))
                    as Boxed
            }
            (BitOrder::Lsb, DictionaryKind::Hashed) => {
                Box::new(EncodeState::<LsbBuffer, _>::new(HashDictionary::with_limit(limit)))
                    as Boxed
            }
        }
    }
}

impl<W: Write> IntoStream<'_, W> {
    /// Encode all data from a reader.
    ///
    /// This drains the reader. An empty reader is reported as [`LzwError::EmptyInput`] and
    /// nothing is written.
    pub fn encode_all(mut self, mut read: impl BufRead) -> AllResult {
        let IntoStream { encoder, writer } = &mut self;
        let mut state = encoder.start();

        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let status = (|| -> Result<(), LzwError> {
            loop {
                let data = read.fill_buf()?;
                if data.is_empty() {
                    break;
                }

                let consumed = data.len();
                state.advance(data)?;
                read.consume(consumed);
                bytes_read += consumed;
                bytes_written += drain_into(state.output(), writer)?;
            }

            state.finish()?;
            bytes_written += drain_into(state.output(), writer)?;
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

fn drain_into(bytes: &mut Vec<u8>, writer: &mut impl Write) -> io::Result<usize> {
    writer.write_all(bytes)?;
    let len = bytes.len();
    bytes.clear();
    Ok(len)
}

impl<B: Buffer, D: Dictionary> EncodeState<B, D> {
    fn new(dict: D) -> Self {
        EncodeState {
            dict,
            width: CodeWidth::new(),
            phase: Phase::Init,
            current_code: 0,
            full_misses: 0,
            codes_written: 0,
            buffer: B::new(),
        }
    }

    /// Extend the current string by one byte, writing a code if it has no entry yet.
    fn step(&mut self, byte: u8) -> Result<(), LzwError> {
        let at = self.dict.locate(self.current_code, byte);
        if let Some(code) = at.found() {
            self.current_code = code;
            return Ok(());
        }

        if self.dict.insert(at, self.current_code, byte)?.is_none() {
            self.dictionary_full();
        }

        self.emit(self.current_code);
        self.current_code = Code::from(byte);
        Ok(())
    }

    fn dictionary_full(&mut self) {
        if self.full_misses == 0 {
            warn!(
                "dictionary full at {} entries, continuing without new strings",
                self.dict.len()
            );
        }
        self.full_misses += 1;
    }

    /// Write a code, preceded by any escapes needed to widen the code words for it.
    fn emit(&mut self, code: Code) {
        let EncodeState {
            width,
            buffer,
            codes_written,
            ..
        } = self;

        width.widen_for(code, |escape, size| {
            debug!("code {} needs more than {} bits, widening", code, size);
            buffer.buffer_code(escape, size);
            *codes_written += 1;
        });

        buffer.buffer_code(code, width.size());
        *codes_written += 1;
    }
}

impl<B: Buffer, D: Dictionary> Stateful for EncodeState<B, D> {
    fn advance(&mut self, inp: &[u8]) -> Result<(), LzwError> {
        let mut bytes = inp.iter();

        if self.phase == Phase::Init {
            match bytes.next() {
                Some(&byte) => {
                    self.current_code = Code::from(byte);
                    self.phase = Phase::Seed;
                }
                None => return Ok(()),
            }
        }

        if self.phase == Phase::Seed {
            match bytes.next() {
                Some(&byte) => {
                    let at = self.dict.locate(self.current_code, byte);
                    self.dict.insert(at, self.current_code, byte)?;
                    // A literal always fits the initial width.
                    self.buffer.buffer_code(self.current_code, self.width.size());
                    self.codes_written += 1;
                    self.current_code = Code::from(byte);
                    self.phase = Phase::Running;
                }
                None => return Ok(()),
            }
        }

        for &byte in bytes {
            self.step(byte)?;
        }

        Ok(())
    }

    fn finish(&mut self) -> Result<(), LzwError> {
        if self.phase == Phase::Init {
            return Err(LzwError::EmptyInput);
        }

        self.emit(self.current_code);
        self.buffer.buffer_pad();

        debug!(
            "encoded {} code words, {} dictionary entries, final width {} bits",
            self.codes_written,
            self.dict.len(),
            self.width.size()
        );
        if self.full_misses > 0 {
            debug!("{} strings not stored in the full dictionary", self.full_misses);
        }

        Ok(())
    }

    fn output(&mut self) -> &mut Vec<u8> {
        self.buffer.bytes()
    }
}

impl Buffer for MsbBuffer {
    fn new() -> Self {
        MsbBuffer {
            bytes: Vec::new(),
            buffer: 0,
            bits_in_buffer: 0,
        }
    }

    fn buffer_code(&mut self, code: Code, size: u8) {
        let shift = 64 - self.bits_in_buffer - size;
        self.buffer |= u64::from(code) << shift;
        self.bits_in_buffer += size;

        while self.bits_in_buffer >= 8 {
            self.bytes.push((self.buffer >> 56) as u8);
            self.buffer <<= 8;
            self.bits_in_buffer -= 8;
        }
    }

    fn buffer_pad(&mut self) {
        if self.bits_in_buffer > 0 {
            self.bytes.push((self.buffer >> 56) as u8);
            self.buffer = 0;
            self.bits_in_buffer = 0;
        }
    }

    fn bytes(&mut self) -> &mut Vec<u8> {
        &mut self.bytes
    }
}

impl Buffer for LsbBuffer {
    fn new() -> Self {
        LsbBuffer {
            bytes: Vec::new(),
            buffer: 0,
            bits_in_buffer: 0,
        }
    }

    fn buffer_code(&mut self, code: Code, size: u8) {
        self.buffer |= u64::from(code) << self.bits_in_buffer;
        self.bits_in_buffer += size;

        while self.bits_in_buffer >= 8 {
            self.bytes.push(self.buffer as u8);
            self.buffer >>= 8;
            self.bits_in_buffer -= 8;
        }
    }

    fn buffer_pad(&mut self) {
        if self.bits_in_buffer > 0 {
            self.bytes.push(self.buffer as u8);
            self.buffer = 0;
            self.bits_in_buffer = 0;
        }
    }

    fn bytes(&mut self) -> &mut Vec<u8> {
        &mut self.bytes
    }
}
