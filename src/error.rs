use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::Code;

/// The error kind of an encoding or decoding operation.
#[derive(Debug, Error)]
pub enum LzwError {
    /// An input or output file could not be opened.
    #[error("could not open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input to the encoder contained no bytes at all.
    ///
    /// No code word is written in this case.
    #[error("input is empty, there is nothing to encode")]
    EmptyInput,

    /// Memory for a new dictionary entry could not be obtained.
    #[error("could not allocate the dictionary entry for code {code}")]
    ResourceExhaustion { code: Code },

    /// The compressed stream contained a code that is not valid at its position.
    #[error("invalid code {code} read with a width of {width} bits")]
    InvalidCode { code: Code, width: u8 },

    /// Reading from the source or writing to the sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}
