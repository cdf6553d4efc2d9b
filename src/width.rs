//! The code width shared by encoder and decoder.
use crate::{Code, MAX_CODESIZE, MIN_CODESIZE};

/// The current code word width in bits.
///
/// The width only ever grows, one bit at a time, and every step is announced in the stream by
/// an escape: the all-ones word of the width that is being left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CodeWidth {
    size: u8,
}

impl CodeWidth {
    pub(crate) fn new() -> Self {
        CodeWidth {
            size: MIN_CODESIZE,
        }
    }

    /// Return the current code size in bits.
    pub(crate) fn size(&self) -> u8 {
        self.size
    }

    /// The reserved all-ones word at the current width.
    pub(crate) fn escape(&self) -> Code {
        (1 << self.size) - 1
    }

    pub(crate) fn can_grow(&self) -> bool {
        self.size < MAX_CODESIZE
    }

    pub(crate) fn grow(&mut self) {
        debug_assert!(self.can_grow());
        self.size += 1;
    }

    /// If a decoder must treat `code`, read at the current width, as a width increase.
    pub(crate) fn is_escape(&self, code: Code) -> bool {
        code == self.escape() && self.can_grow()
    }

    /// Widen until `code` can be written unambiguously.
    ///
    /// Calls `emit(escape, size)` once for every step, with the escape of the width that is
    /// being left. Afterwards `code` is strictly below the escape of the current width, unless
    /// the width is already at its maximum.
    pub(crate) fn widen_for(&mut self, code: Code, mut emit: impl FnMut(Code, u8)) {
        while code >= self.escape() && self.can_grow() {
            emit(self.escape(), self.size);
            self.size += 1;
        }
    }
}
