//! The adaptive string table of the encoder.
//!
//! Every entry denotes the string of its prefix code extended by one suffix byte. Codes below
//! [`FIRST_CODE`] are the literal bytes and are never stored. Stored entries get consecutive
//! codes from [`FIRST_CODE`] upwards, in insertion order, and are never changed or removed
//! while the dictionary lives.
//!
//! [`FIRST_CODE`]: crate::FIRST_CODE
use std::collections::HashMap;

use crate::{Code, LzwError, FIRST_CODE, MAX_CODES, MAX_CODESIZE};

/// Total order of dictionary strings, derived from prefix code and suffix byte.
pub type Key = u32;

/// Make the search key of the string `prefix + suffix`.
///
/// The key is `{high nibble of suffix} {prefix} {low nibble of suffix}`. As long as `prefix`
/// is below [`MAX_CODES`] distinct pairs never share a key.
pub fn make_key(prefix: Code, suffix: u8) -> Key {
    debug_assert!(prefix < MAX_CODES);
    let high = Key::from(suffix & 0xf0) << MAX_CODESIZE;
    let low = Key::from(suffix & 0x0f);
    high | (prefix << 4) | low
}

/// One stored string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    /// The code assigned to this string.
    pub code: Code,
    /// The code of the string without its last byte.
    pub prefix: Code,
    /// The last byte of the string.
    pub suffix: u8,
}

/// The outcome of searching for a string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location<S> {
    /// The string is stored under this code.
    Found(Code),
    /// The string is not stored. It would be attached at this slot.
    Vacant(S),
    /// The dictionary holds no entries at all.
    Empty,
}

impl<S> Location<S> {
    /// The code of the string, if it was found.
    pub fn found(&self) -> Option<Code> {
        match *self {
            Location::Found(code) => Some(code),
            _ => None,
        }
    }
}

/// A lookup-or-insert table from `(prefix, suffix)` pairs to codes.
pub trait Dictionary {
    /// Where a missing string gets attached.
    type Slot: Copy;

    /// Search for the string `prefix + suffix`.
    fn locate(&self, prefix: Code, suffix: u8) -> Location<Self::Slot>;

    /// Store the string `prefix + suffix` at a location returned by [`locate`].
    ///
    /// Returns the newly assigned code, or `None` when the string was already present or the
    /// dictionary is full. A full dictionary is left unchanged. Must only be called with the
    /// result of the latest `locate`, before any other insertion.
    ///
    /// [`locate`]: #tymethod.locate
    fn insert(
        &mut self,
        at: Location<Self::Slot>,
        prefix: Code,
        suffix: u8,
    ) -> Result<Option<Code>, LzwError>;

    /// Look up the entry with a given code.
    fn get(&self, code: Code) -> Option<Entry>;

    /// The number of stored entries.
    fn len(&self) -> usize;

    /// If no further entries can be stored.
    fn is_full(&self) -> bool;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The code the next stored entry receives.
    fn next_code(&self) -> Code {
        FIRST_CODE + self.len() as Code
    }
}

/// Which child of a tree node a new entry is attached as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Lesser,
    Greater,
}

/// Attach point in a [`TreeDictionary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeSlot {
    parent: u32,
    side: Side,
}

/// An unbalanced binary search tree, ordered by [`make_key`].
///
/// Nodes live in an arena in code order, so the node of code `c` is at index `c - FIRST_CODE`
/// and the whole tree is released at once. Searches walk the tree iteratively.
pub struct TreeDictionary {
    nodes: Vec<Node>,
    limit: Code,
}

#[derive(Clone, Copy)]
struct Node {
    entry: Entry,
    key: Key,
    lesser: Option<u32>,
    greater: Option<u32>,
}

/// A hash map from `(prefix, suffix)` to code.
pub struct HashDictionary {
    codes: HashMap<(Code, u8), Code>,
    entries: Vec<Entry>,
    limit: Code,
}

impl TreeDictionary {
    pub fn new() -> Self {
        Self::with_limit(MAX_CODES)
    }

    /// A dictionary that stops assigning codes at `limit`, exclusive.
    pub(crate) fn with_limit(limit: Code) -> Self {
        TreeDictionary {
            nodes: Vec::new(),
            limit,
        }
    }

    /// The number of nodes on the longest path from the root.
    ///
    /// Walks the tree without recursion.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = Vec::new();
        if !self.nodes.is_empty() {
            stack.push((0u32, 1usize));
        }

        while let Some((idx, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let node = &self.nodes[idx as usize];
            stack.extend(node.lesser.map(|child| (child, depth + 1)));
            stack.extend(node.greater.map(|child| (child, depth + 1)));
        }

        deepest
    }
}

impl Dictionary for TreeDictionary {
    type Slot = TreeSlot;

    fn locate(&self, prefix: Code, suffix: u8) -> Location<TreeSlot> {
        if self.nodes.is_empty() {
            return Location::Empty;
        }

        let search = make_key(prefix, suffix);
        let mut idx = 0u32;
        loop {
            let node = &self.nodes[idx as usize];
            let (child, side) = if search == node.key {
                return Location::Found(node.entry.code);
            } else if search < node.key {
                (node.lesser, Side::Lesser)
            } else {
                (node.greater, Side::Greater)
            };

            match child {
                Some(next) => idx = next,
                None => return Location::Vacant(TreeSlot { parent: idx, side }),
            }
        }
    }

    fn insert(
        &mut self,
        at: Location<TreeSlot>,
        prefix: Code,
        suffix: u8,
    ) -> Result<Option<Code>, LzwError> {
        if let Location::Found(_) = at {
            return Ok(None);
        }

        if self.is_full() {
            return Ok(None);
        }

        let code = self.next_code();
        self.nodes
            .try_reserve(1)
            .map_err(|_| LzwError::ResourceExhaustion { code })?;

        let idx = self.nodes.len() as u32;
        self.nodes.push(Node {
            entry: Entry {
                code,
                prefix,
                suffix,
            },
            key: make_key(prefix, suffix),
            lesser: None,
            greater: None,
        });

        if let Location::Vacant(TreeSlot { parent, side }) = at {
            let parent = &mut self.nodes[parent as usize];
            match side {
                Side::Lesser => parent.lesser = Some(idx),
                Side::Greater => parent.greater = Some(idx),
            }
        }

        Ok(Some(code))
    }

    fn get(&self, code: Code) -> Option<Entry> {
        let idx = code.checked_sub(FIRST_CODE)?;
        self.nodes.get(idx as usize).map(|node| node.entry)
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn is_full(&self) -> bool {
        self.next_code() >= self.limit
    }
}

impl HashDictionary {
    pub fn new() -> Self {
        Self::with_limit(MAX_CODES)
    }

    /// A dictionary that stops assigning codes at `limit`, exclusive.
    pub(crate) fn with_limit(limit: Code) -> Self {
        HashDictionary {
            codes: HashMap::new(),
            entries: Vec::new(),
            limit,
        }
    }
}

impl Dictionary for HashDictionary {
    type Slot = ();

    fn locate(&self, prefix: Code, suffix: u8) -> Location<()> {
        if self.entries.is_empty() {
            return Location::Empty;
        }

        match self.codes.get(&(prefix, suffix)) {
            Some(&code) => Location::Found(code),
            None => Location::Vacant(()),
        }
    }

    fn insert(
        &mut self,
        at: Location<()>,
        prefix: Code,
        suffix: u8,
    ) -> Result<Option<Code>, LzwError> {
        if at.found().is_some() || self.is_full() {
            return Ok(None);
        }

        let code = self.next_code();
        let exhausted = |_| LzwError::ResourceExhaustion { code };
        self.entries.try_reserve(1).map_err(exhausted)?;
        self.codes.try_reserve(1).map_err(exhausted)?;

        self.entries.push(Entry {
            code,
            prefix,
            suffix,
        });
        self.codes.insert((prefix, suffix), code);
        Ok(Some(code))
    }

    fn get(&self, code: Code) -> Option<Entry> {
        let idx = code.checked_sub(FIRST_CODE)?;
        self.entries.get(idx as usize).copied()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_full(&self) -> bool {
        self.next_code() >= self.limit
    }
}

impl Default for TreeDictionary {
    fn default() -> Self {
        TreeDictionary::new()
    }
}

impl Default for HashDictionary {
    fn default() -> Self {
        HashDictionary::new()
    }
}
