//! Interned name table.
//!
//! Every property name used as a key goes through this table so that equal
//! names share one `InternedName` instance. Name equality is then a pointer
//! comparison and name hashing reads a hash computed once at intern time.
//!
//! Names keep the width they were created with: ASCII-only text is stored
//! narrow (8-bit), anything else keeps its UTF-16 code units. Both encodings
//! of the same text intern to the same entry because wide ASCII input is
//! narrowed before the lookup and wide non-ASCII input is looked up under its
//! WTF-8 byte form.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use hashbrown::HashMap;
use rustc_hash::{FxBuildHasher, FxHasher};

use crate::value::CheapClone;

/// Stored content of an interned name
#[derive(Debug)]
pub enum NameContent {
    /// ASCII text
    Narrow(Box<str>),
    /// UTF-16 code units containing at least one non-ASCII unit
    Wide(Box<[u16]>),
}

#[derive(Debug)]
struct NameInner {
    content: NameContent,
    hash: u64,
}

/// Canonical handle for a name registered in a [`NameTable`].
#[derive(Clone)]
pub struct InternedName(Rc<NameInner>);

impl CheapClone for InternedName {}

impl InternedName {
    pub fn content(&self) -> &NameContent {
        &self.0.content
    }

    pub fn is_narrow(&self) -> bool {
        matches!(self.0.content, NameContent::Narrow(_))
    }

    /// Borrow the text if the name is narrow
    pub fn as_narrow(&self) -> Option<&str> {
        match &self.0.content {
            NameContent::Narrow(s) => Some(s),
            NameContent::Wide(_) => None,
        }
    }

    /// Length in code units
    pub fn len(&self) -> usize {
        match &self.0.content {
            NameContent::Narrow(s) => s.len(),
            NameContent::Wide(units) => units.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hash computed once when the name was interned
    pub fn precomputed_hash(&self) -> u64 {
        self.0.hash
    }

    pub fn to_utf16(&self) -> Vec<u16> {
        match &self.0.content {
            NameContent::Narrow(s) => s.encode_utf16().collect(),
            NameContent::Wide(units) => units.to_vec(),
        }
    }

    pub fn eq_str(&self, other: &str) -> bool {
        match &self.0.content {
            NameContent::Narrow(s) => &**s == other,
            NameContent::Wide(units) => units.iter().copied().eq(other.encode_utf16()),
        }
    }

    pub fn ptr_eq(&self, other: &InternedName) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for InternedName {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for InternedName {}

impl Hash for InternedName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl fmt::Display for InternedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.content {
            NameContent::Narrow(s) => f.write_str(s),
            NameContent::Wide(units) => f.write_str(&String::from_utf16_lossy(units)),
        }
    }
}

impl fmt::Debug for InternedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string())
    }
}

/// A table deduplicating property names.
///
/// Entries live as long as the table; there is no removal.
pub struct NameTable {
    /// Canonical byte key (ASCII or WTF-8) to the shared name
    names: HashMap<Box<[u8]>, InternedName, FxBuildHasher>,
}

impl NameTable {
    pub fn new() -> Self {
        Self {
            names: HashMap::with_hasher(FxBuildHasher),
        }
    }

    /// Create a table pre-populated with frequently used names.
    pub fn with_common_names() -> Self {
        let mut table = Self::new();
        for name in COMMON_NAMES {
            table.intern(name);
        }
        table
    }

    /// Intern Rust text. Non-ASCII text is stored as UTF-16.
    pub fn intern(&mut self, s: &str) -> InternedName {
        if s.is_ascii() {
            return self.intern_ascii(s.as_bytes());
        }
        // Valid UTF-8 is already its own WTF-8 form.
        let units: Vec<u16> = s.encode_utf16().collect();
        self.intern_wide_with_key(s.as_bytes(), &units)
    }

    /// Intern 8-bit code units. Bytes above 0x7F are Latin-1 and widened.
    pub fn intern_narrow(&mut self, bytes: &[u8]) -> InternedName {
        if bytes.is_ascii() {
            return self.intern_ascii(bytes);
        }
        let units: Vec<u16> = bytes.iter().map(|&b| u16::from(b)).collect();
        self.intern_wide(&units)
    }

    /// Intern UTF-16 code units. All-ASCII input is narrowed first.
    pub fn intern_wide(&mut self, units: &[u16]) -> InternedName {
        if units.iter().all(|&u| u < 0x80) {
            let bytes: Vec<u8> = units.iter().map(|&u| (u & 0x7F) as u8).collect();
            return self.intern_ascii(&bytes);
        }
        let key = wtf8_encode(units);
        self.intern_wide_with_key(&key, units)
    }

    /// Look up a name without inserting.
    pub fn get(&self, s: &str) -> Option<InternedName> {
        self.names.get(s.as_bytes()).map(|n| n.cheap_clone())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn intern_ascii(&mut self, bytes: &[u8]) -> InternedName {
        if let Some(existing) = self.names.get(bytes) {
            return existing.cheap_clone();
        }
        let text: String = bytes.iter().map(|&b| char::from(b)).collect();
        let name = InternedName(Rc::new(NameInner {
            content: NameContent::Narrow(text.into_boxed_str()),
            hash: hash_key(bytes),
        }));
        self.names.insert(bytes.into(), name.cheap_clone());
        name
    }

    fn intern_wide_with_key(&mut self, key: &[u8], units: &[u16]) -> InternedName {
        if let Some(existing) = self.names.get(key) {
            return existing.cheap_clone();
        }
        let name = InternedName(Rc::new(NameInner {
            content: NameContent::Wide(units.into()),
            hash: hash_key(key),
        }));
        self.names.insert(key.into(), name.cheap_clone());
        name
    }
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

fn hash_key(bytes: &[u8]) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(bytes);
    hasher.finish()
}

/// WTF-8: UTF-8 that also encodes unpaired surrogates as 3-byte sequences,
/// so every UTF-16 sequence has exactly one byte form.
fn wtf8_encode(units: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(units.len() * 3);
    let mut buf = [0u8; 4];
    for decoded in char::decode_utf16(units.iter().copied()) {
        match decoded {
            Ok(c) => out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes()),
            Err(err) => {
                let u = err.unpaired_surrogate();
                out.push(0xE0 | (u >> 12) as u8);
                out.push(0x80 | ((u >> 6) & 0x3F) as u8);
                out.push(0x80 | (u & 0x3F) as u8);
            }
        }
    }
    out
}

/// Names that show up on nearly every object.
const COMMON_NAMES: &[&str] = &[
    // Object properties
    "length",
    "prototype",
    "constructor",
    "__proto__",
    "name",
    "message",
    // Property descriptors
    "value",
    "writable",
    "enumerable",
    "configurable",
    "get",
    "set",
    // Common methods
    "toString",
    "valueOf",
    "hasOwnProperty",
    "toJSON",
    // Iteration protocol
    "next",
    "done",
    "return",
];
