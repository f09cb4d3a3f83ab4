//! The core LC-R glyph table, lifted from
//! `runtime/hlx_runtime/glyphs.py`'s `LC_R_GLYPHS`. The extended
//! Celtic/Futhark/Alchemical sets in that file are decorative
//! alternatives the original reserves for experimental display and are
//! not part of this wire format.

pub const NULL: char = '\u{2205}';
pub const TRUE: char = '\u{22A4}';
pub const FALSE: char = '\u{22A5}';
pub const HANDLE: char = '\u{27C1}';
pub const CONTRACT_START: char = '\u{1F70A}';
pub const FIELD: char = '\u{1F701}';
pub const CONTRACT_END: char = '\u{1F702}';
pub const INT: char = '\u{1F703}';
pub const FLOAT: char = '\u{1F704}';
pub const TEXT: char = '\u{16ED}';
pub const BYTES: char = '\u{16EB}';
pub const ARRAY: char = '\u{22D4}';
pub const OBJECT: char = '\u{22D5}';
pub const SEPARATOR: char = '\u{22C5}';
pub const BIND: char = '\u{22EF}';
