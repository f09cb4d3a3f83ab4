//! Wire tags for the LC-B recursive tag-prefixed encoding.

pub const NULL: u8 = 0;
pub const BOOL: u8 = 1;
pub const INT: u8 = 2;
pub const FLOAT: u8 = 3;
pub const TEXT: u8 = 4;
pub const BYTES: u8 = 5;
pub const ARRAY: u8 = 6;
pub const OBJECT: u8 = 7;
pub const HANDLE: u8 = 8;
pub const CHAIN_PREV: u8 = 9;
pub const CHAIN_FROM: u8 = 10;
/// The original tag table runs 0-10 and omits `Contract`, even though
/// contract fields are written in ascending index order as if LC-B
/// already encoded them. Tag 11 fills that gap so every `Value`
/// variant, including `Contract`, round-trips through LC-B.
pub const CONTRACT: u8 = 11;
