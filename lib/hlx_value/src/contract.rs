use crate::ValueError;
use crate::Value;

/// A `Contract` instruction payload: a numeric contract id plus a set of
/// fields keyed by a distinct `u32` index.
///
/// Wire order (and therefore digest order) is always ascending by index;
/// `Contract` enforces that at construction so every consumer downstream
/// (codecs, digest, dispatcher) can rely on it without re-sorting.
#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    contract_id: u32,
    fields: Vec<(u32, Value)>,
}

impl Contract {
    pub fn new(contract_id: u32, mut fields: Vec<(u32, Value)>) -> Result<Self, ValueError> {
        fields.sort_by_key(|(idx, _)| *idx);
        for pair in fields.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(ValueError::DuplicateFieldIndex(pair[0].0));
            }
        }
        Ok(Contract { contract_id, fields })
    }

    pub fn contract_id(&self) -> u32 {
        self.contract_id
    }

    pub fn field(&self, index: u32) -> Option<&Value> {
        self.fields
            .binary_search_by_key(&index, |(idx, _)| *idx)
            .ok()
            .map(|pos| &self.fields[pos].1)
    }

    /// Fields in ascending index order — the one and only order this type
    /// can hold.
    pub fn fields(&self) -> &[(u32, Value)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
