use crate::entity::Entity;
use std::collections::HashMap;

/// Entities keyed by the code-unit positions where they start and end.
///
/// Values are indices into the slice the index was built from. Entities that
/// start at the same position keep input order; entities that end at the same
/// position are listed in reverse input order, so the one opened last closes
/// first.
#[derive(Debug, Default)]
pub struct PositionIndex {
    starts: HashMap<usize, Vec<usize>>,
    ends: HashMap<usize, Vec<usize>>,
}

impl PositionIndex {
    pub fn build(entities: &[Entity]) -> Self {
        let mut index = Self::default();
        for (idx, entity) in entities.iter().enumerate() {
            index.starts.entry(entity.offset).or_default().push(idx);
        }
        for (idx, entity) in entities.iter().enumerate().rev() {
            index.ends.entry(entity.end()).or_default().push(idx);
        }
        index
    }

    pub fn starts_at(&self, position: usize) -> &[usize] {
        self.starts.get(&position).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn ends_at(&self, position: usize) -> &[usize] {
        self.ends.get(&position).map(Vec::as_slice).unwrap_or(&[])
    }
}
