use crate::entity::Entity;
use crate::index::PositionIndex;
use crate::EntityOutput;

/// Walks `text` one UTF-8 scalar at a time, counting UTF-16 code units, and
/// emits text and entity boundaries to `output`.
///
/// With `fix_inaccuracies`, a supplementary-plane scalar (two code units)
/// also closes entities ending at its second code unit and opens entities
/// starting there, since those positions fall inside a surrogate pair and
/// would otherwise never be visited.
pub fn process_entities<O: EntityOutput>(
    text: &str,
    entities: &[Entity],
    index: &PositionIndex,
    fix_inaccuracies: bool,
    output: &mut O,
) -> Result<(), O::Error> {
    let mut scanner = Scanner {
        entities,
        index,
        fix_inaccuracies,
        open: Vec::new(),
    };
    scanner.run(text, output)
}

struct Scanner<'e> {
    entities: &'e [Entity],
    index: &'e PositionIndex,
    fix_inaccuracies: bool,
    // Indices of opened entities, innermost last.
    open: Vec<usize>,
}

impl Scanner<'_> {
    fn run<O: EntityOutput>(&mut self, text: &str, output: &mut O) -> Result<(), O::Error> {
        let mut units = 0;
        let mut last_increment = 0;
        let mut pending = 0;

        for (byte_index, &byte) in text.as_bytes().iter().enumerate() {
            if is_continuation(byte) {
                continue;
            }

            if let Some(scalar) = text.get(pending..byte_index) {
                if !scalar.is_empty() {
                    output.write_text(scalar)?;
                }
            }

            self.close_at(units, output)?;
            if self.fix_inaccuracies && last_increment == 2 && !self.open.is_empty() {
                self.close_at(units - 1, output)?;
            }
            self.open_at(units, output)?;

            last_increment = utf16_width(byte);
            if self.fix_inaccuracies && last_increment == 2 {
                self.open_at(units + 1, output)?;
            }

            units += last_increment;
            pending = byte_index;
        }

        if let Some(rest) = text.get(pending..) {
            if !rest.is_empty() {
                output.write_text(rest)?;
            }
        }

        self.close_at(units, output)?;

        // Entities running past the end of the text.
        while let Some(idx) = self.open.pop() {
            output.end_entity(&self.entities[idx])?;
        }

        Ok(())
    }

    fn open_at<O: EntityOutput>(&mut self, position: usize, output: &mut O) -> Result<(), O::Error> {
        let index = self.index;
        for &idx in index.starts_at(position) {
            output.start_entity(&self.entities[idx])?;
            self.open.push(idx);
        }
        Ok(())
    }

    // The index only says how many entities close here. Each close pops the
    // innermost open entity and emits that entity's own end tag; the listed
    // entity is used only when nothing is open.
    fn close_at<O: EntityOutput>(&mut self, position: usize, output: &mut O) -> Result<(), O::Error> {
        let index = self.index;
        for &listed in index.ends_at(position) {
            let idx = self.open.pop().unwrap_or(listed);
            output.end_entity(&self.entities[idx])?;
        }
        Ok(())
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

// Four-byte sequences encode supplementary-plane scalars, which take a
// surrogate pair in UTF-16.
fn utf16_width(lead: u8) -> usize {
    if lead >= 0xF0 { 2 } else { 1 }
}
