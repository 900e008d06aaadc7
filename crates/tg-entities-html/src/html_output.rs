use crate::EntityOutput;
use crate::entity::Entity;
use crate::error::ProcessError;
use crate::tags::TagResolver;
use std::fmt::Write;

/// Writes escaped text and resolved entity markup to a [`fmt::Write`](Write) sink.
pub struct HtmlEntityOutput<'r, W: Write, R: TagResolver + ?Sized> {
    writer: W,
    tags: &'r R,
}

impl<'r, W: Write, R: TagResolver + ?Sized> HtmlEntityOutput<'r, W, R> {
    pub fn new(writer: W, tags: &'r R) -> Self {
        Self { writer, tags }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write, R: TagResolver + ?Sized> EntityOutput for HtmlEntityOutput<'_, W, R> {
    type Error = ProcessError;

    fn write_text(&mut self, text: &str) -> Result<(), Self::Error> {
        for c in text.chars() {
            match c {
                '&' => self.writer.write_str("&amp;")?,
                '<' => self.writer.write_str("&lt;")?,
                '>' => self.writer.write_str("&gt;")?,
                _ => self.writer.write_char(c)?,
            }
        }
        Ok(())
    }

    fn start_entity(&mut self, entity: &Entity) -> Result<(), Self::Error> {
        let tags = self.tags.resolve(entity)?;
        self.writer.write_str(&tags.start)?;
        Ok(())
    }

    fn end_entity(&mut self, entity: &Entity) -> Result<(), Self::Error> {
        let tags = self.tags.resolve(entity)?;
        self.writer.write_str(&tags.end)?;
        Ok(())
    }
}
