//! Telegram entities to HTML
//!
//! Telegram delivers formatted messages as plain text plus a list of entities,
//! each covering a range of UTF-16 code units. This crate turns that pair back
//! into the HTML markup the Bot API accepts with `parse_mode: "HTML"`.
//!
//! ```
//! use serde_json::json;
//! use tg_entities_html::Renderer;
//!
//! let entities = vec![json!({"type": "bold", "offset": 21, "length": 4})];
//! let html = Renderer::new()
//!     .render("😎 Text message with bold", &entities)
//!     .unwrap();
//! assert_eq!(html, "😎 Text message with <b>bold</b>");
//! ```

mod entity;
mod error;
mod html_output;
mod index;
mod renderer;
mod scanner;
mod tags;

pub use entity::{Entity, EntityKind, EntityType, validate_entities};
pub use error::{ProcessError, RenderError, Rejected, TagError, UnknownEntityType};
pub use html_output::HtmlEntityOutput;
pub use index::PositionIndex;
pub use renderer::{ErrorPolicy, Renderer, RendererConfig, render_html};
pub use scanner::process_entities;
pub use tags::{TagPair, TagResolver, TagTable, TelegramTags};

/// Receives the text and entity boundaries produced by [`process_entities`].
pub trait EntityOutput {
    type Error;

    fn write_text(&mut self, text: &str) -> Result<(), Self::Error>;
    fn start_entity(&mut self, entity: &Entity) -> Result<(), Self::Error>;
    fn end_entity(&mut self, entity: &Entity) -> Result<(), Self::Error>;
}
