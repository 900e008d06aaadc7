use crate::entity::{Entity, validate_entities};
use crate::error::RenderError;
use crate::html_output::HtmlEntityOutput;
use crate::index::PositionIndex;
use crate::scanner::process_entities;
use crate::tags::{TagResolver, TelegramTags};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// What to do when rendering fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Log the failure and return the original text.
    #[default]
    Suppress,
    /// Return the failure to the caller.
    Propagate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Also match entity boundaries that fall inside a surrogate pair.
    pub fix_inaccuracies: bool,
    pub on_error: ErrorPolicy,
}

/// Renders text plus entities into HTML.
///
/// Holds only configuration; every call builds its own index and open-entity
/// stack, so one renderer can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct Renderer<R = TelegramTags> {
    tags: R,
    config: RendererConfig,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: TagResolver> Renderer<R> {
    pub fn with_tags(tags: R) -> Self {
        Self {
            tags,
            config: RendererConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RendererConfig) -> Self {
        self.config = config;
        self
    }

    pub fn fix_inaccuracies(mut self, fix_inaccuracies: bool) -> Self {
        self.config.fix_inaccuracies = fix_inaccuracies;
        self
    }

    pub fn throw_errors(mut self, throw_errors: bool) -> Self {
        self.config.on_error = if throw_errors {
            ErrorPolicy::Propagate
        } else {
            ErrorPolicy::Suppress
        };
        self
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Renders raw Bot API entity records.
    ///
    /// Malformed records are skipped. The text is returned borrowed when there
    /// is nothing to render, or when rendering failed and failures are
    /// suppressed.
    pub fn render<'a>(&self, text: &'a str, entities: &[Value]) -> Result<Cow<'a, str>, RenderError> {
        if text.is_empty() || entities.is_empty() {
            return Ok(Cow::Borrowed(text));
        }
        let valid = validate_entities(entities, &self.tags);
        self.render_valid(text, &valid, entities.len())
    }

    /// Renders entities that are already typed. Entities the tag resolver does
    /// not support, or with an empty range, are skipped.
    pub fn render_entities<'a>(
        &self,
        text: &'a str,
        entities: &[Entity],
    ) -> Result<Cow<'a, str>, RenderError> {
        if text.is_empty() || entities.is_empty() {
            return Ok(Cow::Borrowed(text));
        }
        let valid: Vec<Entity> = entities
            .iter()
            .filter(|entity| entity.is_renderable(&self.tags))
            .cloned()
            .collect();
        self.render_valid(text, &valid, entities.len())
    }

    /// Like [`render`](Self::render) for text that has not been checked to be
    /// UTF-8 yet. Invalid UTF-8 is an [`RenderError::Encoding`] failure.
    pub fn render_bytes<'a>(
        &self,
        text: &'a [u8],
        entities: &[Value],
    ) -> Result<Cow<'a, [u8]>, RenderError> {
        if text.is_empty() || entities.is_empty() {
            return Ok(Cow::Borrowed(text));
        }
        let valid = validate_entities(entities, &self.tags);
        if valid.is_empty() {
            return Ok(Cow::Borrowed(text));
        }

        let decoded = match std::str::from_utf8(text) {
            Ok(decoded) => decoded,
            Err(err) => {
                self.recover(RenderError::Encoding(err))?;
                return Ok(Cow::Borrowed(text));
            }
        };

        Ok(match self.render_valid(decoded, &valid, entities.len())? {
            Cow::Borrowed(_) => Cow::Borrowed(text),
            Cow::Owned(html) => Cow::Owned(html.into_bytes()),
        })
    }

    fn render_valid<'a>(
        &self,
        text: &'a str,
        entities: &[Entity],
        candidates: usize,
    ) -> Result<Cow<'a, str>, RenderError> {
        if entities.is_empty() {
            tracing::debug!(
                target: "tg_entities_html::render",
                candidates,
                "no usable entities, returning text unchanged"
            );
            return Ok(Cow::Borrowed(text));
        }

        let index = PositionIndex::build(entities);
        tracing::debug!(
            target: "tg_entities_html::render",
            text_len = text.len(),
            candidates,
            entities = entities.len(),
            fix_inaccuracies = self.config.fix_inaccuracies,
            "rendering entities"
        );

        let mut output = HtmlEntityOutput::new(String::with_capacity(text.len() * 2), &self.tags);
        match process_entities(
            text,
            entities,
            &index,
            self.config.fix_inaccuracies,
            &mut output,
        ) {
            Ok(()) => Ok(Cow::Owned(output.into_inner())),
            Err(err) => {
                self.recover(err.into())?;
                Ok(Cow::Borrowed(text))
            }
        }
    }

    fn recover(&self, error: RenderError) -> Result<(), RenderError> {
        match self.config.on_error {
            ErrorPolicy::Propagate => Err(error),
            ErrorPolicy::Suppress => {
                tracing::warn!(
                    target: "tg_entities_html::render",
                    %error,
                    "rendering failed, returning original text"
                );
                Ok(())
            }
        }
    }
}

/// Renders with the built-in Telegram tags and default configuration.
pub fn render_html(text: &str, entities: &[Value]) -> String {
    match Renderer::new().render(text, entities) {
        Ok(html) => html.into_owned(),
        Err(_) => text.to_owned(),
    }
}
