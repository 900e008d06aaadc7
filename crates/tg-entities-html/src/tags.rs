use crate::entity::{Entity, EntityKind, EntityType};
use crate::error::TagError;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::HashMap;

/// Opening and closing markup for one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPair {
    pub start: Cow<'static, str>,
    pub end: Cow<'static, str>,
}

impl TagPair {
    pub const fn fixed(start: &'static str, end: &'static str) -> Self {
        Self {
            start: Cow::Borrowed(start),
            end: Cow::Borrowed(end),
        }
    }

    pub fn new(start: impl Into<Cow<'static, str>>, end: impl Into<Cow<'static, str>>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Maps entities to markup.
///
/// `supports` decides which type identifiers are recognized at all: entities of
/// an unsupported type are dropped during validation.
pub trait TagResolver {
    fn supports(&self, entity_type: EntityType) -> bool;

    fn resolve(&self, entity: &Entity) -> Result<TagPair, TagError>;
}

impl<R: TagResolver + ?Sized> TagResolver for &R {
    fn supports(&self, entity_type: EntityType) -> bool {
        (**self).supports(entity_type)
    }

    fn resolve(&self, entity: &Entity) -> Result<TagPair, TagError> {
        (**self).resolve(entity)
    }
}

impl<R: TagResolver + ?Sized> TagResolver for Box<R> {
    fn supports(&self, entity_type: EntityType) -> bool {
        (**self).supports(entity_type)
    }

    fn resolve(&self, entity: &Entity) -> Result<TagPair, TagError> {
        (**self).resolve(entity)
    }
}

/// The markup Telegram accepts with `parse_mode: "HTML"`.
///
/// Payload values are inserted verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelegramTags;

impl TagResolver for TelegramTags {
    fn supports(&self, _entity_type: EntityType) -> bool {
        true
    }

    fn resolve(&self, entity: &Entity) -> Result<TagPair, TagError> {
        Ok(match &entity.kind {
            EntityKind::Bold => TagPair::fixed("<b>", "</b>"),
            EntityKind::Italic => TagPair::fixed("<i>", "</i>"),
            EntityKind::Underline => TagPair::fixed("<u>", "</u>"),
            EntityKind::Strikethrough => TagPair::fixed("<s>", "</s>"),
            EntityKind::Spoiler => TagPair::fixed("<tg-spoiler>", "</tg-spoiler>"),
            EntityKind::Blockquote => TagPair::fixed("<blockquote>", "</blockquote>"),
            EntityKind::ExpandableBlockquote => {
                TagPair::fixed("<blockquote class=\"expandable\">", "</blockquote>")
            }
            EntityKind::Code => TagPair::fixed("<code>", "</code>"),
            EntityKind::Pre { language: None } => TagPair::fixed("<pre>", "</pre>"),
            EntityKind::Pre {
                language: Some(language),
            } => TagPair::new(
                format!("<pre><code class=\"language-{}\">", language),
                "</code></pre>",
            ),
            EntityKind::TextLink { url } => TagPair::new(format!("<a href=\"{}\">", url), "</a>"),
            EntityKind::TextMention { user_id } => {
                TagPair::new(format!("<a href=\"tg://user?id={}\">", user_id), "</a>")
            }
            EntityKind::CustomEmoji { custom_emoji_id } => TagPair::new(
                format!("<tg-emoji emoji-id=\"{}\">", custom_emoji_id),
                "</tg-emoji>",
            ),
        })
    }
}

/// A fixed string pair per entity type, for callers that want their own markup.
///
/// Deserializes from a JSON object such as
/// `{"bold": ["<strong>", "</strong>"]}`. Types without an entry are not
/// supported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "HashMap<EntityType, (String, String)>")]
pub struct TagTable {
    tags: HashMap<EntityType, TagPair>,
}

impl TagTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        entity_type: EntityType,
        start: impl Into<Cow<'static, str>>,
        end: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.insert(entity_type, TagPair::new(start, end));
        self
    }

    pub fn insert(&mut self, entity_type: EntityType, tags: TagPair) -> Option<TagPair> {
        self.tags.insert(entity_type, tags)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl From<HashMap<EntityType, (String, String)>> for TagTable {
    fn from(table: HashMap<EntityType, (String, String)>) -> Self {
        Self {
            tags: table
                .into_iter()
                .map(|(entity_type, (start, end))| (entity_type, TagPair::new(start, end)))
                .collect(),
        }
    }
}

impl TagResolver for TagTable {
    fn supports(&self, entity_type: EntityType) -> bool {
        self.tags.contains_key(&entity_type)
    }

    fn resolve(&self, entity: &Entity) -> Result<TagPair, TagError> {
        Ok(self
            .tags
            .get(&entity.entity_type())
            .cloned()
            .unwrap_or_default())
    }
}
