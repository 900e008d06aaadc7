use crate::error::{Rejected, UnknownEntityType};
use crate::tags::TagResolver;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Entity type identifiers as they appear in the Bot API `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    Blockquote,
    ExpandableBlockquote,
    Code,
    Pre,
    TextLink,
    TextMention,
    CustomEmoji,
}

impl EntityType {
    pub const ALL: [EntityType; 12] = [
        EntityType::Bold,
        EntityType::Italic,
        EntityType::Underline,
        EntityType::Strikethrough,
        EntityType::Spoiler,
        EntityType::Blockquote,
        EntityType::ExpandableBlockquote,
        EntityType::Code,
        EntityType::Pre,
        EntityType::TextLink,
        EntityType::TextMention,
        EntityType::CustomEmoji,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Bold => "bold",
            EntityType::Italic => "italic",
            EntityType::Underline => "underline",
            EntityType::Strikethrough => "strikethrough",
            EntityType::Spoiler => "spoiler",
            EntityType::Blockquote => "blockquote",
            EntityType::ExpandableBlockquote => "expandable_blockquote",
            EntityType::Code => "code",
            EntityType::Pre => "pre",
            EntityType::TextLink => "text_link",
            EntityType::TextMention => "text_mention",
            EntityType::CustomEmoji => "custom_emoji",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = UnknownEntityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| UnknownEntityType(s.to_owned()))
    }
}

/// Entity type together with its type-specific payload.
///
/// Scalar payloads are kept in their string rendering, which is what ends up
/// inside the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    Blockquote,
    ExpandableBlockquote,
    Code,
    Pre { language: Option<String> },
    TextLink { url: String },
    TextMention { user_id: String },
    CustomEmoji { custom_emoji_id: String },
}

impl EntityKind {
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityKind::Bold => EntityType::Bold,
            EntityKind::Italic => EntityType::Italic,
            EntityKind::Underline => EntityType::Underline,
            EntityKind::Strikethrough => EntityType::Strikethrough,
            EntityKind::Spoiler => EntityType::Spoiler,
            EntityKind::Blockquote => EntityType::Blockquote,
            EntityKind::ExpandableBlockquote => EntityType::ExpandableBlockquote,
            EntityKind::Code => EntityType::Code,
            EntityKind::Pre { .. } => EntityType::Pre,
            EntityKind::TextLink { .. } => EntityType::TextLink,
            EntityKind::TextMention { .. } => EntityType::TextMention,
            EntityKind::CustomEmoji { .. } => EntityType::CustomEmoji,
        }
    }
}

/// A validated annotation. `offset` and `length` are in UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub offset: usize,
    pub length: usize,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(offset: usize, length: usize, kind: EntityKind) -> Self {
        Self {
            offset,
            length,
            kind,
        }
    }

    /// First code unit after the entity.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }

    pub fn entity_type(&self) -> EntityType {
        self.kind.entity_type()
    }

    /// Whether this entity can take part in a render with the given tags.
    pub fn is_renderable<R: TagResolver + ?Sized>(&self, tags: &R) -> bool {
        self.length > 0
            && self.offset.checked_add(self.length).is_some()
            && tags.supports(self.entity_type())
    }

    /// Parses one loosely-typed Bot API entity record.
    ///
    /// Checks run in a fixed order and the first failure is reported: record
    /// shape, presence of `offset`/`length`/`type`, their JSON types, their
    /// ranges, the type identifier, support by `tags`, then the payload the
    /// type requires.
    pub fn parse<R: TagResolver + ?Sized>(candidate: &Value, tags: &R) -> Result<Self, Rejected> {
        let record = candidate.as_object().ok_or(Rejected::NotARecord)?;

        let offset = field(record, "offset")?;
        let length = field(record, "length")?;
        let ty = field(record, "type")?;

        let offset = offset
            .as_i64()
            .ok_or(Rejected::WrongFieldType("offset"))?;
        let length = length
            .as_i64()
            .ok_or(Rejected::WrongFieldType("length"))?;
        let ty = ty.as_str().ok_or(Rejected::WrongFieldType("type"))?;

        let offset = usize::try_from(offset).map_err(|_| Rejected::OutOfRange("offset"))?;
        let length = usize::try_from(length)
            .ok()
            .filter(|length| *length > 0 && offset.checked_add(*length).is_some())
            .ok_or(Rejected::OutOfRange("length"))?;

        let entity_type: EntityType = ty
            .parse()
            .map_err(|UnknownEntityType(ty)| Rejected::UnknownType(ty))?;
        if !tags.supports(entity_type) {
            return Err(Rejected::Unsupported(entity_type));
        }

        let kind = match entity_type {
            EntityType::Bold => EntityKind::Bold,
            EntityType::Italic => EntityKind::Italic,
            EntityType::Underline => EntityKind::Underline,
            EntityType::Strikethrough => EntityKind::Strikethrough,
            EntityType::Spoiler => EntityKind::Spoiler,
            EntityType::Blockquote => EntityKind::Blockquote,
            EntityType::ExpandableBlockquote => EntityKind::ExpandableBlockquote,
            EntityType::Code => EntityKind::Code,
            EntityType::Pre => EntityKind::Pre {
                language: record.get("language").and_then(scalar_to_string),
            },
            EntityType::TextLink => EntityKind::TextLink {
                url: payload(record.get("url"), "url")?,
            },
            EntityType::TextMention => EntityKind::TextMention {
                user_id: payload(record.get("user").and_then(|user| user.get("id")), "user.id")?,
            },
            EntityType::CustomEmoji => EntityKind::CustomEmoji {
                custom_emoji_id: payload(record.get("custom_emoji_id"), "custom_emoji_id")?,
            },
        };

        Ok(Self::new(offset, length, kind))
    }
}

/// Keeps the candidates that parse, in input order. Rejections are logged and
/// otherwise ignored.
pub fn validate_entities<R: TagResolver + ?Sized>(candidates: &[Value], tags: &R) -> Vec<Entity> {
    candidates
        .iter()
        .enumerate()
        .filter_map(|(position, candidate)| match Entity::parse(candidate, tags) {
            Ok(entity) => Some(entity),
            Err(reason) => {
                tracing::trace!(
                    target: "tg_entities_html::validate",
                    position,
                    %reason,
                    "dropping entity"
                );
                None
            }
        })
        .collect()
}

// `null` is treated the same as a missing key.
fn field<'v>(record: &'v Map<String, Value>, name: &'static str) -> Result<&'v Value, Rejected> {
    record
        .get(name)
        .filter(|value| !value.is_null())
        .ok_or(Rejected::MissingField(name))
}

fn payload(value: Option<&Value>, name: &'static str) -> Result<String, Rejected> {
    value
        .and_then(scalar_to_string)
        .ok_or(Rejected::MissingPayload(name))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("1".to_owned()),
        Value::Bool(false) => Some(String::new()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
