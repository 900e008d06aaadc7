use crate::entity::EntityType;
use miette::Diagnostic;
use thiserror::Error;

/// Failure surfaced by [`Renderer`](crate::Renderer) when errors are not suppressed.
#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("text is not valid UTF-8")]
    #[diagnostic(
        code(tg_entities_html::encoding),
        help("entity offsets can only be mapped onto UTF-8 text")
    )]
    Encoding(#[source] std::str::Utf8Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Process(#[from] ProcessError),
}

/// Failure while scanning the text and writing markup.
#[derive(Debug, Error, Diagnostic)]
pub enum ProcessError {
    #[error("failed to write rendered output")]
    #[diagnostic(code(tg_entities_html::process::write))]
    Write(#[from] std::fmt::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Tag(#[from] TagError),
}

/// Raised by a [`TagResolver`](crate::TagResolver) that cannot produce markup.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("cannot resolve tags for `{entity_type}` entity: {message}")]
#[diagnostic(code(tg_entities_html::tags))]
pub struct TagError {
    entity_type: EntityType,
    message: String,
}

impl TagError {
    pub fn new(entity_type: EntityType, message: impl Into<String>) -> Self {
        Self {
            entity_type,
            message: message.into(),
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }
}

/// Why a candidate entity record was dropped during validation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum Rejected {
    #[error("entity is not an object")]
    #[diagnostic(code(tg_entities_html::entity::not_a_record))]
    NotARecord,

    #[error("missing `{0}` field")]
    #[diagnostic(code(tg_entities_html::entity::missing_field))]
    MissingField(&'static str),

    #[error("`{0}` field has the wrong type")]
    #[diagnostic(code(tg_entities_html::entity::wrong_type))]
    WrongFieldType(&'static str),

    #[error("`{0}` field is out of range")]
    #[diagnostic(code(tg_entities_html::entity::out_of_range))]
    OutOfRange(&'static str),

    #[error("unknown entity type `{0}`")]
    #[diagnostic(code(tg_entities_html::entity::unknown_type))]
    UnknownType(String),

    #[error("no markup available for `{0}` entities")]
    #[diagnostic(code(tg_entities_html::entity::unsupported))]
    Unsupported(EntityType),

    #[error("missing `{0}` payload")]
    #[diagnostic(code(tg_entities_html::entity::missing_payload))]
    MissingPayload(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown entity type `{0}`")]
pub struct UnknownEntityType(pub String);
