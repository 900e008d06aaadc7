// End-to-end rendering of Bot API entity lists.

use serde_json::{Value, json};
use std::borrow::Cow;
use tg_entities_html::{
    Entity, EntityKind, EntityType, ProcessError, RenderError, Renderer, TagError, TagPair,
    TagResolver, TagTable,
};

fn render(text: &str, entities: &[Value]) -> String {
    Renderer::new().render(text, entities).unwrap().into_owned()
}

fn render_fixed(text: &str, entities: &[Value]) -> String {
    Renderer::new()
        .fix_inaccuracies(true)
        .render(text, entities)
        .unwrap()
        .into_owned()
}

/// Resolver that fails for every entity, standing in for a faulty dependency.
struct BrokenTags;

impl TagResolver for BrokenTags {
    fn supports(&self, _entity_type: EntityType) -> bool {
        true
    }

    fn resolve(&self, entity: &Entity) -> Result<TagPair, TagError> {
        Err(TagError::new(entity.entity_type(), "markup unavailable"))
    }
}

#[test]
fn test_readme_example() {
    let entities = vec![
        json!({"type": "bold", "offset": 21, "length": 4}),
        json!({"type": "italic", "offset": 30, "length": 6}),
    ];
    assert_eq!(
        render("😎 Text message with bold and italic", &entities),
        "😎 Text message with <b>bold</b> and <i>italic</i>"
    );
}

#[test]
fn test_empty_inputs_are_identity() {
    assert_eq!(render("ok", &[]), "ok");
    assert_eq!(render("", &[]), "");
    assert_eq!(render("test", &[]), "test");
    assert_eq!(
        render("", &[json!({"type": "bold", "offset": 0, "length": 4})]),
        ""
    );
}

#[test]
fn test_invalid_entities_are_skipped() {
    let entities = vec![
        json!("not array"),
        json!({"offset": 0, "length": 1, "type": "bold"}),
        json!({"offset": 1, "length": 1}),
        json!({"offset": 2, "length": 1, "type": 1}),
        json!({"offset": 3, "length": 1, "type": "invalid"}),
        json!({"offset": 4, "length": 1, "type": "text_link"}),
        json!({"offset": 5, "length": 1, "type": "text_mention"}),
        json!({"offset": 6, "length": 1, "type": "text_mention", "user": []}),
        json!({"offset": 7, "length": 1, "type": "custom_emoji"}),
    ];
    assert_eq!(render("01234567", &entities), "<b>0</b>1234567");
}

#[test]
fn test_no_valid_entities_returns_text() {
    let entities = vec![json!("not array"), json!({"offset": 1, "length": 1})];
    assert_eq!(render("0", &entities), "0");
}

#[test]
fn test_every_entity_type() {
    let entities = vec![
        json!({"offset": 0, "length": 1, "type": "bold"}),
        json!({"offset": 1, "length": 1, "type": "italic"}),
        json!({"offset": 2, "length": 1, "type": "underline"}),
        json!({"offset": 3, "length": 1, "type": "strikethrough"}),
        json!({"offset": 4, "length": 1, "type": "spoiler"}),
        json!({"offset": 5, "length": 1, "type": "blockquote"}),
        json!({"offset": 6, "length": 1, "type": "expandable_blockquote"}),
        json!({"offset": 7, "length": 1, "type": "code"}),
        json!({"offset": 8, "length": 1, "type": "pre"}),
        json!({"offset": 9, "length": 1, "type": "pre", "language": "php"}),
        json!({"offset": 10, "length": 1, "type": "text_link", "url": "https://example.com"}),
        json!({"offset": 11, "length": 1, "type": "text_mention", "user": {"id": 1}}),
        json!({"offset": 12, "length": 1, "type": "custom_emoji", "custom_emoji_id": "2"}),
    ];
    let expected = [
        "<b>0</b>",
        "<i>1</i>",
        "<u>2</u>",
        "<s>3</s>",
        "<tg-spoiler>4</tg-spoiler>",
        "<blockquote>5</blockquote>",
        "<blockquote class=\"expandable\">6</blockquote>",
        "<code>7</code>",
        "<pre>8</pre>",
        "<pre><code class=\"language-php\">9</code></pre>",
        "<a href=\"https://example.com\">a</a>",
        "<a href=\"tg://user?id=1\">b</a>",
        "<tg-emoji emoji-id=\"2\">c</tg-emoji>",
    ]
    .concat();
    assert_eq!(render("0123456789abc", &entities), expected);
}

#[test]
fn test_surrogate_pair_inaccuracies() {
    let at_zero = vec![json!({"type": "bold", "offset": 0, "length": 1})];
    let at_one = vec![json!({"type": "bold", "offset": 1, "length": 1})];

    assert_eq!(render("😎emoji", &at_zero), "<b>😎emoji</b>");
    assert_eq!(render("😎emoji", &at_one), "😎</b>emoji");
    assert_eq!(render_fixed("😎emoji", &at_zero), "<b>😎</b>emoji");
    assert_eq!(render_fixed("😎emoji", &at_one), "<b>😎</b>emoji");
}

#[test]
fn test_processing_failure_is_suppressed_by_default() {
    let entities = vec![json!({"type": "bold", "offset": 0, "length": 4})];
    let html = Renderer::with_tags(BrokenTags).render("test", &entities).unwrap();
    assert!(matches!(html, Cow::Borrowed("test")));
}

#[test]
fn test_processing_failure_propagates_when_asked() {
    let entities = vec![json!({"type": "bold", "offset": 0, "length": 4})];
    let err = Renderer::with_tags(BrokenTags)
        .throw_errors(true)
        .render("test", &entities)
        .unwrap_err();
    match err {
        RenderError::Process(ProcessError::Tag(tag)) => {
            assert_eq!(tag.entity_type(), EntityType::Bold)
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_encoding_failure_propagates_when_asked() {
    let entities = vec![json!({"type": "bold", "offset": 0, "length": 4})];
    let err = Renderer::new()
        .throw_errors(true)
        .render_bytes(b"te\xffst", &entities)
        .unwrap_err();
    assert!(matches!(err, RenderError::Encoding(_)));
}

#[test]
fn test_encoding_failure_is_suppressed_by_default() {
    let entities = vec![json!({"type": "bold", "offset": 0, "length": 4})];
    let text: &[u8] = b"te\xffst";
    let out = Renderer::new().render_bytes(text, &entities).unwrap();
    assert_eq!(out.as_ref(), text);
}

#[test]
fn test_render_bytes_matches_render() {
    let entities = vec![json!({"type": "code", "offset": 2, "length": 3})];
    let out = Renderer::new()
        .render_bytes("a 😎b & c".as_bytes(), &entities)
        .unwrap();
    assert_eq!(out.as_ref(), "a <code>😎b</code> &amp; c".as_bytes());
}

#[test]
fn test_custom_tag_table() {
    let tags = TagTable::new().with(EntityType::Bold, "<strong>", "</strong>");
    let renderer = Renderer::with_tags(tags);
    assert_eq!(
        renderer
            .render("test", &[json!({"type": "bold", "offset": 0, "length": 4})])
            .unwrap(),
        "<strong>test</strong>"
    );
    assert_eq!(
        renderer
            .render("test", &[json!({"type": "italic", "offset": 0, "length": 4})])
            .unwrap(),
        "test"
    );
}

#[test]
fn test_escaping() {
    let text = "if a < b && b > c { \"ok\" }";
    assert_eq!(
        render(text, &[json!({"type": "bogus", "offset": 0, "length": 1})]),
        text
    );
    insta::assert_snapshot!(
        render(text, &[json!({"type": "code", "offset": 3, "length": 5})]),
        @r#"if <code>a &lt; b</code> &amp;&amp; b &gt; c { "ok" }"#
    );
}

#[test]
fn test_trailing_text_is_escaped() {
    let entities = vec![json!({"type": "bold", "offset": 0, "length": 1})];
    assert_eq!(render("a<&>", &entities), "<b>a</b>&lt;&amp;&gt;");
}

#[test]
fn test_nested_message() {
    // "Hello, world! Visit docs"
    let entities = vec![
        json!({"type": "bold", "offset": 0, "length": 13}),
        json!({"type": "italic", "offset": 7, "length": 5}),
        json!({"type": "text_link", "offset": 20, "length": 4, "url": "https://core.telegram.org/bots/api"}),
    ];
    insta::assert_snapshot!(
        render("Hello, world! Visit docs", &entities),
        @r#"<b>Hello, <i>world</i>!</b> Visit <a href="https://core.telegram.org/bots/api">docs</a>"#
    );
}

#[test]
fn test_duplicate_entities_render_twice() {
    let entities = vec![
        json!({"type": "bold", "offset": 0, "length": 2}),
        json!({"type": "bold", "offset": 0, "length": 2}),
    ];
    assert_eq!(render("hey", &entities), "<b><b>he</b></b>y");
}

#[test]
fn test_typed_entities() {
    let entities = vec![
        Entity::new(
            0,
            3,
            EntityKind::Pre {
                language: Some("rust".into()),
            },
        ),
        Entity::new(3, 0, EntityKind::Bold),
    ];
    assert_eq!(
        Renderer::new().render_entities("let", &entities).unwrap(),
        "<pre><code class=\"language-rust\">let</code></pre>"
    );
}

/// Checks that every end tag closes the most recently opened tag.
fn assert_balanced(html: &str) {
    let mut stack = Vec::new();
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        let end = start + rest[start..].find('>').expect("unterminated tag");
        let tag = &rest[start + 1..end];
        if let Some(name) = tag.strip_prefix('/') {
            assert_eq!(stack.pop(), Some(name.to_owned()), "in {html}");
        } else {
            stack.push(tag.to_owned());
        }
        rest = &rest[end + 1..];
    }
    assert!(stack.is_empty(), "unclosed tags in {html}");
}

#[test]
fn test_tags_are_balanced_for_overlapping_and_overrunning_entities() {
    let text = "The quick brown fox";
    let types = ["bold", "italic", "underline"];
    for offset in 0..text.len() {
        for length in [1, 3, 7, 40] {
            for (i, ty) in types.iter().enumerate() {
                let entities = vec![
                    json!({"type": ty, "offset": offset, "length": length}),
                    json!({"type": types[(i + 1) % 3], "offset": (offset * 7) % text.len(), "length": length + 2}),
                    json!({"type": types[(i + 2) % 3], "offset": 0, "length": (offset + length) % 23 + 1}),
                ];
                for fix in [false, true] {
                    let html = Renderer::new()
                        .fix_inaccuracies(fix)
                        .render(text, &entities)
                        .unwrap();
                    assert_balanced(&html);
                }
            }
        }
    }
}

#[test]
fn test_tags_are_balanced_around_surrogate_pairs_when_fixed() {
    // 13 UTF-16 code units; every emoji takes two.
    let text = "a😎b😎😎cd😎e";
    let units = 13;
    let types = ["bold", "italic", "underline"];
    for offset in 0..units {
        for length in 1..=units + 1 - offset {
            for (i, ty) in types.iter().enumerate() {
                let entities = vec![
                    json!({"type": ty, "offset": offset, "length": length}),
                    json!({"type": types[(i + 1) % 3], "offset": (offset * 5) % units, "length": length % 4 + 1}),
                    json!({"type": types[(i + 2) % 3], "offset": 1, "length": (offset + length) % units + 1}),
                ];
                let html = render_fixed(text, &entities);
                assert_balanced(&html);
            }
        }
    }
}
