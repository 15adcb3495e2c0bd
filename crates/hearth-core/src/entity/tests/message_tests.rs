use crate::entity::{Message, Style, TextComponent};

#[test]
fn test_plain_text_encodes_as_single_unstyled_segment() {
    let text = Message::from("hello").encode().unwrap();
    let structured = Message::Structured(TextComponent::plain("hello")).encode().unwrap();

    assert_eq!(text, structured);
    assert_eq!(text, br#"{"text":"hello"}"#.to_vec());
}

#[test]
fn test_empty_style_is_dropped() {
    let styled = TextComponent::styled("hello", Style::new());
    assert_eq!(styled, TextComponent::plain("hello"));
}

#[test]
fn test_empty_styles_are_normalized_before_encoding() {
    let explicit = TextComponent {
        text: "hello".to_string(),
        style: Some(Style::new()),
        extra: vec![TextComponent {
            text: "!".to_string(),
            style: Some(Style::new()),
            extra: Vec::new(),
        }],
    };
    let built = TextComponent::plain("hello").append(TextComponent::plain("!"));
    assert_eq!(
        Message::from(explicit).encode().unwrap(),
        Message::from(built).encode().unwrap()
    );

    let decoded: TextComponent = serde_json::from_str(r#"{"text":"hello","style":{}}"#).unwrap();
    assert_eq!(
        Message::from(decoded).encode().unwrap(),
        Message::from("hello").encode().unwrap()
    );
}

#[test]
fn test_styled_component_keeps_style_on_wire() {
    let component = TextComponent::styled("Welcome", Style::new().with("color", "gold"))
        .append(TextComponent::plain(", Alex"));
    let bytes = Message::from(component).encode().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(value["text"], "Welcome");
    assert_eq!(value["style"]["color"], "gold");
    assert_eq!(value["extra"][0]["text"], ", Alex");
    assert!(value["extra"][0].get("style").is_none());
}

#[test]
fn test_to_plain_string_walks_depth_first() {
    let component = TextComponent::plain("a")
        .append(TextComponent::plain("b").append(TextComponent::plain("c")))
        .append(TextComponent::plain("d"));

    assert_eq!(component.to_plain_string(), "abcd");
    assert_eq!(Message::from(component).to_string(), "abcd");
}

#[test]
fn test_to_component_normalizes_text() {
    assert_eq!(Message::text("x").to_component(), TextComponent::plain("x"));
}
