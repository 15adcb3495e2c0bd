use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Styling metadata attached to a text run.
///
/// The schema belongs to the embedding game server; this crate only carries the
/// key/value pairs through to the wire untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style(Map<String, Value>);

impl Style {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Set a style attribute, e.g. `("color", "gold")`
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One node of a structured message: a text run with optional style and
/// ordered child components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextComponent {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<TextComponent>,
}

impl TextComponent {
    /// A single unstyled text run
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
            extra: Vec::new(),
        }
    }

    /// A single styled text run. An empty style is stored as no style so the
    /// encoding matches [`TextComponent::plain`].
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style: (!style.is_empty()).then_some(style),
            extra: Vec::new(),
        }
    }

    /// Append a child component
    pub fn append(mut self, child: TextComponent) -> Self {
        self.extra.push(child);
        self
    }

    /// Copy of this tree with every empty style replaced by no style.
    pub fn normalized(&self) -> TextComponent {
        TextComponent {
            text: self.text.clone(),
            style: self.style.clone().filter(|style| !style.is_empty()),
            extra: self.extra.iter().map(TextComponent::normalized).collect(),
        }
    }

    /// Concatenate the text of this component and its children, depth first.
    pub fn to_plain_string(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.extra {
            child.collect_text(out);
        }
    }
}

/// A message addressed to an entity
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Plain text, shorthand for one unstyled segment
    Text(String),
    /// A tree of formatted segments
    Structured(TextComponent),
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Message::Text(text.into())
    }

    /// The normalized component tree this message is delivered as
    pub fn to_component(&self) -> TextComponent {
        match self {
            Message::Text(text) => TextComponent::plain(text.clone()),
            Message::Structured(component) => component.normalized(),
        }
    }

    /// Encode the message into its wire payload.
    ///
    /// Both variants go through the same normalized component encoding, so
    /// equal content produces equal bytes.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.to_component())
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

impl From<TextComponent> for Message {
    fn from(component: TextComponent) -> Self {
        Message::Structured(component)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(text) => f.write_str(text),
            Message::Structured(component) => f.write_str(&component.to_plain_string()),
        }
    }
}
