use std::fmt;

/// A free-form annotation tooling can attach alongside serialized units.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SerializationLabel {
    comment: String,
}

impl SerializationLabel {
    pub fn new(comment: impl Into<String>) -> SerializationLabel {
        SerializationLabel { comment: comment.into() }
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }
}

impl fmt::Display for SerializationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.comment)
    }
}
