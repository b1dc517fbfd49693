//! Text layout attributes driven by label styles.

/// Layout units per point for spacing attributes.
pub const LAYOUT_SCALE: i32 = 1024;

/// A single attribute applied to a text layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAttribute {
    /// Extra space between letters, in layout units.
    LetterSpacing(i32),
}

/// A run of label text plus its attribute list.
///
/// The attribute list is absent until the first attribute is inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextLayout {
    text: String,
    attributes: Option<Vec<TextAttribute>>,
}

impl TextLayout {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attributes: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attributes(&self) -> Option<&[TextAttribute]> {
        self.attributes.as_deref()
    }

    /// Append an attribute, creating the attribute list if needed.
    pub fn insert_attribute(&mut self, attribute: TextAttribute) {
        self.attributes.get_or_insert_with(Vec::new).push(attribute);
    }

    /// Effective letter spacing: the most recently inserted one wins.
    pub fn letter_spacing(&self) -> Option<i32> {
        self.attributes()?.iter().rev().find_map(|attr| match attr {
            TextAttribute::LetterSpacing(spacing) => Some(*spacing),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_list_created_on_demand() {
        let mut layout = TextLayout::new("Main St");
        assert_eq!(layout.attributes(), None);
        assert_eq!(layout.letter_spacing(), None);

        layout.insert_attribute(TextAttribute::LetterSpacing(2 * LAYOUT_SCALE));
        layout.insert_attribute(TextAttribute::LetterSpacing(3 * LAYOUT_SCALE));
        assert_eq!(layout.attributes().map(|a| a.len()), Some(2));
        assert_eq!(layout.letter_spacing(), Some(3 * LAYOUT_SCALE));
        assert_eq!(layout.text(), "Main St");
    }
}
