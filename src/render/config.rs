/// Options for plain-text rendering.
///
/// # Examples
///
/// ```rust
/// use hwptext::render::TextOptions;
///
/// let options = TextOptions::new()
///     .with_image_placeholder("<picture>")
///     .with_blank_line_after_table(false);
/// assert_eq!(options.image_placeholder, "<picture>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOptions {
    /// Line written for each embedded drawing object
    pub image_placeholder: String,
    /// Whether cell text is whitespace-trimmed before layout
    pub trim_cell_text: bool,
    /// Whether an empty line follows every rendered table
    pub blank_line_after_table: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            image_placeholder: "[IMAGE]".to_string(),
            trim_cell_text: true,
            blank_line_after_table: true,
        }
    }
}

impl TextOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text written in place of drawing objects.
    #[inline]
    pub fn with_image_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.image_placeholder = placeholder.into();
        self
    }

    /// Set whether leading and trailing whitespace is removed from cell text.
    #[inline]
    pub fn with_trim_cell_text(mut self, trim: bool) -> Self {
        self.trim_cell_text = trim;
        self
    }

    #[inline]
    pub fn with_blank_line_after_table(mut self, blank: bool) -> Self {
        self.blank_line_after_table = blank;
        self
    }
}
