//! Unicode character properties consulted while printing.

/// Coarse Unicode general category of a scalar value.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GeneralCategory {
    /// `Lu`.
    UppercaseLetter,
    /// `Ll`.
    LowercaseLetter,
    /// Any other letter.
    OtherLetter,
    /// Any number.
    Number,
    /// `Zs`.
    SpaceSeparator,
    /// `Zl`.
    LineSeparator,
    /// `Zp`.
    ParagraphSeparator,
    /// `Cc`.
    Control,
    /// `Cf`.
    Format,
    /// Punctuation, symbols, marks and unassigned scalars.
    Other,
}

impl GeneralCategory {
    /// Whether scalars of this category must be escaped inside quoted text.
    #[must_use]
    pub const fn is_invisible(self) -> bool {
        matches!(
            self,
            Self::Control | Self::Format | Self::LineSeparator | Self::ParagraphSeparator
        )
    }
}

/// Source of Unicode properties. Implement this to plug in a full Unicode database.
pub trait UnicodeProperties {
    /// Returns the general category of `c`.
    fn general_category(&self, c: char) -> GeneralCategory;

    /// Returns whether `c` has the `Alphabetic` property.
    fn is_alphabetic(&self, c: char) -> bool;

    /// Returns the lowercase mapping of `c`, which may span several scalars.
    fn lowercase_mapping(&self, c: char) -> String;
}

/// [`UnicodeProperties`] backed by the tables of the standard library.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdUnicodeProperties;

const FORMAT_RANGES: [(char, char); 12] = [
    ('\u{ad}', '\u{ad}'),
    ('\u{600}', '\u{605}'),
    ('\u{61c}', '\u{61c}'),
    ('\u{6dd}', '\u{6dd}'),
    ('\u{70f}', '\u{70f}'),
    ('\u{180e}', '\u{180e}'),
    ('\u{200b}', '\u{200f}'),
    ('\u{202a}', '\u{202e}'),
    ('\u{2060}', '\u{2064}'),
    ('\u{2066}', '\u{206f}'),
    ('\u{feff}', '\u{feff}'),
    ('\u{fff9}', '\u{fffb}'),
];

impl UnicodeProperties for StdUnicodeProperties {
    fn general_category(&self, c: char) -> GeneralCategory {
        match c {
            '\u{2028}' => GeneralCategory::LineSeparator,
            '\u{2029}' => GeneralCategory::ParagraphSeparator,
            _ if c.is_control() => GeneralCategory::Control,
            _ if FORMAT_RANGES.iter().any(|&(first, last)| (first..=last).contains(&c)) => GeneralCategory::Format,
            _ if c.is_whitespace() => GeneralCategory::SpaceSeparator,
            _ if c.is_uppercase() => GeneralCategory::UppercaseLetter,
            _ if c.is_lowercase() => GeneralCategory::LowercaseLetter,
            _ if c.is_alphabetic() => GeneralCategory::OtherLetter,
            _ if c.is_numeric() => GeneralCategory::Number,
            _ => GeneralCategory::Other,
        }
    }

    fn is_alphabetic(&self, c: char) -> bool {
        c.is_alphabetic()
    }

    fn lowercase_mapping(&self, c: char) -> String {
        c.to_lowercase().collect()
    }
}
