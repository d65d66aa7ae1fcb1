//! Rich-text markup helpers for the clinical log.
//!
//! The document is HTML-flavoured rich text so it pastes into external
//! record systems with emphasis intact. Inline styles only; no classes,
//! no external stylesheet.

/// Alert accent used for allergies, contraindications and complications.
pub(crate) const ALERT_RED: &str = "#b91c1c";
/// Confirmation accent for the senior-aware badge.
pub(crate) const CONFIRM_GREEN: &str = "#166534";
/// Heading accent for the summary label.
pub(crate) const HEADER_SLATE: &str = "#1e293b";

pub(crate) const BR: &str = "<br>";

pub(crate) fn bold(text: &str) -> String {
    format!("<span style=\"font-weight:bold\">{}</span>", text)
}

pub(crate) fn bold_color(color: &str, text: &str) -> String {
    format!(
        "<span style=\"font-weight:bold; color:{};\">{}</span>",
        color, text
    )
}

pub(crate) fn italic(text: &str) -> String {
    format!("<span style=\"font-style:italic\">{}</span>", text)
}

pub(crate) fn underline(text: &str) -> String {
    format!("<span style=\"text-decoration:underline\">{}</span>", text)
}

/// The oversized summary label at the very top of the document.
pub(crate) fn summary_label(text: &str) -> String {
    format!(
        "<span style=\"font-weight:bold; font-size:1.1em; color:{};\">{}</span>",
        HEADER_SLATE, text
    )
}

/// A non-empty value, or the placeholder.
pub(crate) fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_fragments() {
        assert_eq!(
            bold("ASA"),
            "<span style=\"font-weight:bold\">ASA</span>"
        );
        assert_eq!(
            italic("note"),
            "<span style=\"font-style:italic\">note</span>"
        );
        assert!(bold_color(ALERT_RED, "x").contains("#b91c1c"));
    }

    #[test]
    fn test_or_placeholder() {
        assert_eq!(or_placeholder("", "--"), "--");
        assert_eq!(or_placeholder("70", "--"), "70");
    }
}
