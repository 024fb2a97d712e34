//! Language tag handling
//!
//! Tags are compared by their primary subtag only, so `en-US`, `en-GB`
//! and `en` all select the same language.

/// Separator between subtags in a locale tag
const SUBTAG_SEPARATOR: char = '-';

/// A language offered to users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Primary subtag (ISO 639-1)
    pub code: &'static str,
    /// Human readable label
    pub label: &'static str,
}

pub const ENGLISH: Language = Language { code: "en", label: "English" };
pub const RUSSIAN: Language = Language { code: "ru", label: "Russian" };
pub const SPANISH: Language = Language { code: "es", label: "Spanish" };
pub const FRENCH: Language = Language { code: "fr", label: "French" };
pub const GERMAN: Language = Language { code: "de", label: "German" };

/// Languages users can pick as source or target
pub const SUPPORTED: &[Language] = &[RUSSIAN, ENGLISH, SPANISH, FRENCH, GERMAN];

/// Look up a supported language by tag (any region qualifier is ignored)
#[must_use]
pub fn find(tag: &str) -> Option<Language> {
    let code = normalize(tag);
    SUPPORTED.iter().copied().find(|l| l.code == code)
}

/// Reduce a locale tag to its primary subtag
///
/// `en-US` becomes `en`; an empty tag stays empty.
#[must_use]
pub fn normalize(tag: &str) -> &str {
    tag.split(SUBTAG_SEPARATOR).next().unwrap_or_default()
}

/// Pick the translation target for a recognized utterance
///
/// When the speaker used the declared target language they are replying,
/// so the translation goes back to the declared source.
#[must_use]
pub fn resolve_target<'a>(recognized: &str, source: &'a str, target: &'a str) -> &'a str {
    if normalize(recognized) == target {
        source
    } else {
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("en-US"), "en");
        assert_eq!(normalize("ru"), "ru");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("zh-Hant-TW"), "zh");
    }

    #[test]
    fn test_resolve_target_swaps_on_reply() {
        assert_eq!(resolve_target("en", "ru", "en"), "ru");
        assert_eq!(resolve_target("en-GB", "ru", "en"), "ru");
    }

    #[test]
    fn test_resolve_target_keeps_target() {
        assert_eq!(resolve_target("ru", "ru", "en"), "en");
        assert_eq!(resolve_target("", "ru", "en"), "en");
    }

    #[test]
    fn test_find() {
        assert_eq!(find("de-AT"), Some(GERMAN));
        assert_eq!(find("ja"), None);
    }
}
