//! Display labels for subtitle language codes.

/// Language-code prefix to display-name table for subtitle tracks.
const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("pt", "Portuguese"),
    ("it", "Italian"),
    ("de", "German"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("zh", "Chinese"),
    ("ko", "Korean"),
    ("ar", "Arabic"),
    ("tr", "Turkish"),
    ("pl", "Polish"),
    ("nl", "Dutch"),
    ("el", "Greek"),
    ("hi", "Hindi"),
    ("th", "Thai"),
    ("vi", "Vietnamese"),
    ("id", "Indonesian"),
    ("fa", "Persian"),
    ("he", "Hebrew"),
    ("sq", "Albanian"),
    ("ro", "Romanian"),
    ("sr", "Serbian"),
    ("uk", "Ukrainian"),
    ("hr", "Croatian"),
    ("cs", "Czech"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("bg", "Bulgarian"),
    ("hu", "Hungarian"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("mk", "Macedonian"),
];

/// Returns the display label for a subtitle language code.
///
/// Codes are prefix-matched so regional variants resolve to the base language
/// (`es-LA` -> "Spanish"). Unknown codes fall back to the code itself.
pub fn lang_label(code: &str) -> String {
    for (prefix, label) in LANGUAGES {
        if code.starts_with(prefix) {
            return (*label).to_string();
        }
    }
    code.to_string()
}
