//! 支持的语言列表：显示名称（繁体中文）与英文名称的对照。

/// Menu label and the English name sent to the translator, in menu order.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("繁體中文", "Traditional Chinese"),
    ("簡體中文", "Simplified Chinese"),
    ("英文", "English"),
    ("日文", "Japanese"),
    ("韓文", "Korean"),
    ("越南文", "Vietnamese"),
    ("泰文", "Thai"),
    ("印尼文", "Indonesian"),
    ("義大利文", "Italian"),
    ("西班牙文", "Spanish"),
    ("葡萄牙文", "Portuguese"),
    ("德文", "German"),
    ("法文", "French"),
];

pub fn english_name(label: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, name)| *name)
}

pub fn label_for(english: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(_, name)| *name == english)
        .map(|(label, _)| *label)
}

pub fn labels() -> impl Iterator<Item = &'static str> {
    LANGUAGES.iter().map(|(label, _)| *label)
}
