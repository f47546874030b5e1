//! Built-in word pairs used when no generation service answers.

use crate::types::{Language, WordPair};

/// (civilian, undercover)
pub type PairLiteral = (&'static str, &'static str);

pub const FALLBACK_WORDS_EN: &[PairLiteral] = &[
    ("Coffee", "Tea"),
    ("Helicopter", "Drone"),
    ("Superman", "Batman"),
    ("Facebook", "Instagram"),
    ("Guitar", "Violin"),
    ("Apple", "Pear"),
    ("Cat", "Dog"),
    ("Train", "Bus"),
    ("Pasta", "Noodles"),
    ("Ocean", "Lake"),
];

pub const FALLBACK_WORDS_ZH: &[PairLiteral] = &[
    ("咖啡", "茶"),
    ("直升机", "无人机"),
    ("超人", "蝙蝠侠"),
    ("微信", "QQ"),
    ("吉他", "小提琴"),
    ("苹果", "梨"),
    ("猫", "狗"),
    ("火车", "公交"),
    ("意大利面", "面条"),
    ("海洋", "湖泊"),
];

/// Static catalog for a language
pub fn catalog(language: Language) -> &'static [PairLiteral] {
    match language {
        Language::En => FALLBACK_WORDS_EN,
        Language::Zh => FALLBACK_WORDS_ZH,
    }
}

/// Owned copy of a language's catalog
pub fn fallback_pairs(language: Language) -> Vec<WordPair> {
    catalog(language)
        .iter()
        .map(|(civilian, undercover)| WordPair::new(*civilian, *undercover))
        .collect()
}
