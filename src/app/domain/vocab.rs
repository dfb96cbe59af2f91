use serde::{Deserialize, Serialize};

use super::settings::Script;

/// One vocabulary item as stored in the `vocabulary` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabCard {
    pub id: u64,
    pub hanzi: String,
    /// Pinyin or Jyutping, depending on `script`.
    pub romanization: String,
    pub english: String,
    #[serde(default)]
    pub script: Script,
}

impl VocabCard {
    pub fn new(id: u64, hanzi: &str, romanization: &str, english: &str, script: Script) -> Self {
        Self {
            id,
            hanzi: hanzi.to_string(),
            romanization: romanization.to_string(),
            english: english.to_string(),
            script,
        }
    }
}

/// Characters with their phonetic annotation, shown only when annotation
/// is visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedText<'a> {
    pub text: &'a str,
    pub annotation: &'a str,
}

impl<'a> AnnotatedText<'a> {
    pub fn of(card: &'a VocabCard) -> Self {
        Self {
            text: &card.hanzi,
            annotation: &card.romanization,
        }
    }

    pub fn render(&self, annotation_visible: bool) -> String {
        if annotation_visible && !self.annotation.is_empty() {
            format!("{}\n{}", self.text, self.annotation)
        } else {
            self.text.to_string()
        }
    }
}

/// Built-in deck used when the remote store cannot be reached.
pub fn sample_deck(script: Script) -> Vec<VocabCard> {
    let rows: &[(&str, &str, &str, &str)] = &[
        ("你好", "nǐ hǎo", "nei5 hou2", "hello"),
        ("多謝", "duō xiè", "do1 ze6", "thank you"),
        ("水", "shuǐ", "seoi2", "water"),
        ("食飯", "shí fàn", "sik6 faan6", "to eat a meal"),
        ("朋友", "péng you", "pang4 jau5", "friend"),
        ("學生", "xué sheng", "hok6 saang1", "student"),
        ("今日", "jīn rì", "gam1 jat6", "today"),
        ("屋企", "wū qǐ", "uk1 kei2", "home"),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (hanzi, pinyin, jyutping, english))| {
            let romanization = match script {
                Script::Mandarin => pinyin,
                Script::Cantonese => jyutping,
            };
            VocabCard::new(i as u64 + 1, hanzi, romanization, english, script)
        })
        .collect()
}
