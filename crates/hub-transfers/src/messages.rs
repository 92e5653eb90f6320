//! User-facing message catalog.
//!
//! Transport failure reasons are catalog keys; [`localize`] renders one for
//! display, falling back to the raw reason when the key is unknown.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Display language for user-facing messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "zh" => Ok(Self::Zh),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

const EN: &[(&str, &str)] = &[
    ("errorSimulatedFailure", "Simulated network error. Please try again."),
    ("errorTransferPaused", "Transfer paused."),
    ("statusPending", "Pending"),
    ("statusInProgress", "In Progress"),
    ("statusCompleted", "Completed"),
    ("statusFailed", "Failed"),
    ("statusPaused", "Paused"),
    ("transferQueue", "Transfer Queue"),
];

const ZH: &[(&str, &str)] = &[
    ("errorSimulatedFailure", "模拟网络错误，请重试。"),
    ("errorTransferPaused", "传输已暂停。"),
    ("statusPending", "等待中"),
    ("statusInProgress", "传输中"),
    ("statusCompleted", "已完成"),
    ("statusFailed", "失败"),
    ("statusPaused", "已暂停"),
    ("transferQueue", "传输队列"),
];

/// Looks up `key` in the catalog for `lang`.
pub fn translate(lang: Language, key: &str) -> Option<&'static str> {
    let table = match lang {
        Language::En => EN,
        Language::Zh => ZH,
    };
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Translation of `key`, or `key` itself when the catalog has no entry.
pub fn localize(lang: Language, key: &str) -> String {
    translate(lang, key)
        .map(str::to_string)
        .unwrap_or_else(|| key.to_string())
}
