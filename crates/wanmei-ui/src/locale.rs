//! User-facing strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::download::Os;
use crate::error::UiError;

/// Language of the page's generated text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "en")]
    En,
}

impl Locale {
    /// Label written into the highlighted download button.
    #[must_use]
    pub fn recommended_download(self, os: Os) -> String {
        match self {
            Self::ZhCn => format!("推荐下载 ({})", os.display_name()),
            Self::En => format!("Recommended download ({})", os.display_name()),
        }
    }

    /// Toast shown when a download button is clicked in the toast flow.
    #[must_use]
    pub fn preparing_download(self, os: Os) -> String {
        match self {
            Self::ZhCn => format!("正在准备 {} 版本下载...", os.display_name()),
            Self::En => format!("Preparing download for {}...", os.display_name()),
        }
    }

    /// Toast shown after a successful copy.
    #[must_use]
    pub fn copied(self) -> &'static str {
        match self {
            Self::ZhCn => "已复制到剪贴板",
            Self::En => "Copied to clipboard",
        }
    }
}

impl FromStr for Locale {
    type Err = UiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zh-cn" | "zh" | "zh_cn" => Ok(Self::ZhCn),
            "en" | "en-us" | "en_us" => Ok(Self::En),
            _ => Err(UiError::UnknownLocale { name: s.to_owned() }),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ZhCn => "zh-CN",
            Self::En => "en",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_strings() {
        assert_eq!(
            Locale::En.recommended_download(Os::Windows),
            "Recommended download (Windows)"
        );
        assert_eq!(
            Locale::En.preparing_download(Os::Mac),
            "Preparing download for macOS..."
        );
    }

    #[test]
    fn chinese_labels_name_the_detected_os() {
        assert_eq!(Locale::ZhCn.recommended_download(Os::Linux), "推荐下载 (Linux)");
    }

    #[test]
    fn parses_common_spellings() {
        assert_eq!("zh-CN".parse::<Locale>().ok(), Some(Locale::ZhCn));
        assert_eq!("EN".parse::<Locale>().ok(), Some(Locale::En));
        assert!("fr".parse::<Locale>().is_err());
    }
}
