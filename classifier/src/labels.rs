//! KMNIST class labels.

use serde::{Deserialize, Serialize};

/// The ten hiragana classes of the KMNIST dataset.
///
/// Variant order is the order of the network's output logits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kana {
    #[serde(rename = "お")]
    O,
    #[serde(rename = "き")]
    Ki,
    #[serde(rename = "す")]
    Su,
    #[serde(rename = "つ")]
    Tsu,
    #[serde(rename = "な")]
    Na,
    #[serde(rename = "は")]
    Ha,
    #[serde(rename = "ま")]
    Ma,
    #[serde(rename = "や")]
    Ya,
    #[serde(rename = "れ")]
    Re,
    #[serde(rename = "を")]
    Wo,
}

/// Number of output classes.
pub const NUM_CLASSES: usize = 10;

impl Kana {
    /// All classes in logit order.
    pub const ALL: [Kana; NUM_CLASSES] = [
        Kana::O,
        Kana::Ki,
        Kana::Su,
        Kana::Tsu,
        Kana::Na,
        Kana::Ha,
        Kana::Ma,
        Kana::Ya,
        Kana::Re,
        Kana::Wo,
    ];

    /// Map a logit index back to its class.
    pub fn from_index(index: usize) -> Option<Kana> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_char(self) -> char {
        match self {
            Kana::O => 'お',
            Kana::Ki => 'き',
            Kana::Su => 'す',
            Kana::Tsu => 'つ',
            Kana::Na => 'な',
            Kana::Ha => 'は',
            Kana::Ma => 'ま',
            Kana::Ya => 'や',
            Kana::Re => 'れ',
            Kana::Wo => 'を',
        }
    }

    /// Hepburn romanization.
    pub fn romaji(self) -> &'static str {
        match self {
            Kana::O => "o",
            Kana::Ki => "ki",
            Kana::Su => "su",
            Kana::Tsu => "tsu",
            Kana::Na => "na",
            Kana::Ha => "ha",
            Kana::Ma => "ma",
            Kana::Ya => "ya",
            Kana::Re => "re",
            Kana::Wo => "wo",
        }
    }
}

impl std::fmt::Display for Kana {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        for (i, kana) in Kana::ALL.iter().enumerate() {
            assert_eq!(kana.index(), i);
            assert_eq!(Kana::from_index(i), Some(*kana));
        }
        assert_eq!(Kana::from_index(NUM_CLASSES), None);
    }

    #[test]
    fn test_label_order() {
        let labels: String = Kana::ALL.iter().map(|k| k.as_char()).collect();
        assert_eq!(labels, "おきすつなはまやれを");
    }

    #[test]
    fn test_kana_serialization() {
        let json = serde_json::to_string(&Kana::Tsu).unwrap();
        assert_eq!(json, r#""つ""#);

        let parsed: Kana = serde_json::from_str(r#""を""#).unwrap();
        assert_eq!(parsed, Kana::Wo);
    }

    #[test]
    fn test_display_and_romaji() {
        assert_eq!(Kana::Ha.to_string(), "は");
        assert_eq!(Kana::Wo.romaji(), "wo");
    }
}
