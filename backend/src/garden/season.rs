use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::models::garden::SeasonalTheme;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "garden_season", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Autumn];

    /// Dec–Feb winter, Mar–May spring, Jun–Aug summer, Sep–Nov autumn.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Autumn,
            _ => Self::Winter,
        }
    }

    pub fn from_date(at: DateTime<Utc>) -> Self {
        Self::from_month(at.month())
    }

    pub fn bit(&self) -> i16 {
        match self {
            Self::Winter => 1 << 0,
            Self::Spring => 1 << 1,
            Self::Summer => 1 << 2,
            Self::Autumn => 1 << 3,
        }
    }

    pub fn theme(&self) -> SeasonalTheme {
        let (colors, background): (&[&'static str], &'static str) = match self {
            Self::Winter => (&["#e3f2fd", "#bbdefb", "#90caf9", "#ffffff"], "#eef5fb"),
            Self::Spring => (&["#f8bbd0", "#c5e1a5", "#fff59d", "#b2ebf2"], "#f1f8e9"),
            Self::Summer => (&["#ffd54f", "#ff8a65", "#81c784", "#4fc3f7"], "#fffde7"),
            Self::Autumn => (&["#ff7043", "#ffb74d", "#a1887f", "#d4e157"], "#fbe9e7"),
        };
        SeasonalTheme {
            colors: colors.to_vec(),
            background,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_month_buckets() {
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(2), Season::Winter);
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(5), Season::Spring);
        assert_eq!(Season::from_month(6), Season::Summer);
        assert_eq!(Season::from_month(8), Season::Summer);
        assert_eq!(Season::from_month(9), Season::Autumn);
        assert_eq!(Season::from_month(11), Season::Autumn);
    }

    #[test]
    fn test_from_date() {
        let oct = Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap();
        assert_eq!(Season::from_date(oct), Season::Autumn);
    }

    #[test]
    fn test_bits_are_distinct() {
        let all = Season::ALL.iter().fold(0i16, |acc, s| acc | s.bit());
        assert_eq!(all, 0b1111);
    }

    #[test]
    fn test_theme_serializes_colors_and_background() {
        let json = serde_json::to_value(Season::Summer.theme()).unwrap();
        assert!(json["colors"].as_array().is_some_and(|c| !c.is_empty()));
        assert!(json["background"].as_str().is_some());
    }
}
