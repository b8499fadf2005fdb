use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const KEY_FORMAT: &str = "%Y-%m-%d";

/// Canonical `YYYY-MM-DD` identifier for a calendar day.
///
/// Built from the date's own year/month/day, so there is no time zone to
/// shift a late-evening date onto its neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

impl FromStr for DayKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), KEY_FORMAT).map(Self)
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero_padded() {
        let key = DayKey::new(NaiveDate::from_ymd_opt(2024, 3, 5).expect("date"));
        assert_eq!(key.to_string(), "2024-03-05");
    }

    #[test]
    fn parses_back_to_same_day() {
        let key: DayKey = "2023-12-31".parse().expect("parse");
        assert_eq!(key.date(), NaiveDate::from_ymd_opt(2023, 12, 31).expect("date"));
        assert!("2023-13-01".parse::<DayKey>().is_err());
        assert!("yesterday".parse::<DayKey>().is_err());
    }

    #[test]
    fn usable_as_json_object_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(DayKey::new(NaiveDate::from_ymd_opt(2024, 1, 9).expect("date")), 1);
        let json = serde_json::to_string(&map).expect("serialize");
        assert_eq!(json, r#"{"2024-01-09":1}"#);
        let back: std::collections::BTreeMap<DayKey, i32> =
            serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, map);
    }
}
