//! The weekly-grid vocabulary: slot keys, meal times, and weekdays.
//!
//! A slot key encodes meal time (midday/evening) and course
//! (starter/main/dessert). The wire tokens (`m_v`, `m`, `m_d`, `a_v`, `a`,
//! `a_d`) are the ones the original web UI exchanges, kept for parity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::candidate::CourseType;

// ---------------------------------------------------------------------------
// Meal time
// ---------------------------------------------------------------------------

/// The two meal times a day can be planned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealTime {
    Midday,
    Evening,
}

impl fmt::Display for MealTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Midday => "midday",
            Self::Evening => "evening",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Slot key
// ---------------------------------------------------------------------------

/// One cell kind of the weekly grid.
///
/// Variants are declared in the canonical allocation order (starter, main,
/// dessert within each meal, midday before evening), so the derived `Ord`
/// *is* the processing order. Allocating in this fixed order keeps scarcity
/// behavior reproducible: a scarce starter pool is drawn from before
/// main-course selection grows the dedup set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum SlotKey {
    MiddayStarter,
    MiddayMain,
    MiddayDessert,
    EveningStarter,
    EveningMain,
    EveningDessert,
}

/// Canonical slot processing order.
pub const SLOT_ORDER: [SlotKey; 6] = [
    SlotKey::MiddayStarter,
    SlotKey::MiddayMain,
    SlotKey::MiddayDessert,
    SlotKey::EveningStarter,
    SlotKey::EveningMain,
    SlotKey::EveningDessert,
];

impl SlotKey {
    /// The wire token for this slot key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MiddayStarter => "m_v",
            Self::MiddayMain => "m",
            Self::MiddayDessert => "m_d",
            Self::EveningStarter => "a_v",
            Self::EveningMain => "a",
            Self::EveningDessert => "a_d",
        }
    }

    /// The course this slot is planned with.
    pub fn course(self) -> CourseType {
        match self {
            Self::MiddayStarter | Self::EveningStarter => CourseType::Starter,
            Self::MiddayMain | Self::EveningMain => CourseType::Main,
            Self::MiddayDessert | Self::EveningDessert => CourseType::Dessert,
        }
    }

    /// The meal time this slot belongs to (drives the cook-time ceiling).
    pub fn meal_time(self) -> MealTime {
        match self {
            Self::MiddayStarter | Self::MiddayMain | Self::MiddayDessert => MealTime::Midday,
            Self::EveningStarter | Self::EveningMain | Self::EveningDessert => MealTime::Evening,
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an invalid [`SlotKey`] token.
#[derive(Debug, Clone, Error)]
#[error("unknown slot key: {0:?}")]
pub struct SlotKeyParseError(pub String);

impl FromStr for SlotKey {
    type Err = SlotKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m_v" => Ok(Self::MiddayStarter),
            "m" => Ok(Self::MiddayMain),
            "m_d" => Ok(Self::MiddayDessert),
            "a_v" => Ok(Self::EveningStarter),
            "a" => Ok(Self::EveningMain),
            "a_d" => Ok(Self::EveningDessert),
            other => Err(SlotKeyParseError(other.to_owned())),
        }
    }
}

impl TryFrom<String> for SlotKey {
    type Error = SlotKeyParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SlotKey> for String {
    fn from(key: SlotKey) -> Self {
        key.as_str().to_owned()
    }
}

// ---------------------------------------------------------------------------
// Weekday
// ---------------------------------------------------------------------------

/// Days of the planning week, Monday first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// All weekdays in plan order.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
    Weekday::Sunday,
];

impl Weekday {
    /// Zero-based offset from Monday.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The weekday at the given offset from Monday, if in range.
    pub fn from_index(index: usize) -> Option<Self> {
        WEEKDAYS.get(index).copied()
    }

    /// The German display label used in rendered plans.
    pub fn label(self) -> &'static str {
        match self {
            Self::Monday => "Montag",
            Self::Tuesday => "Dienstag",
            Self::Wednesday => "Mittwoch",
            Self::Thursday => "Donnerstag",
            Self::Friday => "Freitag",
            Self::Saturday => "Samstag",
            Self::Sunday => "Sonntag",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an invalid [`Weekday`] token.
#[derive(Debug, Clone, Error)]
#[error("unknown weekday: {0:?}")]
pub struct WeekdayParseError(pub String);

impl FromStr for Weekday {
    type Err = WeekdayParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mon" | "monday" => Ok(Self::Monday),
            "tue" | "tuesday" => Ok(Self::Tuesday),
            "wed" | "wednesday" => Ok(Self::Wednesday),
            "thu" | "thursday" => Ok(Self::Thursday),
            "fri" | "friday" => Ok(Self::Friday),
            "sat" | "saturday" => Ok(Self::Saturday),
            "sun" | "sunday" => Ok(Self::Sunday),
            other => Err(WeekdayParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_order_matches_derived_ord() {
        let mut sorted = SLOT_ORDER;
        sorted.sort();
        assert_eq!(sorted, SLOT_ORDER);
    }

    #[test]
    fn slot_key_token_roundtrip() {
        for key in SLOT_ORDER {
            assert_eq!(key.as_str().parse::<SlotKey>().unwrap(), key);
        }
    }

    #[test]
    fn invalid_slot_key_is_rejected() {
        assert!("breakfast".parse::<SlotKey>().is_err());
    }

    #[test]
    fn slot_course_and_meal_time() {
        assert_eq!(SlotKey::MiddayStarter.course(), CourseType::Starter);
        assert_eq!(SlotKey::EveningMain.course(), CourseType::Main);
        assert_eq!(SlotKey::MiddayDessert.meal_time(), MealTime::Midday);
        assert_eq!(SlotKey::EveningDessert.meal_time(), MealTime::Evening);
    }

    #[test]
    fn weekday_index_roundtrip() {
        for (i, day) in WEEKDAYS.iter().enumerate() {
            assert_eq!(day.index(), i);
            assert_eq!(Weekday::from_index(i), Some(*day));
        }
        assert_eq!(Weekday::from_index(7), None);
    }

    #[test]
    fn weekday_parses_short_and_long_tokens() {
        assert_eq!("wed".parse::<Weekday>().unwrap(), Weekday::Wednesday);
        assert_eq!("Sunday".parse::<Weekday>().unwrap(), Weekday::Sunday);
        assert!("someday".parse::<Weekday>().is_err());
    }

    #[test]
    fn weekday_labels_are_german() {
        assert_eq!(Weekday::Monday.label(), "Montag");
        assert_eq!(Weekday::Sunday.to_string(), "Sonntag");
    }
}
