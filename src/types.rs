use chrono::{DateTime, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub type TrainerId = i64;

const SLOT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Start of a bookable time window, in local wall-clock time without offset.
///
/// Serialized as `YYYY-MM-DDTHH:mm:ss`, the format the booking UI and the
/// fitness backend exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slot(NaiveDateTime);

impl Slot {
    pub fn new(datetime: NaiveDateTime) -> Self {
        Self(datetime.with_nanosecond(0).unwrap_or(datetime))
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    pub fn is_after(&self, now: NaiveDateTime) -> bool {
        self.0 > now
    }

    /// Accepts the strict slot format as well as fractional seconds and RFC 3339
    /// timestamps with an offset, keeping the wall-clock part.
    pub fn parse_lenient(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(slot) = value.parse::<Slot>() {
            return Some(slot);
        }
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(Self::new(datetime));
        }
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|datetime| Self::new(datetime.naive_local()))
    }
}

impl FromStr for Slot {
    type Err = chrono::ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        NaiveDateTime::parse_from_str(value, SLOT_FORMAT).map(Self::new)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(SLOT_FORMAT))
    }
}

impl TryFrom<String> for Slot {
    type Error = chrono::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Slot> for String {
    fn from(slot: Slot) -> Self {
        slot.to_string()
    }
}

/// Slots a user tentatively picked for one trainer, in the order they were picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerSelection {
    pub trainer_id: TrainerId,
    pub time_slots: Vec<Slot>,
}

impl TrainerSelection {
    pub fn new(trainer_id: TrainerId, slot: Slot) -> Self {
        Self {
            trainer_id,
            time_slots: vec![slot],
        }
    }

    pub fn contains(&self, slot: &Slot) -> bool {
        self.time_slots.contains(slot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    Added,
    AlreadySelected,
    /// The slot is not in the future. Nothing changed.
    Rejected,
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn slot_uses_local_iso_format() {
        let slot: Slot = "2099-06-01T09:00:00".parse().unwrap();
        assert_eq!(
            slot.datetime(),
            NaiveDate::from_ymd_opt(2099, 6, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        );
        assert_eq!(slot.to_string(), "2099-06-01T09:00:00");
        assert_eq!(
            serde_json::to_string(&slot).unwrap(),
            "\"2099-06-01T09:00:00\""
        );
    }

    #[test_case::test_case("2099-06-01 09:00:00")]
    #[test_case::test_case("2099-06-01T09:00")]
    #[test_case::test_case("tomorrow")]
    #[test_case::test_case("")]
    fn strict_parse_rejects(value: &str) {
        value.parse::<Slot>().unwrap_err();
        serde_json::from_str::<Slot>(&format!("\"{value}\"")).unwrap_err();
    }

    #[test_case::test_case("2099-06-01T09:00:00", "2099-06-01T09:00:00")]
    #[test_case::test_case("2099-06-01T09:00:00.250", "2099-06-01T09:00:00")]
    #[test_case::test_case("2099-06-01T09:00:00+03:00", "2099-06-01T09:00:00")]
    #[test_case::test_case(" 2099-06-01T16:30:00Z ", "2099-06-01T16:30:00")]
    fn lenient_parse_keeps_wall_clock(value: &str, expected: &str) {
        let slot = Slot::parse_lenient(value).unwrap();
        assert_eq!(slot.to_string(), expected);
    }

    #[test]
    fn lenient_parse_rejects_garbage() {
        assert!(Slot::parse_lenient("16:30").is_none());
    }

    #[test]
    fn trainer_selection_uses_camel_case() {
        let selection = TrainerSelection::new(5, "2099-01-01T10:00:00".parse().unwrap());
        assert_eq!(
            serde_json::to_string(&selection).unwrap(),
            r#"{"trainerId":5,"timeSlots":["2099-01-01T10:00:00"]}"#
        );
    }
}
