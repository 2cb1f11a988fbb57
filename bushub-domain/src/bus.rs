use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates;

/// A single departure time within a schedule entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub start_time: String,
}

/// One day of a bus's schedule. `date` keeps the operator-entered string,
/// which may be `DD-MM-YYYY` or ISO `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub date: String,
    pub times: Vec<TimeSlot>,
}

impl ScheduleEntry {
    /// The entry's calendar date, if the stored string parses in either
    /// supported format.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        dates::parse_travel_date(&self.date).ok()
    }

    /// Slot whose start time matches `time` exactly.
    pub fn slot(&self, time: &str) -> Option<&TimeSlot> {
        self.times.iter().find(|slot| slot.start_time == time)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bus {
    pub id: Uuid,
    pub name: String,
    pub seat_count: u32,
    pub schedule: Vec<ScheduleEntry>,
}

impl Bus {
    /// First schedule entry whose calendar date equals `date`. Entries with
    /// unparseable dates never match.
    pub fn entry_for(&self, date: NaiveDate) -> Option<&ScheduleEntry> {
        self.schedule
            .iter()
            .find(|entry| entry.calendar_date() == Some(date))
    }
}
