use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::TicketDeskError;

pub const DEFAULT_ENGINEERS_TABLE: &str = "engineers";
pub const DEFAULT_TICKETS_TABLE: &str = "ticket_main";
pub const DEFAULT_BUCKET: &str = "call-reports";

/// Separator used by the `callreports` column
pub const CALLREPORT_SEPARATOR: char = ',';

/// Treat an explicit JSON `null` the same as a missing column.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An empty or whitespace-only string means the value was never recorded.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

/// Ticket identifier as stored in the `ticket_number` column.
///
/// The column is numeric in every deployment seen so far, but the value is kept
/// in its textual form so that string identifiers still round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TicketNumber(String);

impl TicketNumber {
    pub fn new(value: impl Into<String>) -> Self {
        TicketNumber(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn as_int(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TicketNumber {
    fn from(value: &str) -> Self {
        TicketNumber::new(value)
    }
}

impl From<i64> for TicketNumber {
    fn from(value: i64) -> Self {
        TicketNumber(value.to_string())
    }
}

impl Ord for TicketNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_int(), other.as_int()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for TicketNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for TicketNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_int() {
            Some(n) => serializer.serialize_i64(n),
            None => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for TicketNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => TicketNumber::from(n),
            Raw::Text(s) => TicketNumber::new(s),
        })
    }
}

/// Coarse urgency attached to the latest note on a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum NotePriority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl NotePriority {
    pub const ALL: [NotePriority; 4] = [
        NotePriority::None,
        NotePriority::Low,
        NotePriority::Medium,
        NotePriority::High,
    ];
}

impl fmt::Display for NotePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotePriority::None => write!(f, "None"),
            NotePriority::Low => write!(f, "Low"),
            NotePriority::Medium => write!(f, "Medium"),
            NotePriority::High => write!(f, "High"),
        }
    }
}

impl FromStr for NotePriority {
    type Err = TicketDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(NotePriority::None),
            "low" => Ok(NotePriority::Low),
            "medium" => Ok(NotePriority::Medium),
            "high" => Ok(NotePriority::High),
            _ => Err(TicketDeskError::InvalidPriority(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for NotePriority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

pub const VALID_NOTE_PRIORITIES: &[&str] = &["None", "Low", "Medium", "High"];

/// Row of the engineer directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engineer {
    pub name: String,
}

/// Minimal ticket projection used by the per-engineer picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSummary {
    pub ticket_number: TicketNumber,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_branch: String,
}

impl TicketSummary {
    /// Display string shown in the ticket picker
    pub fn label(&self) -> String {
        format!("{} - {}", self.ticket_number, self.company_branch)
    }
}

/// Full ticket record as read from the ticket store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDetail {
    pub ticket_number: TicketNumber,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_branch: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub paused: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub note: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub note_priority: NotePriority,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub note_created_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub callreports: String,
}

impl TicketDetail {
    pub fn new(ticket_number: impl Into<TicketNumber>) -> Self {
        TicketDetail {
            ticket_number: ticket_number.into(),
            company_branch: String::new(),
            paused: false,
            completed: false,
            note: String::new(),
            note_priority: NotePriority::None,
            note_created_at: None,
            callreports: String::new(),
        }
    }

    pub fn image_urls(&self) -> Vec<String> {
        split_callreports(&self.callreports)
    }
}

/// Note metadata columns that only exist in some deployments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteMetadata {
    pub note_priority: NotePriority,
    pub note_created_at: Option<String>,
}

/// Payload written back to the ticket store on submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketUpdate {
    pub company_branch: String,
    pub paused: bool,
    pub completed: bool,
    pub note: String,
    pub callreports: String,
    #[serde(flatten)]
    pub note_metadata: Option<NoteMetadata>,
}

impl TicketUpdate {
    /// Apply this payload to a stored record, the way the backend would.
    pub fn apply_to(&self, detail: &mut TicketDetail) {
        detail.company_branch = self.company_branch.clone();
        detail.paused = self.paused;
        detail.completed = self.completed;
        detail.note = self.note.clone();
        detail.callreports = self.callreports.clone();
        if let Some(meta) = &self.note_metadata {
            detail.note_priority = meta.note_priority;
            detail.note_created_at = meta.note_created_at.clone();
        }
    }
}

/// Split a stored `callreports` value into its URLs.
///
/// An empty column means "no images", never a single empty URL.
pub fn split_callreports(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value
        .split(CALLREPORT_SEPARATOR)
        .map(str::to_string)
        .collect()
}

/// Join image URLs into the stored `callreports` format.
pub fn join_callreports(urls: &[String]) -> String {
    urls.join(&CALLREPORT_SEPARATOR.to_string())
}
