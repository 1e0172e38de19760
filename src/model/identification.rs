//! Identification data model.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::species::SpeciesType;

/// Positive track identifier assigned by the host surface.
///
/// Zero is reserved as the "no active entity" sentinel and can never be
/// constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    /// Parse decimal text; `None` for zero, empty or non-numeric input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<u64>().ok().and_then(Self::new)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("track id must be a positive integer, got '{s}'"))
    }
}

/// A species classification plus the time it was made.
///
/// `identified_at` keeps the raw text so that imported timestamps which do
/// not parse still survive an export round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationRecord {
    #[serde(rename = "type")]
    pub species: SpeciesType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identified_at: Option<String>,
}

impl IdentificationRecord {
    /// A record stamped with the current time.
    #[must_use]
    pub fn now(species: SpeciesType) -> Self {
        Self {
            species,
            identified_at: Some(now_timestamp()),
        }
    }

    /// The identification time, if present and parseable.
    ///
    /// See [`parse_timestamp`] for the accepted forms.
    #[must_use]
    pub fn identified_at_parsed(&self) -> Option<DateTime<Utc>> {
        self.identified_at.as_deref().and_then(parse_timestamp)
    }
}

/// Date-time layouts accepted without an offset.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an identification timestamp.
///
/// RFC 3339 first. Text without an offset (`2024-01-01 10:00:00`,
/// `2024-01-01T10:00`) or a bare date (`2024-01-01`, read as midnight) is
/// taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// All stored identifications keyed by track id.
pub type IdentificationMap = BTreeMap<EntityId, IdentificationRecord>;

/// Current UTC time in the persisted format (`2024-05-01T10:20:30.123Z`).
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Entries in display order: newest identification first.
///
/// Records whose timestamp is missing or unparseable go after every valid
/// one. Equal keys fall back to ascending id so the listing is stable.
#[must_use]
pub fn display_order(map: &IdentificationMap) -> Vec<(EntityId, &IdentificationRecord)> {
    let mut entries: Vec<_> = map
        .iter()
        .map(|(id, rec)| (*id, rec, rec.identified_at_parsed()))
        .collect();

    entries.sort_by(|(a_id, _, a_at), (b_id, _, b_at)| {
        let by_time = match (a_at, b_at) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_time.then_with(|| a_id.cmp(b_id))
    });

    entries.into_iter().map(|(id, rec, _)| (id, rec)).collect()
}

/// One listing line, e.g. `[42] Brown goshawk`.
#[must_use]
pub fn display_line(id: EntityId, record: &IdentificationRecord) -> String {
    format!("[{id}] {}", record.species.label())
}
