use crate::utils::error::{GateError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

static ZIP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // ASCII only; `\d` would also accept other Unicode digits
    Regex::new(r"^[0-9]{5}$").expect("static ZIP pattern is valid")
});

/// 五位數美國郵遞區號
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZipCode(String);

impl ZipCode {
    pub fn parse(value: &str) -> Result<Self> {
        if ZIP_PATTERN.is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(GateError::InvalidZip {
                value: value.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ZipCode {
    type Error = GateError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ZipCode> for String {
    fn from(zip: ZipCode) -> Self {
        zip.0
    }
}

/// 管理員可選的服務半徑（英里）
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub enum Radius {
    #[default]
    Twenty,
    Forty,
    Sixty,
    Eighty,
}

impl Radius {
    pub fn miles(self) -> u32 {
        match self {
            Radius::Twenty => 20,
            Radius::Forty => 40,
            Radius::Sixty => 60,
            Radius::Eighty => 80,
        }
    }

    /// Admin form input: anything that is not one of the allowed values becomes 20.
    pub fn from_form(input: &str) -> Self {
        input
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(|miles| Radius::try_from(miles).ok())
            .unwrap_or_default()
    }
}

impl TryFrom<u32> for Radius {
    type Error = GateError;

    fn try_from(miles: u32) -> Result<Self> {
        match miles {
            20 => Ok(Radius::Twenty),
            40 => Ok(Radius::Forty),
            60 => Ok(Radius::Sixty),
            80 => Ok(Radius::Eighty),
            other => Err(GateError::InvalidConfigValueError {
                field: "radius_miles".to_string(),
                value: other.to_string(),
                reason: "Radius must be one of 20, 40, 60, 80".to_string(),
            }),
        }
    }
}

impl From<Radius> for u32 {
    fn from(radius: Radius) -> Self {
        radius.miles()
    }
}

impl fmt::Display for Radius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.miles())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAreaEntry {
    #[serde(rename = "zip")]
    pub zip_code: ZipCode,
    pub radius_miles: Radius,
}

impl ServiceAreaEntry {
    pub fn new(zip_code: ZipCode, radius_miles: Radius) -> Self {
        Self {
            zip_code,
            radius_miles,
        }
    }
}

/// Snapshot of the admin-configured service areas, one radius per ZIP.
///
/// Iteration is ordered by ZIP so that evaluation never depends on storage order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceAreaConfig {
    entries: BTreeMap<ZipCode, Radius>,
}

impl ServiceAreaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from a list that may contain the same ZIP more than once.
    pub fn from_entries<I: IntoIterator<Item = ServiceAreaEntry>>(entries: I) -> Self {
        let mut config = Self::new();
        for entry in entries {
            config.insert(entry);
        }
        config
    }

    /// Adds an entry; a duplicate ZIP keeps the larger of the two radii.
    pub fn insert(&mut self, entry: ServiceAreaEntry) {
        self.entries
            .entry(entry.zip_code)
            .and_modify(|radius| *radius = (*radius).max(entry.radius_miles))
            .or_insert(entry.radius_miles);
    }

    /// Explicit upsert: replaces any existing radius for the ZIP.
    pub fn set(&mut self, entry: ServiceAreaEntry) -> Option<Radius> {
        self.entries.insert(entry.zip_code, entry.radius_miles)
    }

    pub fn remove(&mut self, zip: &ZipCode) -> Option<Radius> {
        self.entries.remove(zip)
    }

    pub fn get(&self, zip: &ZipCode) -> Option<Radius> {
        self.entries.get(zip).copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = ServiceAreaEntry> + '_ {
        self.entries
            .iter()
            .map(|(zip, radius)| ServiceAreaEntry::new(zip.clone(), *radius))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = GateError;

    fn try_from(raw: RawCoordinate) -> Result<Self> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(GateError::ValidationError {
                message: format!("Coordinate out of range: ({}, {})", latitude, longitude),
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    Matched,
    OutOfRange,
    ConfigEmpty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDecision {
    pub accepted: bool,
    pub matched_entry: Option<ServiceAreaEntry>,
    pub distance_miles: Option<f64>,
    pub reason: DecisionReason,
}

impl GateDecision {
    pub fn matched(entry: ServiceAreaEntry, distance_miles: f64) -> Self {
        Self {
            accepted: true,
            matched_entry: Some(entry),
            distance_miles: Some(distance_miles),
            reason: DecisionReason::Matched,
        }
    }

    pub fn rejected(reason: DecisionReason) -> Self {
        Self {
            accepted: false,
            matched_entry: None,
            distance_miles: None,
            reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Scheduled,
    Completed,
    Rejected,
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LeadStatus::New => "new",
            LeadStatus::Scheduled => "scheduled",
            LeadStatus::Completed => "completed",
            LeadStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Raw contact-form fields as submitted by a visitor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub zip: String,
    pub address: Option<String>,
    pub service: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub zip: String,
    pub address: Option<String>,
    pub service: Option<String>,
    pub message: Option<String>,
    pub status: LeadStatus,
    pub matched_zip: Option<String>,
    pub distance_miles: Option<f64>,
    pub created_at: DateTime<Utc>,
    /// Weekly subscriber: completing the lead books the next visit.
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub follow_up_date: Option<NaiveDate>,
}

/// Provider lead views. The default hides finished work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LeadFilter {
    #[default]
    Active,
    Completed,
    Rejected,
    Subscribers,
    All,
}

impl LeadFilter {
    pub fn matches(self, lead: &Lead) -> bool {
        match self {
            LeadFilter::Active => !matches!(
                lead.status,
                LeadStatus::Completed | LeadStatus::Rejected
            ),
            LeadFilter::Completed => lead.status == LeadStatus::Completed,
            LeadFilter::Rejected => lead.status == LeadStatus::Rejected,
            LeadFilter::Subscribers => lead.recurring,
            LeadFilter::All => true,
        }
    }
}

impl std::str::FromStr for LeadFilter {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(LeadFilter::Active),
            "completed" => Ok(LeadFilter::Completed),
            "rejected" => Ok(LeadFilter::Rejected),
            "subscribers" => Ok(LeadFilter::Subscribers),
            "all" => Ok(LeadFilter::All),
            other => Err(GateError::ValidationError {
                message: format!("Unknown lead filter: {}", other),
            }),
        }
    }
}

/// What a provider can do with a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadAction {
    Complete,
    Reject,
    /// Schedule a follow-up for the next day.
    Tomorrow,
    /// Toggle the weekly subscription.
    Weekly,
}

impl std::str::FromStr for LeadAction {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "complete" => Ok(LeadAction::Complete),
            "reject" => Ok(LeadAction::Reject),
            "tomorrow" => Ok(LeadAction::Tomorrow),
            "weekly" => Ok(LeadAction::Weekly),
            other => Err(GateError::ValidationError {
                message: format!("Unknown lead action: {}", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LeadStats {
    pub completed: usize,
    pub rejected: usize,
    pub subscribers: usize,
}
