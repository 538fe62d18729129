//! Report Bundle: the caller-assembled input of one report run.
//!
//! Every field except `caseDetails.firNumber` is optional. Absent or blank
//! values are shown as `N/A` by the renderers through [`or_na`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::Error;

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportBundle {
    pub case_details: CaseDetails,
    pub persons: Vec<Person>,
    pub evidence: Vec<EvidenceItem>,
    pub supplementary_statements: Vec<SupplementaryStatement>,
    pub tracking_records: Vec<TrackingRecord>,
    /// Pre-encoded organisation logo (data URI or bare base64).
    pub logo_image: Option<String>,
    /// Pre-encoded national emblem (data URI or bare base64).
    pub emblem_image: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseDetails {
    pub fir_number: String,
    pub incident_date: Option<String>,
    pub filing_date: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub crime_type: Option<String>,
    pub crime_section: Option<String>,
    pub location: Option<String>,
    pub district: Option<String>,
    pub summary: Option<String>,

    pub station_name: Option<String>,
    pub station_code: Option<String>,
    pub station_district: Option<String>,
    pub station_province: Option<String>,
    pub station_phone: Option<String>,
    pub station_address: Option<String>,
    pub station_jurisdiction: Option<String>,
    pub station_in_charge_name: Option<String>,
    pub station_in_charge_rank: Option<String>,
    pub station_in_charge_badge: Option<String>,

    pub officer_first_name: Option<String>,
    pub officer_middle_name: Option<String>,
    pub officer_last_name: Option<String>,
    pub officer_rank: Option<String>,
    pub officer_badge: Option<String>,
    pub officer_department: Option<String>,
    pub officer_contact: Option<String>,
    pub officer_email: Option<String>,
    pub officer_photo: Option<String>,
    pub officer_signature: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Person {
    pub role: PersonRole,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub citizenship: Option<String>,
    pub national_id: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub photo: Option<String>,
    pub signature: Option<String>,
    pub statement: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum PersonRole {
    Complainant,
    Victim,
    Accused,
    Suspect,
    Witness,
    /// A role no report section renders. Kept verbatim for diagnostics.
    Other(String),
}

/// The person sections of the report, in emission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PersonGroup {
    Complainants,
    Victims,
    AccusedOrSuspects,
    Witnesses,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvidenceItem {
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub evidence_type: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub collection_date: Option<String>,
    pub collected_by_name: Option<String>,
    pub collected_by_rank: Option<String>,
    /// Path-like reference; only the file name is ever shown.
    pub file_reference: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplementaryStatement {
    pub person_name: Option<String>,
    pub person_role: Option<String>,
    pub statement_date: Option<String>,
    pub statement: Option<String>,
    pub recorded_by_name: Option<String>,
    pub recorded_by_rank: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackingRecord {
    pub timestamp: Option<String>,
    pub action_type: Option<String>,
    pub action_description: Option<String>,
    pub old_status: Option<String>,
    pub new_status: Option<String>,
}

impl From<String> for PersonRole {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "complainant" | "informant" => PersonRole::Complainant,
            "victim" => PersonRole::Victim,
            "accused" => PersonRole::Accused,
            "suspect" => PersonRole::Suspect,
            "witness" => PersonRole::Witness,
            _ => PersonRole::Other(value),
        }
    }
}

impl Default for PersonRole {
    fn default() -> Self {
        PersonRole::Other(String::new())
    }
}

impl PersonRole {
    /// Section a role is rendered in. `None` means the person is left out of the report.
    pub fn group(&self) -> Option<PersonGroup> {
        match self {
            PersonRole::Complainant => Some(PersonGroup::Complainants),
            PersonRole::Victim => Some(PersonGroup::Victims),
            PersonRole::Accused | PersonRole::Suspect => Some(PersonGroup::AccusedOrSuspects),
            PersonRole::Witness => Some(PersonGroup::Witnesses),
            PersonRole::Other(_) => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PersonRole::Complainant => "Complainant",
            PersonRole::Victim => "Victim",
            PersonRole::Accused => "Accused",
            PersonRole::Suspect => "Suspect",
            PersonRole::Witness => "Witness",
            PersonRole::Other(raw) => raw,
        }
    }
}

impl PersonGroup {
    pub const ALL: [PersonGroup; 4] = [
        PersonGroup::Complainants,
        PersonGroup::Victims,
        PersonGroup::AccusedOrSuspects,
        PersonGroup::Witnesses,
    ];

    pub fn title(self) -> &'static str {
        match self {
            PersonGroup::Complainants => "Complainant / Informant Details",
            PersonGroup::Victims => "Victim Details",
            PersonGroup::AccusedOrSuspects => "Accused / Suspect Details",
            PersonGroup::Witnesses => "Witness Details",
        }
    }

    /// Whether person blocks in this section carry a bracketed role label.
    pub fn shows_role_label(self) -> bool {
        matches!(self, PersonGroup::AccusedOrSuspects)
    }
}

impl ReportBundle {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let bundle: ReportBundle = serde_json::from_str(json)?;
        bundle.validate()?;
        Ok(bundle)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.case_details.fir_number.trim().is_empty() {
            return Err(Error::invalid_bundle("caseDetails.firNumber is missing or empty"));
        }
        Ok(())
    }

    /// Persons of one section, in input order. No deduplication.
    pub fn persons_in(&self, group: PersonGroup) -> impl Iterator<Item = &Person> {
        self.persons
            .iter()
            .filter(move |p| p.role.group() == Some(group))
    }

    /// Persons whose role maps to no section.
    pub fn unrendered_persons(&self) -> impl Iterator<Item = &Person> {
        self.persons.iter().filter(|p| p.role.group().is_none())
    }
}

impl Person {
    pub fn full_name(&self) -> String {
        join_present(
            &[&self.first_name, &self.middle_name, &self.last_name],
            " ",
        )
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn address_line(&self) -> String {
        join_present(&[&self.address, &self.city, &self.state], ", ")
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

impl CaseDetails {
    pub fn officer_full_name(&self) -> String {
        join_present(
            &[
                &self.officer_first_name,
                &self.officer_middle_name,
                &self.officer_last_name,
            ],
            " ",
        )
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// "Rank Name (Badge: X)" for the station's officer in charge.
    pub fn station_in_charge(&self) -> String {
        let name = join_present(
            &[&self.station_in_charge_rank, &self.station_in_charge_name],
            " ",
        );
        match (name, present(&self.station_in_charge_badge)) {
            (Some(n), Some(b)) => format!("{n} (Badge: {b})"),
            (Some(n), None) => n,
            (None, Some(b)) => format!("Badge: {b}"),
            (None, None) => NOT_AVAILABLE.to_string(),
        }
    }
}

/// Trimmed value, or `None` when absent or blank.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// The value to print for an optional field.
pub fn or_na(value: &Option<String>) -> &str {
    present(value).unwrap_or(NOT_AVAILABLE)
}

pub(crate) fn join_present(parts: &[&Option<String>], sep: &str) -> Option<String> {
    let kept: Vec<&str> = parts.iter().filter_map(|p| present(p)).collect();
    if kept.is_empty() {
        None
    } else {
        Some(kept.join(sep))
    }
}

enum When {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

fn parse_when(value: &str) -> Option<When> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(When::DateTime(dt.naive_local()));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(When::DateTime(dt));
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(When::Date)
}

/// `DD/MM/YYYY`; unparseable text is passed through.
pub fn format_date(value: &Option<String>) -> String {
    let Some(v) = present(value) else {
        return NOT_AVAILABLE.to_string();
    };
    match parse_when(v) {
        Some(When::Date(d)) => d.format("%d/%m/%Y").to_string(),
        Some(When::DateTime(dt)) => dt.format("%d/%m/%Y").to_string(),
        None => v.to_string(),
    }
}

/// `DD/MM/YYYY HH:MM` (date-only values keep the date format).
pub fn format_timestamp(value: &Option<String>) -> String {
    let Some(v) = present(value) else {
        return NOT_AVAILABLE.to_string();
    };
    match parse_when(v) {
        Some(When::Date(d)) => d.format("%d/%m/%Y").to_string(),
        Some(When::DateTime(dt)) => dt.format("%d/%m/%Y %H:%M").to_string(),
        None => v.to_string(),
    }
}
