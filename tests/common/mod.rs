#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;

use chrono::NaiveDate;
use fir_report::{
    CaseDetails, DrawOp, EvidenceItem, ImageSource, LaidOutReport, Page, Person, PersonRole,
    ReportBundle, ReportConfig, SupplementaryStatement, TrackingRecord,
};

/// Image source backed by a map; unknown references fail like a missing file.
#[derive(Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn with(mut self, reference: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(reference.to_string(), bytes);
        self
    }
}

impl ImageSource for MemorySource {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, String> {
        self.files
            .get(reference)
            .cloned()
            .ok_or_else(|| format!("{reference}: not found"))
    }
}

pub fn s(v: &str) -> Option<String> {
    Some(v.to_string())
}

/// Config with a fixed footer timestamp so output is reproducible.
pub fn config() -> ReportConfig {
    ReportConfig {
        generated_at: NaiveDate::from_ymd_opt(2024, 3, 8)
            .and_then(|d| d.and_hms_opt(10, 15, 0)),
        ..ReportConfig::default()
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, 120])
    });
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, _| image::Rgb([(x % 256) as u8, 40, 90]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .unwrap();
    buf
}

pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    use base64::Engine;
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

pub fn case_details(fir_number: &str) -> CaseDetails {
    CaseDetails {
        fir_number: fir_number.to_string(),
        incident_date: s("2024-03-01"),
        filing_date: s("2024-03-02T09:30:00"),
        status: s("Under Investigation"),
        priority: s("High"),
        crime_type: s("Theft"),
        crime_section: s("Section 379"),
        location: s("New Road, Ward 22"),
        district: s("Kathmandu"),
        summary: s("The complainant reported that a motorcycle parked outside the \
                    shop was removed during the night by unknown persons."),
        station_name: s("Central Police Station"),
        station_code: s("CPS-01"),
        station_district: s("Kathmandu"),
        station_province: s("Bagmati"),
        station_phone: s("01-4200000"),
        station_address: s("Hanuman Dhoka, Kathmandu"),
        station_jurisdiction: s("Wards 20 to 28 of the metropolitan city"),
        station_in_charge_name: s("Ram Thapa"),
        station_in_charge_rank: s("Inspector"),
        station_in_charge_badge: s("P-1120"),
        officer_first_name: s("Sita"),
        officer_last_name: s("Karki"),
        officer_rank: s("Sub-Inspector"),
        officer_badge: s("P-3391"),
        officer_department: s("Crime Investigation"),
        officer_contact: s("9800000001"),
        officer_email: s("sita.karki@police.example"),
        ..CaseDetails::default()
    }
}

pub fn person(role: &str, first: &str, last: &str) -> Person {
    Person {
        role: PersonRole::from(role.to_string()),
        first_name: s(first),
        last_name: s(last),
        gender: s("Female"),
        date_of_birth: s("1990-05-14"),
        citizenship: s("Nepali"),
        national_id: s("12-34-56"),
        contact: s("9811111111"),
        email: s("person@example.com"),
        address: s("Ward 4"),
        city: s("Lalitpur"),
        state: s("Bagmati"),
        ..Person::default()
    }
}

pub fn evidence(code: &str) -> EvidenceItem {
    EvidenceItem {
        code: s(code),
        evidence_type: s("Physical"),
        description: s("Broken lock recovered from the parking area."),
        status: s("Collected"),
        collection_date: s("2024-03-02"),
        collected_by_name: s("Sita Karki"),
        collected_by_rank: s("Sub-Inspector"),
        file_reference: s("/uploads/evidence/lock.jpg"),
    }
}

pub fn statement(name: &str) -> SupplementaryStatement {
    SupplementaryStatement {
        person_name: s(name),
        person_role: s("Witness"),
        statement_date: s("2024-03-04"),
        statement: s("I saw two persons near the shop around midnight."),
        recorded_by_name: s("Sita Karki"),
        recorded_by_rank: s("Sub-Inspector"),
        remarks: s("Statement read back and signed."),
    }
}

pub fn tracking(i: usize) -> TrackingRecord {
    TrackingRecord {
        timestamp: Some(format!("2024-03-{:02}T10:{:02}:00", 1 + i % 28, i % 60)),
        action_type: s("Update"),
        action_description: Some(format!("Investigation step {i}: follow-up with the station diary")),
        old_status: if i == 0 { None } else { s("Open") },
        new_status: s("Under Investigation"),
    }
}

/// Station, incident, one complainant, officer and signatures only.
pub fn minimal_bundle() -> ReportBundle {
    ReportBundle {
        case_details: case_details("FIR-2024-0012"),
        persons: vec![person("Complainant", "Hari", "Shrestha")],
        ..ReportBundle::default()
    }
}

pub fn full_bundle() -> ReportBundle {
    ReportBundle {
        case_details: case_details("FIR-2024-0099"),
        persons: vec![
            person("Complainant", "Hari", "Shrestha"),
            person("Victim", "Gita", "Shrestha"),
            person("Accused", "Bikash", "Rai"),
            person("Suspect", "Unknown", "Rider"),
            person("Witness", "Mina", "Gurung"),
        ],
        evidence: vec![evidence("EV-1"), evidence("EV-2")],
        supplementary_statements: vec![statement("Mina Gurung")],
        tracking_records: (0..5).map(tracking).collect(),
        ..ReportBundle::default()
    }
}

pub fn section_titles(report: &LaidOutReport) -> Vec<&str> {
    report.sections.iter().map(|s| s.title.as_str()).collect()
}

pub fn all_texts(report: &LaidOutReport) -> Vec<&str> {
    report.canvas.pages().iter().flat_map(Page::texts).collect()
}

/// Baselines of every text op on a page whose text equals `needle`.
pub fn text_positions(page: &Page, needle: &str) -> Vec<(f32, f32)> {
    page.ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { x, y, text, .. } if text == needle => Some((*x, *y)),
            _ => None,
        })
        .collect()
}
