mod common;

use common::{MemorySource, config, data_uri, full_bundle, minimal_bundle, png_bytes};
use fir_report::{generate_report_with, report_file_name, write_report_file};

fn page_count(bytes: &[u8]) -> usize {
    let doc = lopdf::Document::load_mem(bytes).expect("generated PDF parses");
    doc.get_pages().len()
}

#[test]
fn generated_pdf_parses_with_the_reported_page_count() {
    let _ = env_logger::try_init();
    let mut bundle = full_bundle();
    bundle.tracking_records = (0..30).map(common::tracking).collect();
    bundle.emblem_image = Some(data_uri("image/png", &png_bytes(64, 64)));
    let report = generate_report_with(&bundle, &config(), &MemorySource::default()).unwrap();

    assert!(report.bytes.starts_with(b"%PDF-"));
    assert!(report.page_count > 1);
    assert_eq!(page_count(&report.bytes), report.page_count);
    assert_eq!(report.file_name, "FIR_FIR-2024-0099_Report.pdf");
    assert_eq!(report.sections.len(), 11);
}

#[test]
fn images_become_xobjects() {
    let report = generate_report_with(&minimal_bundle(), &config(), &MemorySource::default()).unwrap();
    let doc = lopdf::Document::load_mem(&report.bytes).unwrap();
    let xobjects = doc
        .objects
        .values()
        .filter_map(|obj| obj.as_stream().ok())
        .filter(|stream| {
            stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .is_ok_and(|name| name == b"Image")
        })
        .count();
    // Placeholder photo (shared by complainant and officer); no soft mask for an opaque image
    assert_eq!(xobjects, 1);
}

#[test]
fn file_names_are_sanitised() {
    assert_eq!(report_file_name("FIR-2024-0012"), "FIR_FIR-2024-0012_Report.pdf");
    assert_eq!(report_file_name("12/2080 (KTM)"), "FIR_12_2080__KTM__Report.pdf");
    assert_eq!(report_file_name(" 77 "), "FIR_77_Report.pdf");
}

#[test]
fn report_file_is_written_into_the_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_report_file(&minimal_bundle(), &config(), &dir.path().join("reports")).unwrap();
    assert_eq!(path.file_name().unwrap(), "FIR_FIR-2024-0012_Report.pdf");
    let bytes = std::fs::read(&path).unwrap();
    assert!(page_count(&bytes) >= 1);
}

#[test]
fn output_is_reproducible_with_a_fixed_timestamp() {
    let bundle = full_bundle();
    let a = generate_report_with(&bundle, &config(), &MemorySource::default()).unwrap();
    let b = generate_report_with(&bundle, &config(), &MemorySource::default()).unwrap();
    assert_eq!(a.bytes, b.bytes);
}
