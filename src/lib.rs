mod config;
mod error;
mod fonts;
mod images;
mod model;
mod pdf;
mod report;

pub use config::{MM, PageGeometry, ReportConfig, mm};
pub use error::Error;
pub use fonts::Font;
pub use images::{
    AssetSource, Image, ImageFormat, ImageLoader, ImageSource, decode_encoded, default_placeholder,
};
pub use model::{
    CaseDetails, EvidenceItem, NOT_AVAILABLE, Person, PersonGroup, PersonRole, ReportBundle,
    SupplementaryStatement, TrackingRecord, format_date, format_timestamp,
};
pub use pdf::canvas::{Canvas, DrawOp, Page};
pub use pdf::layout::{LayoutContext, SectionMark, TextStyle, fit_text, truncate_chars, wrap_text};
pub use pdf::table::{CellAlign, Column, Table, TableOutcome, TableStyle, render_table, report_table_style};

use std::path::{Path, PathBuf};
use std::time::Instant;

/// The flat rendering model of a finished layout, before serialisation.
pub struct LaidOutReport {
    pub canvas: Canvas,
    pub sections: Vec<SectionMark>,
    pub file_name: String,
    /// Persons whose role maps to no report section.
    pub omitted_persons: usize,
}

#[derive(Debug)]
pub struct GeneratedReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub sections: Vec<SectionMark>,
}

/// `FIR_<number>_Report.pdf`, with anything outside `[A-Za-z0-9-_]` replaced by `_`.
pub fn report_file_name(fir_number: &str) -> String {
    let safe: String = fir_number
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("FIR_{safe}_Report.pdf")
}

pub fn layout_report(
    bundle: &ReportBundle,
    config: &ReportConfig,
    source: &dyn ImageSource,
) -> Result<LaidOutReport, Error> {
    bundle.validate()?;
    let laid_out = report::layout(bundle, config, source);
    Ok(LaidOutReport {
        canvas: laid_out.canvas,
        sections: laid_out.sections,
        file_name: report_file_name(&bundle.case_details.fir_number),
        omitted_persons: laid_out.omitted_persons,
    })
}

pub fn generate_report_with(
    bundle: &ReportBundle,
    config: &ReportConfig,
    source: &dyn ImageSource,
) -> Result<GeneratedReport, Error> {
    let t0 = Instant::now();

    let laid_out = layout_report(bundle, config, source)?;
    let t_layout = t0.elapsed();

    let case = &bundle.case_details;
    let info = pdf::DocumentInfo {
        title: format!("{} {}", config.report_title, case.fir_number.trim()),
        subject: model::or_na(&case.crime_type).to_string(),
        author: config.organization.clone(),
    };
    let bytes = pdf::write(&laid_out.canvas, &info);
    let t_total = t0.elapsed();

    log::info!(
        "Timing: layout={:.1}ms, write={:.1}ms, total={:.1}ms ({} pages, {} sections, output {} bytes)",
        t_layout.as_secs_f64() * 1000.0,
        (t_total - t_layout).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        laid_out.canvas.page_count(),
        laid_out.sections.len(),
        bytes.len(),
    );

    Ok(GeneratedReport {
        file_name: laid_out.file_name,
        page_count: laid_out.canvas.page_count(),
        sections: laid_out.sections,
        bytes,
    })
}

/// Generate with images resolved from the filesystem (and http, if enabled) per `config`.
pub fn generate_report(bundle: &ReportBundle, config: &ReportConfig) -> Result<GeneratedReport, Error> {
    let source = AssetSource::from_config(config);
    generate_report_with(bundle, config, &source)
}

pub fn generate_report_json(json: &str, config: &ReportConfig) -> Result<GeneratedReport, Error> {
    let bundle = ReportBundle::from_json(json)?;
    generate_report(&bundle, config)
}

/// Generate and write `FIR_<number>_Report.pdf` into `out_dir`. Returns the written path.
pub fn write_report_file(
    bundle: &ReportBundle,
    config: &ReportConfig,
    out_dir: &Path,
) -> Result<PathBuf, Error> {
    let report = generate_report(bundle, config)?;
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(&report.file_name);
    std::fs::write(&path, &report.bytes)?;
    log::info!("Wrote {} ({} pages)", path.display(), report.page_count);
    Ok(path)
}
