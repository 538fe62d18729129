mod common;

use rayon::prelude::*;

use common::{MemorySource, case_details, config, full_bundle};
use fir_report::generate_report_with;

#[test]
fn independent_reports_generate_in_parallel() {
    let _ = env_logger::try_init();
    let bundles: Vec<_> = (0..8)
        .map(|i| {
            let mut bundle = full_bundle();
            bundle.case_details = case_details(&format!("FIR-2024-{i:04}"));
            bundle.tracking_records = (0..(5 + i * 4)).map(common::tracking).collect();
            bundle
        })
        .collect();
    let source = MemorySource::default();

    let sequential: Vec<Vec<u8>> = bundles
        .iter()
        .map(|b| generate_report_with(b, &config(), &source).unwrap().bytes)
        .collect();
    let parallel: Vec<_> = bundles
        .par_iter()
        .map(|b| generate_report_with(b, &config(), &source).unwrap())
        .collect();

    for (i, (seq, par)) in sequential.iter().zip(&parallel).enumerate() {
        assert_eq!(par.file_name, format!("FIR_FIR-2024-{i:04}_Report.pdf"));
        assert_eq!(&par.bytes, seq, "report {i} differs when generated in parallel");
        // Section numbering is per run, never shared between runs
        assert_eq!(par.sections.first().map(|s| s.ordinal), Some(1));
    }
}
