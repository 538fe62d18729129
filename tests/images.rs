mod common;

use common::{MemorySource, config, data_uri, jpeg_bytes, minimal_bundle, png_bytes, text_positions};
use fir_report::{
    AssetSource, DrawOp, Image, ImageFormat, ImageLoader, ImageSource, LaidOutReport, PageGeometry,
    decode_encoded, default_placeholder, layout_report, mm,
};

fn header_texts(report: &LaidOutReport) -> Vec<(String, f32, f32)> {
    let page = &report.canvas.pages()[0];
    // Everything drawn before the first section band belongs to the masthead
    page.ops
        .iter()
        .take_while(|op| !matches!(op, DrawOp::FillRect { .. }))
        .filter_map(|op| match op {
            DrawOp::Text { x, y, text, .. } => Some((text.clone(), *x, *y)),
            _ => None,
        })
        .collect()
}

fn header_images(report: &LaidOutReport) -> Vec<(f32, f32, f32, f32)> {
    report.canvas.pages()[0]
        .ops
        .iter()
        .take_while(|op| !matches!(op, DrawOp::FillRect { .. }))
        .filter_map(|op| match op {
            DrawOp::Image { x, y, w, h, .. } => Some((*x, *y, *w, *h)),
            _ => None,
        })
        .collect()
}

#[test]
fn missing_photo_uses_placeholder_and_keeps_fields() {
    let _ = env_logger::try_init();
    let mut bundle = minimal_bundle();
    bundle.persons[0].photo = Some("/uploads/persons/missing.jpg".to_string());
    let report = layout_report(&bundle, &config(), &MemorySource::default()).unwrap();

    let placeholder = image::load_from_memory(&default_placeholder().unwrap().data)
        .unwrap()
        .to_rgb8()
        .dimensions();
    assert!(
        report
            .canvas
            .images()
            .iter()
            .any(|img| (img.pixel_width, img.pixel_height) == placeholder)
    );
    let page = &report.canvas.pages()[report.sections[2].page];
    assert!(page.image_ops().count() >= 1);
    assert!(!text_positions(page, "Full Name:").is_empty());
    assert!(!text_positions(page, "Email:").is_empty());
}

#[test]
fn resolved_photo_is_embedded_once_per_distinct_image() {
    let photo = png_bytes(60, 80);
    let source = MemorySource::default().with("/uploads/a.png", photo);
    let mut bundle = minimal_bundle();
    bundle.persons[0].photo = Some("/uploads/a.png".to_string());
    bundle.persons.push(bundle.persons[0].clone());
    let report = layout_report(&bundle, &config(), &source).unwrap();

    // The shared photo plus the officer's placeholder
    assert_eq!(report.canvas.images().len(), 2);
    let photo_draws = report
        .canvas
        .pages()
        .iter()
        .flat_map(|p| p.image_ops())
        .filter(|op| matches!(op, DrawOp::Image { image: 0, .. }))
        .count();
    assert_eq!(photo_draws, 2);
}

/// Images drawn between the band whose text starts with `from` and the one starting with `to`.
fn images_between(report: &LaidOutReport, from: &str, to: &str) -> Vec<usize> {
    let mut inside = false;
    let mut found = Vec::new();
    for op in report.canvas.pages().iter().flat_map(|p| p.ops.iter()) {
        match op {
            DrawOp::Text { text, .. } if text.starts_with(from) => inside = true,
            DrawOp::Text { text, .. } if text.starts_with(to) => break,
            DrawOp::Image { image, .. } if inside => found.push(*image),
            _ => {}
        }
    }
    found
}

#[test]
fn corrupt_photo_falls_back_to_the_placeholder() {
    let mut bundle = minimal_bundle();
    // Valid PNG signature, garbage after it
    let mut corrupt = b"\x89PNG\r\n\x1a\n".to_vec();
    corrupt.extend_from_slice(b"garbage where the IHDR chunk should be");
    bundle.persons[0].photo = Some(data_uri("image/png", &corrupt));
    let report = layout_report(&bundle, &config(), &MemorySource::default()).unwrap();

    let drawn = images_between(&report, "3. COMPLAINANT", "4. REGISTERING OFFICER");
    assert_eq!(drawn.len(), 1, "placeholder drawn in the photo slot");
    let placeholder = image::load_from_memory(&default_placeholder().unwrap().data)
        .unwrap()
        .to_rgb8()
        .dimensions();
    let img = &report.canvas.images()[drawn[0]];
    assert_eq!((img.pixel_width, img.pixel_height), placeholder);

    let texts = common::all_texts(&report);
    assert!(texts.contains(&"Hari Shrestha"));
    assert!(texts.contains(&"Address:"));
}

#[test]
fn undecodable_declared_png_is_not_loaded() {
    let source = MemorySource::default().with("/uploads/bad.png", b"definitely not a png".to_vec());
    let loader = ImageLoader::new(&source);
    assert!(loader.load(&Some(data_uri("image/png", b"definitely not a png"))).is_none());
    assert!(loader.load(&Some("/uploads/bad.png".to_string())).is_none());
    assert!(loader.load_encoded(&Some(data_uri("image/png", b"\x89PNG\r\n\x1a\nxx"))).is_none());
    assert!(loader.load_person_photo(&Some("/uploads/bad.png".to_string())).is_some());
}

#[test]
fn photo_keeps_aspect_ratio_inside_its_box() {
    let source = MemorySource::default().with("wide.png", png_bytes(200, 50));
    let mut bundle = minimal_bundle();
    bundle.persons[0].photo = Some("wide.png".to_string());
    let report = layout_report(&bundle, &config(), &source).unwrap();
    let page = &report.canvas.pages()[report.sections[2].page];
    let (w, h) = page
        .image_ops()
        .find_map(|op| match op {
            DrawOp::Image { w, h, .. } => Some((*w, *h)),
            _ => None,
        })
        .unwrap();
    assert!((w / h - 4.0).abs() < 0.01);
    assert!(w <= mm(28.0) + 0.01);
    assert!(h <= mm(35.0) + 0.01);
}

#[test]
fn emblem_without_logo_does_not_shift_the_header() {
    let emblem = data_uri("image/png", &png_bytes(64, 64));
    let logo = data_uri("image/jpeg", &jpeg_bytes(64, 64));

    let mut neither = minimal_bundle();
    neither.logo_image = None;
    let mut emblem_only = minimal_bundle();
    emblem_only.emblem_image = Some(emblem.clone());
    let mut both = minimal_bundle();
    both.logo_image = Some(logo);
    both.emblem_image = Some(emblem);

    let source = MemorySource::default();
    let neither = layout_report(&neither, &config(), &source).unwrap();
    let emblem_only = layout_report(&emblem_only, &config(), &source).unwrap();
    let both = layout_report(&both, &config(), &source).unwrap();

    assert_eq!(header_texts(&neither), header_texts(&emblem_only));
    assert_eq!(header_texts(&both), header_texts(&emblem_only));

    let g = PageGeometry::A4_PORTRAIT;
    let right = g.page_width - g.margin_right;
    let images = header_images(&emblem_only);
    assert_eq!(images.len(), 1);
    let (x, _, w, _) = images[0];
    assert!(x >= right - mm(22.0) - 0.01 && x + w <= right + 0.01, "emblem sits in the right box");
    assert_eq!(header_images(&both).len(), 2);
    assert!(header_images(&neither).is_empty());
}

#[test]
fn sniffed_format_wins_over_declared_mime() {
    let image = decode_encoded(&data_uri("image/jpeg", &png_bytes(4, 4))).unwrap();
    assert_eq!(image.format, ImageFormat::Png);
    let bare = decode_encoded(&data_uri("image/png", &jpeg_bytes(4, 4))[22..]).unwrap();
    assert_eq!(bare.format, ImageFormat::Jpeg);
    assert!(decode_encoded("data:image/gif;base64,R0lGODlhAQABAAAAACw=").is_err());
    assert!(decode_encoded("data:image/png,rawbytes").is_err());
}

#[test]
fn loader_returns_none_for_unloadable_references() {
    let source = MemorySource::default();
    let loader = ImageLoader::new(&source);
    assert!(loader.load(&None).is_none());
    assert!(loader.load(&Some("   ".to_string())).is_none());
    assert!(loader.load(&Some("/nope.png".to_string())).is_none());
    assert!(loader.load_person_photo(&Some("/nope.png".to_string())).is_some());

    let custom = Image::from_bytes(jpeg_bytes(8, 8), None).unwrap();
    let loader = ImageLoader::new(&source).with_placeholder(custom.clone());
    assert_eq!(loader.load_person_photo(&None), Some(custom));
}

#[test]
fn asset_source_resolves_against_its_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("photos")).unwrap();
    std::fs::write(dir.path().join("photos/p.png"), png_bytes(10, 10)).unwrap();

    let source = AssetSource::new(Some(dir.path().to_path_buf()));
    assert!(source.fetch("/photos/p.png").is_ok());
    assert!(source.fetch("photos/p.png").is_ok());
    assert!(source.fetch("photos/absent.png").is_err());
    assert!(source.fetch("https://example.com/p.png").is_err(), "remote is off by default");
}

#[test]
fn jpeg_signatures_are_embedded_as_is() {
    let signature = jpeg_bytes(120, 40);
    let mut bundle = minimal_bundle();
    bundle.case_details.officer_signature = Some(data_uri("image/jpeg", &signature));
    let report = layout_report(&bundle, &config(), &MemorySource::default()).unwrap();
    assert!(
        report
            .canvas
            .images()
            .iter()
            .any(|img| (img.pixel_width, img.pixel_height) == (120, 40))
    );
}
