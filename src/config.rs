use std::path::PathBuf;

use chrono::NaiveDateTime;

pub const MM: f32 = 72.0 / 25.4;

/// Millimetres to PDF points.
pub const fn mm(v: f32) -> f32 {
    v * MM
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Distance of the page border from the paper edge.
    pub border_inset: f32,
}

impl PageGeometry {
    pub const A4_PORTRAIT: PageGeometry = PageGeometry {
        page_width: mm(210.0),
        page_height: mm(297.0),
        margin_top: mm(15.0),
        margin_bottom: mm(15.0),
        margin_left: mm(15.0),
        margin_right: mm(15.0),
        border_inset: mm(6.0),
    };

    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Cursor position at the top of an empty page.
    pub fn top(&self) -> f32 {
        self.page_height - self.margin_top
    }

    /// Lowest y any content line may reach.
    pub fn bottom(&self) -> f32 {
        self.margin_bottom
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry::A4_PORTRAIT
    }
}

#[derive(Clone, Debug)]
pub struct ReportConfig {
    pub page: PageGeometry,
    pub organization: String,
    pub report_title: String,
    /// Optional legal line under the title, e.g. the statute the FIR is filed under.
    pub report_subtitle: Option<String>,
    /// Base directory for relative photo/signature references.
    pub asset_root: Option<PathBuf>,
    /// Replaces the built-in silhouette used when a person photo cannot be loaded.
    pub placeholder_photo: Option<PathBuf>,
    /// Allow http(s) references (needs the `http` feature).
    pub remote_images: bool,
    /// Timestamp printed in the footer. `None` uses the local clock.
    pub generated_at: Option<NaiveDateTime>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            page: PageGeometry::default(),
            organization: "POLICE DEPARTMENT".to_string(),
            report_title: "FIRST INFORMATION REPORT".to_string(),
            report_subtitle: None,
            asset_root: None,
            placeholder_photo: None,
            remote_images: false,
            generated_at: None,
        }
    }
}

impl ReportConfig {
    /// Defaults overridden by `FIR_REPORT_*` environment variables.
    pub fn from_env() -> Self {
        let mut cfg = ReportConfig::default();
        if let Some(dir) = env_value("FIR_REPORT_ASSETS") {
            cfg.asset_root = Some(PathBuf::from(dir));
        }
        if let Some(path) = env_value("FIR_REPORT_PLACEHOLDER") {
            cfg.placeholder_photo = Some(PathBuf::from(path));
        }
        if let Some(org) = env_value("FIR_REPORT_ORG") {
            cfg.organization = org;
        }
        if let Some(flag) = env_value("FIR_REPORT_REMOTE_IMAGES") {
            cfg.remote_images = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        cfg
    }

    pub(crate) fn generated_at(&self) -> NaiveDateTime {
        self.generated_at
            .unwrap_or_else(|| chrono::Local::now().naive_local())
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
