use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use fir_report::{Error, Image, ReportBundle, ReportConfig};

#[derive(Parser, Debug)]
#[command(version, about = "Render a First Information Report bundle (JSON) to a paginated PDF")]
struct Args {
    /// Report bundle JSON file
    bundle: PathBuf,

    /// Output PDF file
    #[arg(short, long, conflicts_with = "out_dir")]
    output: Option<PathBuf>,

    /// Directory to write FIR_<number>_Report.pdf into (default: current directory)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Base directory for relative photo and signature references
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Organisation logo (PNG or JPEG), overrides the bundle's logoImage
    #[arg(long)]
    logo: Option<PathBuf>,

    /// National emblem (PNG or JPEG), overrides the bundle's emblemImage
    #[arg(long)]
    emblem: Option<PathBuf>,

    /// Photo used when a person photo is missing or unreadable
    #[arg(long)]
    placeholder: Option<PathBuf>,

    /// Organisation name printed in the header
    #[arg(long)]
    org: Option<String>,

    /// Line printed under the report title
    #[arg(long)]
    subtitle: Option<String>,

    /// Fetch http(s) photo and signature references
    #[arg(long)]
    remote_images: bool,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn read_branding(path: Option<&Path>) -> Option<Result<Vec<u8>, std::io::Error>> {
    path.map(|p| std::fs::read(p))
}

fn attach_branding(slot: &mut Option<String>, path: Option<&Path>, read: Option<Result<Vec<u8>, std::io::Error>>) {
    let (Some(path), Some(read)) = (path, read) else {
        return;
    };
    match read
        .map_err(|e| e.to_string())
        .and_then(|bytes| Image::from_bytes(bytes, None))
    {
        Ok(image) => *slot = Some(image.to_data_uri()),
        Err(e) => log::warn!("Ignoring {}: {e}", path.display()),
    }
}

fn run(args: Args) -> Result<PathBuf, Error> {
    // Bundle and branding images are independent reads
    let (bundle_json, logo, emblem) = std::thread::scope(|s| {
        let logo = s.spawn(|| read_branding(args.logo.as_deref()));
        let emblem = s.spawn(|| read_branding(args.emblem.as_deref()));
        let bundle_json = std::fs::read_to_string(&args.bundle);
        (
            bundle_json,
            logo.join().ok().flatten(),
            emblem.join().ok().flatten(),
        )
    });

    let mut bundle = ReportBundle::from_json(&bundle_json?)?;
    attach_branding(&mut bundle.logo_image, args.logo.as_deref(), logo);
    attach_branding(&mut bundle.emblem_image, args.emblem.as_deref(), emblem);

    let mut config = ReportConfig::from_env();
    if let Some(dir) = args.assets {
        config.asset_root = Some(dir);
    } else if config.asset_root.is_none() {
        config.asset_root = args.bundle.parent().map(Path::to_path_buf);
    }
    if let Some(path) = args.placeholder {
        config.placeholder_photo = Some(path);
    }
    if let Some(org) = args.org {
        config.organization = org;
    }
    if args.subtitle.is_some() {
        config.report_subtitle = args.subtitle;
    }
    config.remote_images |= args.remote_images;
    if config.remote_images && !cfg!(feature = "http") {
        return Err(Error::Config(
            "remote images requested but fir-report was built without the `http` feature".into(),
        ));
    }

    match args.output {
        Some(path) => {
            let report = fir_report::generate_report(&bundle, &config)?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &report.bytes)?;
            Ok(path)
        }
        None => {
            let dir = args.out_dir.unwrap_or_else(|| PathBuf::from("."));
            fir_report::write_report_file(&bundle, &config, &dir)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(args) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to generate FIR report: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
