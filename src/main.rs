//! CLI for jpeg-markers: list the marker segments of JPEG files or URLs.

#![cfg(feature = "cli")]

use clap::Parser;
use indexmap::IndexMap;
use jpeg_markers::load::{is_url, load};
use jpeg_markers::{scan, ScanError, ScanOptions, ScanReport, UnknownMarkerPolicy};
use log::{info, LevelFilter};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use walkdir::WalkDir;

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[derive(Parser)]
#[command(name = "jpeg-markers")]
#[command(about = "List the marker segments of a JPEG file (local path or http(s) URL)", long_about = None)]
struct Args {
    /// Path or URL of the JPEG to parse
    path: Option<String>,

    /// Path or URL of the JPEG to parse (same as the positional argument)
    #[arg(short = 'p', long = "path", value_name = "PATH", conflicts_with = "path")]
    path_flag: Option<String>,

    /// Scan every JPEG in a directory (optionally with -r to recurse into subdirectories)
    #[arg(short = 'd', long = "directory", value_name = "DIR")]
    directory: Option<String>,

    /// When scanning a directory, recurse into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// File extensions to scan in directory mode (comma-separated)
    #[arg(short, long, default_value = "jpg,jpeg,jpe,jfif")]
    extensions: String,

    /// Fail on unknown marker codes instead of recording and skipping them
    #[arg(long)]
    strict: bool,

    /// Only report whether the image uses restart markers
    #[arg(long)]
    restart_only: bool,

    /// Download timeout in seconds
    #[arg(long, default_value_t = 180)]
    timeout: u64,

    /// Output JSON per input (one line per input unless --pretty)
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON (use with --json)
    #[arg(long)]
    pretty: bool,

    /// Quiet: only errors are logged
    #[arg(short, long)]
    quiet: bool,

    /// Verbose: log every decoded segment
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
}

impl Args {
    fn scan_options(&self) -> ScanOptions {
        let policy = if self.strict {
            UnknownMarkerPolicy::Strict
        } else {
            UnknownMarkerPolicy::Permissive
        };
        ScanOptions::new().with_unknown_markers(policy)
    }

    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    let options = args.scan_options();

    if let Some(dir) = args.directory.as_deref() {
        let path = Path::new(dir);
        if !path.is_dir() {
            return Err(format!("--directory expects a directory: {}", path.display()).into());
        }
        return scan_dir(path, &args, &options);
    }

    let target = args
        .path_flag
        .as_deref()
        .or(args.path.as_deref())
        .ok_or("no path was provided: give a file/URL as argument, -p <PATH> or -d <DIR>")?;
    if !is_url(target) && !Path::new(target).is_file() {
        return Err(format!("not a file: {}", target).into());
    }
    let bytes = load(target, Duration::from_secs(args.timeout))?;
    let result = scan(&bytes, &options);
    print_result(target, &result, &args, &bytes)?;
    result?;
    Ok(())
}

fn scan_dir(dir: &Path, args: &Args, options: &ScanOptions) -> Result<(), Box<dyn std::error::Error>> {
    let exts: HashSet<String> = args
        .extensions
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    let walker = if args.recursive {
        WalkDir::new(dir).into_iter()
    } else {
        WalkDir::new(dir).max_depth(1).into_iter()
    };

    info!(
        "scanning directory: {}{}",
        dir.display(),
        if args.recursive { " (recursive)" } else { "" }
    );

    let mut total = 0u64;
    let mut failed = 0u64;
    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if !exts.is_empty() && !exts.contains(&ext) {
            continue;
        }
        total += 1;
        let bytes = match load(&path.display().to_string(), Duration::from_secs(args.timeout)) {
            Ok(b) => b,
            Err(e) => {
                log::error!("{}", e);
                failed += 1;
                continue;
            }
        };
        let result = scan(&bytes, options);
        if result.is_err() {
            failed += 1;
        }
        print_result(&path.display().to_string(), &result, args, &bytes)?;
    }

    info!("scanned {} files, {} failed", total, failed);
    Ok(())
}

/// JSON object for one input: sha256, path, size, restart flag, then (unless
/// `restart_only`) termination, markers and warnings; `error` replaces the scan
/// fields when the scan failed.
fn json_record(
    path: &str,
    result: &Result<ScanReport, ScanError>,
    bytes: &[u8],
    restart_only: bool,
) -> Result<IndexMap<String, serde_json::Value>, serde_json::Error> {
    let mut out = IndexMap::<String, serde_json::Value>::new();
    out.insert("sha256".to_string(), serde_json::Value::String(sha256_hex(bytes)));
    out.insert("path".to_string(), serde_json::Value::String(path.to_string()));
    out.insert("size_bytes".to_string(), serde_json::to_value(bytes.len())?);
    match result {
        Ok(report) => {
            out.insert(
                "has_restart_markers".to_string(),
                serde_json::Value::Bool(report.has_restart_markers()),
            );
            if !restart_only {
                out.insert("termination".to_string(), serde_json::to_value(report.termination)?);
                out.insert("markers".to_string(), serde_json::to_value(&report.markers)?);
                out.insert("warnings".to_string(), serde_json::to_value(&report.warnings)?);
            }
        }
        Err(e) => {
            out.insert("error".to_string(), serde_json::Value::String(e.to_string()));
        }
    }
    Ok(out)
}

fn print_result(
    path: &str,
    result: &Result<ScanReport, ScanError>,
    args: &Args,
    bytes: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    if args.json {
        let out = json_record(path, result, bytes, args.restart_only)?;
        let json_str = if args.pretty {
            serde_json::to_string_pretty(&out)?
        } else {
            serde_json::to_string(&out)?
        };
        println!("{}", json_str);
        return Ok(());
    }

    let report = match result {
        Ok(r) => r,
        Err(e) => {
            log::error!("{}: {}", path, e);
            return Ok(());
        }
    };
    if args.restart_only {
        println!(
            "{}: {}",
            path,
            if report.has_restart_markers() {
                "restart markers present"
            } else {
                "no restart markers"
            }
        );
        return Ok(());
    }
    if args.directory.is_some() {
        println!("{} ({} bytes, sha256 {})", path, bytes.len(), sha256_hex(bytes));
    }
    for m in &report.markers {
        println!("offset: {:6x} - {}", m.offset, m.description);
    }
    for w in &report.warnings {
        log::warn!("{}: {}", path, w);
    }
    Ok(())
}
