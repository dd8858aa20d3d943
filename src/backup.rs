use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const STORE_ENTRY: &str = "store/attendance.csv";
const STORE_HEADER_LINE: &str = "Name,Date,Status";
pub const BUNDLE_FORMAT_V1: &str = "attendance-store-v1";
pub const LEGACY_CSV_FORMAT: &str = "legacy-csv";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
    pub sha256: String,
    pub record_count: usize,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Writes `store_path` into a zip bundle at `out_path` together with a
/// manifest carrying the store checksum.
pub fn export_store_bundle(store_path: &Path, out_path: &Path) -> anyhow::Result<ExportSummary> {
    if !store_path.is_file() {
        return Err(anyhow!(
            "attendance store not found: {}",
            store_path.to_string_lossy()
        ));
    }
    let store_bytes = std::fs::read(store_path)
        .with_context(|| format!("failed to read store {}", store_path.to_string_lossy()))?;
    let checksum = sha256_hex(&store_bytes);
    // Header line excluded.
    let record_count = store_bytes
        .split(|b| *b == b'\n')
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .count()
        .saturating_sub(1);

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": exported_at,
        "storeSha256": checksum,
        "recordCount": record_count,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(STORE_ENTRY, opts)
        .context("failed to start store entry")?;
    zip.write_all(&store_bytes)
        .context("failed to write store entry")?;

    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        entry_count: 2,
        sha256: checksum,
        record_count,
    })
}

/// Replaces `store_path` with the store held in `in_path`.
///
/// A zip bundle must carry a matching checksum. A bare CSV starting with the
/// store header is copied as-is.
pub fn import_store_bundle(in_path: &Path, store_path: &Path) -> anyhow::Result<ImportSummary> {
    if let Some(parent) = store_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create workspace {}", parent.to_string_lossy()))?;
    }

    let (bytes, format) = if is_zip_file(in_path)? {
        (read_bundle_store(in_path)?, BUNDLE_FORMAT_V1)
    } else {
        if !has_store_header(in_path)? {
            return Err(anyhow!(
                "not an attendance bundle or store file: {}",
                in_path.to_string_lossy()
            ));
        }
        let bytes = std::fs::read(in_path)
            .with_context(|| format!("failed to read {}", in_path.to_string_lossy()))?;
        (bytes, LEGACY_CSV_FORMAT)
    };

    let tmp_dst = store_path.with_extension("csv.importing");
    let mut out = File::create(&tmp_dst).with_context(|| {
        format!(
            "failed to create temp store {}",
            tmp_dst.to_string_lossy()
        )
    })?;
    out.write_all(&bytes)
        .and_then(|_| out.flush())
        .context("failed to write extracted store")?;
    drop(out);

    std::fs::rename(&tmp_dst, store_path).with_context(|| {
        format!(
            "failed to move extracted store to {}",
            store_path.to_string_lossy()
        )
    })?;

    Ok(ImportSummary {
        bundle_format_detected: format.to_string(),
    })
}

fn read_bundle_store(in_path: &Path) -> anyhow::Result<Vec<u8>> {
    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }
    let expected = manifest
        .get("storeSha256")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let mut bytes = Vec::new();
    archive
        .by_name(STORE_ENTRY)
        .context("bundle missing store/attendance.csv")?
        .read_to_end(&mut bytes)
        .context("failed to extract store entry")?;

    let actual = sha256_hex(&bytes);
    if actual != expected {
        return Err(anyhow!(
            "store checksum mismatch: manifest {}, bundle {}",
            expected,
            actual
        ));
    }
    Ok(bytes)
}

fn has_store_header(path: &Path) -> anyhow::Result<bool> {
    let f = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.to_string_lossy()))?;
    let mut first = String::new();
    BufReader::new(f)
        .read_line(&mut first)
        .context("failed to read first line")?;
    Ok(first.trim_start_matches('\u{feff}').trim_end() == STORE_HEADER_LINE)
}

fn is_zip_file(path: &Path) -> anyhow::Result<bool> {
    let mut f = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.to_string_lossy()))?;
    let mut sig = [0u8; 4];
    let read = f.read(&mut sig).context("failed to read file signature")?;
    if read < 4 {
        return Ok(false);
    }
    Ok(sig == [0x50, 0x4B, 0x03, 0x04])
}
