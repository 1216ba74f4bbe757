// Storage listings: a local mirror of the storage tree, or a JSON manifest

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use docreg_recon::{DisciplineCatalog, ProjectContext, StorageFile};

/// Extension → MIME type for the document kinds found in project storage.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "pdf" => "application/pdf",
        "dwg" => "image/vnd.dwg",
        "dxf" => "image/vnd.dxf",
        "ifc" => "application/x-step",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "zip" => "application/zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

fn extension_allowed(filename: &str, allowed: &[String]) -> bool {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Local mirror
// ---------------------------------------------------------------------------

/// Breadth-first walk from `root`. Hidden entries are skipped; each file's
/// `id` is its `/`-separated path relative to `root`.
pub fn list_folder(
    root: &Path,
    allowed: &[String],
    context: &ProjectContext,
    catalog: &DisciplineCatalog,
) -> Result<Vec<StorageFile>, String> {
    if !root.is_dir() {
        return Err(format!("{}: storage root is not a directory", root.display()));
    }

    let mut files = Vec::new();
    let mut queue: VecDeque<(PathBuf, Vec<String>)> = VecDeque::new();
    queue.push_back((root.to_path_buf(), Vec::new()));

    while let Some((dir, folders)) = queue.pop_front() {
        let mut entries: Vec<(String, PathBuf, bool)> = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| format!("{}: {e}", dir.display()))? {
            let entry = entry.map_err(|e| format!("{}: {e}", dir.display()))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let is_dir = entry
                .file_type()
                .map_err(|e| format!("{}: {e}", entry.path().display()))?
                .is_dir();
            entries.push((name, entry.path(), is_dir));
        }
        // read_dir order is platform-dependent
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        for (name, path, is_dir) in entries {
            if is_dir {
                let mut child = folders.clone();
                child.push(name);
                queue.push_back((path, child));
                continue;
            }
            if !extension_allowed(&name, allowed) {
                continue;
            }

            let mut id_parts = folders.clone();
            id_parts.push(name.clone());
            let id = id_parts.join("/");
            let ext = name.rsplit_once('.').map(|(_, e)| e).unwrap_or("");

            files.push(StorageFile::with_catalog(
                catalog,
                &name,
                &id,
                mime_for_extension(ext),
                folders.clone(),
                context,
            ));
        }
    }

    log::info!("{}: {} storage files", root.display(), files.len());
    Ok(files)
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// One entry of a listing exported from the storage API.
#[derive(Debug, Deserialize)]
struct ManifestEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "mimeType")]
    mime_type: Option<String>,
    #[serde(default)]
    path: Vec<String>,
}

pub fn read_manifest(
    path: &Path,
    allowed: &[String],
    context: &ProjectContext,
    catalog: &DisciplineCatalog,
) -> Result<Vec<StorageFile>, String> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let files = parse_manifest(&content, allowed, context, catalog)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    log::info!("{}: {} storage files", path.display(), files.len());
    Ok(files)
}

/// Parse a JSON array of `{ name, id, mimeType, path }`. Entries missing a
/// name or id are skipped, as are extensions outside the allow-list.
pub fn parse_manifest(
    content: &str,
    allowed: &[String],
    context: &ProjectContext,
    catalog: &DisciplineCatalog,
) -> Result<Vec<StorageFile>, String> {
    let entries: Vec<ManifestEntry> =
        serde_json::from_str(content).map_err(|e| format!("invalid manifest: {e}"))?;

    let mut files = Vec::new();
    for (idx, entry) in entries.into_iter().enumerate() {
        let (Some(name), Some(id)) = (entry.name, entry.id) else {
            log::warn!("manifest entry {idx} has no name or id, skipped");
            continue;
        };
        let name = name.trim().to_string();
        if !extension_allowed(&name, allowed) {
            continue;
        }
        let mime_type = entry.mime_type.unwrap_or_else(|| {
            let ext = name.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
            mime_for_extension(ext).to_string()
        });
        files.push(StorageFile::with_catalog(catalog, &name, &id, &mime_type, entry.path, context));
    }
    Ok(files)
}
