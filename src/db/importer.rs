use super::{ARTIFACTS_DIR, LOG_TARGET};
use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use ohno::{IntoAppError, app_err, bail};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io;
use walkdir::WalkDir;

/// Number of hex digits of the content hash used as a result ID.
const RESULT_ID_LEN: usize = 12;

/// A run directory created by [`import_result`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedResult {
    pub result_dir: Utf8PathBuf,
    pub result_id: String,
    pub artifacts: usize,
}

/// A file to import and its name under the artifact tree.
#[derive(Debug)]
struct Source {
    path: Utf8PathBuf,
    name: Utf8PathBuf,
}

/// Files are imported under their own name, directories contribute every file
/// beneath them, keeping their paths relative to the directory.
fn collect_sources(paths: &[Utf8PathBuf]) -> Result<Vec<Source>> {
    let mut sources = Vec::new();

    for input in paths {
        let metadata = fs::metadata(input).into_app_err_with(|| format!("reading artifact path '{input}'"))?;

        if !metadata.is_dir() {
            let name = input.file_name().ok_or_else(|| app_err!("artifact path '{input}' has no file name"))?;
            sources.push(Source {
                path: input.clone(),
                name: Utf8PathBuf::from(name),
            });
            continue;
        }

        for entry in WalkDir::new(input).follow_links(true).sort_by_file_name() {
            let entry = entry.into_app_err_with(|| format!("walking '{input}'"))?;
            if entry.file_type().is_dir() {
                continue;
            }

            let path = Utf8PathBuf::from_path_buf(entry.into_path())
                .map_err(|p| app_err!("artifact path '{}' is not valid UTF-8", p.display()))?;
            let name = path
                .strip_prefix(input)
                .into_app_err_with(|| format!("artifact '{path}' is outside '{input}'"))?
                .to_path_buf();
            sources.push(Source { path, name });
        }
    }

    let mut names = BTreeSet::new();
    for source in &sources {
        if !names.insert(source.name.as_str()) {
            bail!("more than one artifact would be imported as '{}'", source.name);
        }
    }

    Ok(sources)
}

/// The SHA-256 of the concatenated SHA-256 digests of every file, as a short hex string.
fn result_id(sources: &[Source]) -> Result<String> {
    let mut combined = Sha256::new();

    for source in sources {
        let mut file = File::open(&source.path).into_app_err_with(|| format!("opening artifact '{}' for hashing", source.path))?;
        let mut hasher = Sha256::new();
        let _ = io::copy(&mut file, &mut hasher).into_app_err_with(|| format!("hashing artifact '{}'", source.path))?;
        combined.update(hasher.finalize());
    }

    let mut id = hex::encode(combined.finalize());
    id.truncate(RESULT_ID_LEN);
    Ok(id)
}

/// The run directory of `root` holding `result_id`, under any test name.
fn find_result(root: &Utf8Path, result_id: &str) -> Result<Option<Utf8PathBuf>> {
    for entry in root.read_dir_utf8().into_app_err_with(|| format!("opening database root '{root}'"))? {
        let entry = entry.into_app_err_with(|| format!("listing database root '{root}'"))?;
        if entry.file_name().rsplit_once(':').is_some_and(|(_, id)| id == result_id) {
            return Ok(Some(entry.into_path()));
        }
    }
    Ok(None)
}

/// Copy artifacts into a new run directory of the database at `root`.
///
/// The result ID is derived from the artifact contents and must be unique in the
/// database, so importing the same files twice fails under any test name.
///
/// # Errors
///
/// Returns an error for an invalid test name, a missing database root, an
/// unreadable artifact, clashing artifact names, or a result ID already in use.
pub fn import_result(root: &Utf8Path, test_name: &str, paths: &[Utf8PathBuf]) -> Result<ImportedResult> {
    if test_name.is_empty() || test_name.contains([':', '/', '\\']) {
        bail!("invalid test name '{test_name}' (must be non-empty, without ':' or path separators)");
    }
    if paths.is_empty() {
        bail!("at least one artifact path must be provided");
    }
    if !root.is_dir() {
        bail!("database root '{root}' is not a directory");
    }

    let sources = collect_sources(paths)?;
    let result_id = result_id(&sources)?;
    if let Some(existing) = find_result(root, &result_id)? {
        bail!("result '{result_id}' already exists as '{existing}'");
    }

    let result_dir = root.join(format!("{test_name}:{result_id}"));

    fs::create_dir(&result_dir).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => app_err!("result directory '{result_dir}' already exists"),
        _ => app_err!("creating result directory '{result_dir}': {e}"),
    })?;

    let artifacts_dir = result_dir.join(ARTIFACTS_DIR);
    for source in &sources {
        let dest = artifacts_dir.join(&source.name);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).into_app_err_with(|| format!("creating directory '{parent}'"))?;
        }
        let _ = fs::copy(&source.path, &dest).into_app_err_with(|| format!("copying artifact '{}' to '{dest}'", source.path))?;
    }

    log::info!(target: LOG_TARGET, "Imported {} artifacts to '{result_dir}'", sources.len());

    Ok(ImportedResult {
        result_dir,
        result_id,
        artifacts: sources.len(),
    })
}
