use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

const FALLBACK_NAME: &str = "upload";
/// Keeps the staged `upload-<random>-<name>` well under the 255 byte limit
/// most filesystems put on a single path component.
const MAX_STEM_BYTES: usize = 100;
const MAX_EXTENSION_BYTES: usize = 10;

/// Reduces a client-supplied filename to its final path component, keeping
/// only ASCII letters, digits, `-`, `_` and `.`. Whitespace becomes `_`. Long
/// names are cut down to their first bytes plus the extension.
pub fn sanitize_filename(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let joined = last.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cap_length(trimmed)
    }
}

fn cap_length(name: &str) -> String {
    let (stem, extension) = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_EXTENSION_BYTES => name.split_at(dot),
        _ => (name, ""),
    };
    if stem.len() <= MAX_STEM_BYTES {
        return name.to_string();
    }
    // ASCII only by now, so any byte index is a char boundary.
    format!("{}{extension}", &stem[..MAX_STEM_BYTES])
}

/// An upload staged on disk. The file is removed by [`TempUpload::cleanup`],
/// or on drop if cleanup is never reached.
#[derive(Debug)]
pub struct TempUpload {
    file: NamedTempFile,
}

impl TempUpload {
    pub fn persist(dir: &Path, sanitized_name: &str, bytes: &[u8]) -> std::io::Result<Self> {
        let suffix = format!("-{sanitized_name}");
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn cleanup(self) {
        let path = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => tracing::debug!(path = %path.display(), "removed temporary upload"),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to remove temporary upload");
            }
        }
    }
}
