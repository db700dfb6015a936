//! Utilities (local file download, clipboard access, unicode helpers).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

pub mod unicode;

/// Write the editor contents to `dir/file_name`, creating `dir` if needed.
/// An existing file with the same name is overwritten.
pub fn save_download(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    if file_name.is_empty() || file_name.contains(['/', '\\']) {
        bail!("invalid download file name '{}'", file_name);
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create download directory '{}'", dir.display()))?;
    let path = dir.join(file_name);
    fs::write(&path, contents).with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(path)
}

/// Copy text verbatim to the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;
    clipboard
        .set_text(text.to_string())
        .context("failed to set clipboard contents")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_download_writes_exact_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_download(dir.path(), "code.c", "int main(){}").unwrap();
        assert_eq!(path, dir.path().join("code.c"));
        assert_eq!(fs::read_to_string(path).unwrap(), "int main(){}");
    }

    #[test]
    fn test_save_download_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("downloads");
        save_download(&nested, "code.python", "print(1)").unwrap();
        let path = save_download(&nested, "code.python", "print(2)").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "print(2)");
    }

    #[test]
    fn test_save_download_rejects_path_separators() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_download(dir.path(), "../code.c", "").is_err());
        assert!(save_download(dir.path(), "", "").is_err());
    }
}
