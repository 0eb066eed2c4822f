use std::fmt::Display;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tokio::fs;

/// URL prefix under which stored documents are served, and the leading
/// component of every stored path.
pub const UPLOADS_PREFIX: &str = "uploads";

/// Category of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Resume, DocumentKind::CoverLetter];

    /// Directory (relative to the upload root) holding this kind.
    pub fn directory(self) -> &'static str {
        match self {
            DocumentKind::Resume => "resumes",
            DocumentKind::CoverLetter => "cover_letters",
        }
    }

    /// Suffix used in stored file names.
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CoverLetter => "cover_letter",
        }
    }
}

/// Local-disk store for uploaded resumes and cover letters.
///
/// Files land at `{root}/{kind-directory}/{owner}_{kind}{ext}` and are
/// recorded as `uploads/{kind-directory}/{owner}_{kind}{ext}`.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the per-kind directories.
    pub async fn ensure_layout(&self) -> Result<(), StorageError> {
        for kind in DocumentKind::ALL {
            let dir = self.root.join(kind.directory());
            fs::create_dir_all(&dir)
                .await
                .map_err(|source| StorageError::Io { path: dir, source })?;
        }
        Ok(())
    }

    /// Write a document for `owner`, replacing any earlier one of the same kind.
    pub async fn store(
        &self,
        kind: DocumentKind,
        original_filename: &str,
        data: &[u8],
        owner: impl Display,
    ) -> Result<String, StorageError> {
        let file_name = format!(
            "{}_{}{}",
            owner,
            kind.label(),
            file_extension(original_filename)
        );
        let dir = self.root.join(kind.directory());
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| StorageError::Io {
                path: dir.clone(),
                source,
            })?;

        let full_path = dir.join(&file_name);
        tracing::debug!(path = %full_path.display(), size = data.len(), "writing document");
        fs::write(&full_path, data)
            .await
            .map_err(|source| StorageError::Io {
                path: full_path,
                source,
            })?;

        Ok(format!("{UPLOADS_PREFIX}/{}/{file_name}", kind.directory()))
    }

    /// Remove a stored document. A missing file is not an error.
    pub async fn delete(&self, stored_path: &str) -> Result<(), StorageError> {
        let full_path = self.resolve(stored_path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                tracing::debug!(path = %full_path.display(), "removed document");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                path: full_path,
                source,
            }),
        }
    }

    /// Map a stored path back onto the upload root, refusing anything that
    /// escapes it.
    pub fn resolve(&self, stored_path: &str) -> Result<PathBuf, StorageError> {
        let relative = stored_path
            .strip_prefix(UPLOADS_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StorageError::InvalidPath(stored_path.to_string()))?;

        let relative = Path::new(relative);
        let only_normal = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !only_normal || relative.as_os_str().is_empty() {
            return Err(StorageError::InvalidPath(stored_path.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

/// Extension of the final path component, leading dot included, or `""`.
fn file_extension(original_filename: &str) -> &str {
    let name = original_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_filename);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[idx..],
        _ => "",
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to touch path outside the upload directory: {0}")]
    InvalidPath(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("resume.pdf"), ".pdf");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("README"), "");
        assert_eq!(file_extension(".bashrc"), "");
        assert_eq!(file_extension(""), "");
        assert_eq!(file_extension("C:\\Users\\me\\cv.DOCX"), ".DOCX");
        assert_eq!(file_extension("dir.d/letter"), "");
    }

    #[tokio::test]
    async fn test_store_names_file_after_owner_and_kind() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path());

        let path = store
            .store(DocumentKind::Resume, "resume.pdf", b"v1", 42)
            .await
            .unwrap();

        assert_eq!(path, "uploads/resumes/42_resume.pdf");
        assert!(path.ends_with("42_resume.pdf"));
        let on_disk = temp.path().join("resumes/42_resume.pdf");
        assert_eq!(std::fs::read(on_disk).unwrap(), b"v1");
    }

    #[tokio::test]
    async fn test_store_overwrites_same_owner_and_kind() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path());

        store
            .store(DocumentKind::Resume, "resume.pdf", b"first", 42)
            .await
            .unwrap();
        let path = store
            .store(DocumentKind::Resume, "resume.pdf", b"second", 42)
            .await
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(temp.path().join("resumes"))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(std::fs::read(store.resolve(&path).unwrap()).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_cover_letter_without_extension() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path());

        let path = store
            .store(DocumentKind::CoverLetter, "letter", b"hi", "abc")
            .await
            .unwrap();
        assert_eq!(path, "uploads/cover_letters/abc_cover_letter");
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_noop() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path());

        store.delete("uploads/resumes/nope_resume.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path());

        let path = store
            .store(DocumentKind::Resume, "cv.pdf", b"data", 7)
            .await
            .unwrap();
        store.delete(&path).await.unwrap();
        assert!(!temp.path().join("resumes/7_resume.pdf").exists());
    }

    #[test]
    fn test_resolve_rejects_escapes() {
        let store = DocumentStore::new("/srv/uploads");
        assert!(store.resolve("uploads/../etc/passwd").is_err());
        assert!(store.resolve("/etc/passwd").is_err());
        assert!(store.resolve("uploads/").is_err());
        assert!(store.resolve("uploadsx/resumes/a").is_err());
        assert_eq!(
            store.resolve("uploads/resumes/a.pdf").unwrap(),
            PathBuf::from("/srv/uploads/resumes/a.pdf")
        );
    }
}
