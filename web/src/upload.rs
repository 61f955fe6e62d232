//! Upload validation and on-disk storage.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

/// Extensions accepted for upload, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Lowercased text after the last `.`, if any.
pub fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Whether `filename` carries one of the [`ALLOWED_EXTENSIONS`].
pub fn allowed_file(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Reduce a client supplied name to a safe flat file name.
///
/// The name is NFKD-normalized and whatever is still non-ASCII is dropped.
/// `/` and whitespace runs become `_`, anything outside `[A-Za-z0-9_.-]`
/// (including `\`) is removed and leading or trailing `.`/`_` are
/// stripped. The result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Name to store an upload under.
///
/// Uses [`secure_filename`] unless that loses the allowed extension (a name
/// written only in kana, for instance), in which case a random name with the
/// original extension is generated.
pub fn storage_name(filename: &str) -> Option<String> {
    let ext = extension(filename).filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))?;
    let secured = secure_filename(filename);

    if allowed_file(&secured) {
        Some(secured)
    } else {
        Some(format!("{}.{}", uuid::Uuid::new_v4(), ext))
    }
}

/// Directory that uploaded images are written to and served from.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Write `bytes` under `name`, replacing any previous file of that name.
    pub async fn save(&self, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        self.ensure_dir().await?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Read a previously stored upload.
    ///
    /// Only flat names that [`secure_filename`] leaves unchanged are looked
    /// up, so the path cannot escape the upload directory.
    pub async fn read(&self, name: &str) -> std::io::Result<Vec<u8>> {
        if name.is_empty() || secure_filename(name) != name {
            return Err(std::io::Error::new(
                ErrorKind::NotFound,
                format!("{} is not a stored file name", name),
            ));
        }
        tokio::fs::read(self.dir.join(name)).await
    }

    /// Create and remove a probe file to confirm the directory is writable.
    pub async fn check_writable(&self) -> std::io::Result<()> {
        self.ensure_dir().await?;
        let probe = self.dir.join(".write-test");
        tokio::fs::write(&probe, b"test").await?;
        tokio::fs::remove_file(&probe).await
    }
}

/// `Content-Type` for a stored upload.
pub fn content_type(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("kana.png"));
        assert!(allowed_file("KANA.JPG"));
        assert!(allowed_file("scan.final.jpeg"));
        assert!(!allowed_file("kana.gif"));
        assert!(!allowed_file("png"));
        assert!(!allowed_file("kana."));
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My cool kana.png"), "My_cool_kana.png");
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("..\\windows\\kana.jpg"), "windowskana.jpg");
        assert_eq!(secure_filename("café.png"), "cafe.png");
        assert_eq!(secure_filename("ｋａｎａ１.png"), "kana1.png");
        assert_eq!(secure_filename("_hidden.png"), "hidden.png");
        assert_eq!(secure_filename("き.png"), "png");
        assert_eq!(secure_filename("..."), "");
    }

    #[test]
    fn test_storage_name() {
        assert_eq!(storage_name("a b.PNG").as_deref(), Some("a_b.PNG"));
        assert_eq!(storage_name("ｋａｎａ１.png").as_deref(), Some("kana1.png"));
        assert_eq!(storage_name("kana.txt"), None);

        let generated = storage_name("お.jpeg").unwrap();
        assert!(generated.ends_with(".jpeg"));
        assert_eq!(generated.len(), 36 + ".jpeg".len());
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type("a.png"), "image/png");
        assert_eq!(content_type("a.JPEG"), "image/jpeg");
        assert_eq!(content_type("a"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_save_and_read() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path().join("nested/uploads"));

        let path = store.save("kana.png", b"bytes").await.unwrap();
        assert!(path.starts_with(store.dir()));
        assert_eq!(store.read("kana.png").await.unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn test_read_rejects_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path());

        let err = store.read("../secret.png").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_check_writable_leaves_no_probe() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path());

        store.check_writable().await.unwrap();
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
