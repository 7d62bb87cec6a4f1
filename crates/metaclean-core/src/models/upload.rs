//! Uploaded files and the extension allow-list

/// Extensions the cleaner accepts (lower case, no leading dot)
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// A file received in one request. Never persisted.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Name as supplied by the caller; not safe for filesystem use
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn extension(&self) -> Option<String> {
        file_extension(&self.name)
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Lower-cased text after the last dot, if the name has a dot at all.
///
/// `".png"` yields `Some("png")`, `"photo."` yields `Some("")`, `"photo"` yields `None`.
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}

pub fn is_allowed_extension(filename: &str, allowed: &[String]) -> bool {
    match file_extension(filename) {
        Some(ext) => allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<String> {
        ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extension_is_case_insensitive_suffix() {
        assert_eq!(file_extension("Photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(file_extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension("photo.").as_deref(), Some(""));
    }

    #[test]
    fn uploaded_file_extension_uses_supplied_name() {
        let file = UploadedFile::new("dir/Holiday.PNG", vec![1]);
        assert_eq!(file.extension().as_deref(), Some("png"));
        assert_eq!(UploadedFile::new("noext", vec![1]).extension(), None);
    }

    #[test]
    fn allow_list() {
        let allowed = defaults();
        for ok in ["a.png", "b.JPEG", "c.jpg", "d.Gif", ".png"] {
            assert!(is_allowed_extension(ok, &allowed), "{ok} should be allowed");
        }
        for bad in ["notes.txt", "setup.exe", "document.pdf", "noext", "photo.", "png"] {
            assert!(!is_allowed_extension(bad, &allowed), "{bad} should be rejected");
        }
    }
}
