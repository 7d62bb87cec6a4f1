use metaclean_core::models::upload::{file_extension, ALLOWED_EXTENSIONS};
use metaclean_core::{AppError, Config, UploadedFile};

/// Longest name written to a workspace. Leaves room for the `cleaned_` prefix within
/// the common 255-byte file name limit.
pub const MAX_FILENAME_LENGTH: usize = 247;

/// Trailing `.xyz` parts longer than this are not treated as an extension when
/// truncating.
const MAX_SUFFIX_LENGTH: usize = 16;

/// Upload validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("no file")]
    MissingFile,

    #[error("no file")]
    EmptyFilename,

    #[error("Invalid file extension: {extension:?} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: Option<String>,
        allowed: Vec<String>,
    },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Empty file")]
    EmptyFile,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingFile | ValidationError::EmptyFilename => {
                AppError::BadRequest(err.to_string())
            }
            ValidationError::EmptyFile => AppError::BadRequest("File is empty".to_string()),
            ValidationError::InvalidExtension { extension, allowed } => {
                AppError::UnsupportedType(format!(
                    "extension {:?} not in {}",
                    extension.unwrap_or_default(),
                    allowed.join(", ")
                ))
            }
            ValidationError::FileTooLarge { max, .. } => AppError::PayloadTooLarge(format!(
                "File size exceeds maximum allowed size of {} MB",
                max / 1024 / 1024
            )),
        }
    }
}

/// Upload policy: allowed extensions and size limit.
///
/// Every check here runs before anything touches the filesystem or the tool.
#[derive(Clone, Debug)]
pub struct UploadPolicy {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
}

impl UploadPolicy {
    pub fn new(max_file_size: usize, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_file_size_bytes, config.allowed_extensions.clone())
    }

    /// Images only (png, jpg, jpeg, gif) with the given size limit.
    pub fn images(max_file_size: usize) -> Self {
        Self::new(
            max_file_size,
            ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        )
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate file extension, returning it lower-cased.
    pub fn validate_extension(&self, filename: &str) -> Result<String, ValidationError> {
        self.check_extension(file_extension(filename))
    }

    fn check_extension(&self, extension: Option<String>) -> Result<String, ValidationError> {
        match extension {
            Some(ext) if self.allowed_extensions.contains(&ext) => Ok(ext),
            extension => Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            }),
        }
    }

    /// Validate file size
    pub fn validate_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Name, then extension, then size. Returns the validated extension.
    pub fn validate(&self, file: &UploadedFile) -> Result<String, ValidationError> {
        if file.name.is_empty() {
            return Err(ValidationError::EmptyFilename);
        }
        let extension = self.check_extension(file.extension())?;
        self.validate_size(file.size())?;
        Ok(extension)
    }
}

/// Reduce a caller-supplied filename to a single safe path component.
///
/// Directory parts are dropped, anything outside `[A-Za-z0-9._-]` becomes `_`,
/// leading dots/dashes/underscores and trailing dots/underscores are stripped.
/// Long names are cut to `MAX_FILENAME_LENGTH`, keeping a short trailing extension.
/// Never fails; an empty result becomes `file`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();

    let mapped: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = mapped
        .trim_start_matches(['.', '-', '_'])
        .trim_end_matches(['.', '_']);

    if trimmed.is_empty() {
        return "file".to_string();
    }

    // Only ASCII is left, so byte offsets are char boundaries.
    if trimmed.len() <= MAX_FILENAME_LENGTH {
        return trimmed.to_string();
    }
    let (stem, suffix) = match trimmed.rfind('.') {
        Some(i) if trimmed.len() - i <= MAX_SUFFIX_LENGTH => trimmed.split_at(i),
        _ => (trimmed, ""),
    };
    let stem = stem[..MAX_FILENAME_LENGTH - suffix.len()].trim_end_matches(['.', '_']);
    format!("{}{}", stem, suffix)
}

/// On-disk name for an upload: the sanitized name, guaranteed to end in `.{extension}`
/// so the tool can infer the format from the path as well as the content.
pub fn disk_name(filename: &str, extension: &str) -> String {
    let safe = sanitize_filename(filename);
    let suffix = format!(".{}", extension);
    if safe.to_lowercase().ends_with(&suffix) {
        return safe;
    }

    let room = MAX_FILENAME_LENGTH.saturating_sub(suffix.len());
    let stem = if safe.len() > room {
        safe[..room].trim_end_matches(['.', '_'])
    } else {
        safe.as_str()
    };
    format!("{}{}", stem, suffix)
}
