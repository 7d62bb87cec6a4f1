//! Metadata reports as printed by the extraction tool

use std::fmt;

/// Wire value of a report with no lines
pub const NO_METADATA: &str = "No metadata";

/// Ordered text lines, one fact per line, in the order the extraction tool printed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataReport {
    raw: String,
}

impl MetadataReport {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap raw tool stdout. Whitespace-only output counts as empty.
    pub fn from_tool_output(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.trim().is_empty() {
            Self::empty()
        } else {
            Self { raw }
        }
    }

    /// Parse the text carried in a JSON response, mapping the sentinel back to empty.
    pub fn from_wire(text: &str) -> Self {
        if text == NO_METADATA {
            Self::empty()
        } else {
            Self::from_tool_output(text)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.raw.lines()
    }

    /// Text sent to callers: the raw output, or the sentinel when empty.
    pub fn as_wire_text(&self) -> &str {
        if self.is_empty() {
            NO_METADATA
        } else {
            &self.raw
        }
    }

    /// `Tag : value` pairs in `exiftool -s` layout. Lines without a colon are skipped.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines().filter_map(|line| {
            let (tag, value) = line.split_once(':')?;
            let tag = tag.trim();
            if tag.is_empty() {
                return None;
            }
            Some((tag, value.trim()))
        })
    }

    pub fn field(&self, tag: &str) -> Option<&str> {
        self.fields().find(|(t, _)| *t == tag).map(|(_, v)| v)
    }
}

impl fmt::Display for MetadataReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "FileName                        : photo.jpg\n\
                          Model                           : Canon EOS 5D\n\
                          GPSPosition                     : 48 deg 51' 30.24\" N, 2 deg 17' 40.20\" E\n";

    #[test]
    fn empty_output_renders_sentinel() {
        let report = MetadataReport::from_tool_output("  \n");
        assert!(report.is_empty());
        assert_eq!(report.as_wire_text(), NO_METADATA);
        assert_eq!(report.lines().count(), 0);
    }

    #[test]
    fn sentinel_on_the_wire_is_empty() {
        assert!(MetadataReport::from_wire(NO_METADATA).is_empty());
        assert!(!MetadataReport::from_wire("Model: X").is_empty());
    }

    #[test]
    fn preserves_line_order() {
        let report = MetadataReport::from_tool_output(SAMPLE);
        let tags: Vec<&str> = report.fields().map(|(t, _)| t).collect();
        assert_eq!(tags, vec!["FileName", "Model", "GPSPosition"]);
        assert_eq!(report.as_wire_text(), SAMPLE);
    }

    #[test]
    fn field_lookup_splits_on_first_colon() {
        let report = MetadataReport::from_tool_output(SAMPLE);
        assert_eq!(report.field("Model"), Some("Canon EOS 5D"));
        assert_eq!(
            report.field("GPSPosition"),
            Some("48 deg 51' 30.24\" N, 2 deg 17' 40.20\" E")
        );
        assert_eq!(report.field("Make"), None);
    }
}
