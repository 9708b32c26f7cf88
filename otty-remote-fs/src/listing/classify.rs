/// Opaque icon key resolved by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconHandle(String);

impl IconHandle {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Display label and icon derived from an entry name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileType {
    label: String,
    icon: IconHandle,
}

impl FileType {
    pub fn new(label: impl Into<String>, icon: IconHandle) -> Self {
        Self {
            label: label.into(),
            icon,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn icon(&self) -> &IconHandle {
        &self.icon
    }
}

/// Resolves file type information from entry names.
///
/// Called once per file when a listing is applied; the result is cached on
/// the entry.
pub trait FileTypeClassifier {
    /// Classify a regular file by name.
    fn classify(&self, name: &str) -> FileType;

    /// Type shown for every directory row.
    fn directory_type(&self) -> FileType {
        FileType::new("Folder", IconHandle::new("folder"))
    }
}

/// Classifier that derives the type from the file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionClassifier;

impl FileTypeClassifier for ExtensionClassifier {
    fn classify(&self, name: &str) -> FileType {
        match extension(name) {
            Some(ext) => FileType::new(
                format!("{} File", ext.to_uppercase()),
                IconHandle::new(ext.to_lowercase()),
            ),
            None => FileType::new("File", IconHandle::new("file")),
        }
    }
}

fn extension(name: &str) -> Option<&str> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }

    Some(ext)
}

#[cfg(test)]
mod tests {
    use super::{ExtensionClassifier, FileTypeClassifier};

    #[test]
    fn given_name_with_extension_when_classified_then_label_uses_extension() {
        let file_type = ExtensionClassifier.classify("report.Pdf");

        assert_eq!(file_type.label(), "PDF File");
        assert_eq!(file_type.icon().as_str(), "pdf");
    }

    #[test]
    fn given_name_without_extension_when_classified_then_generic_type_is_used()
    {
        for name in ["Makefile", ".bashrc", "trailing."] {
            let file_type = ExtensionClassifier.classify(name);
            assert_eq!(file_type.label(), "File", "{name}");
        }
    }
}
