//! Leaf type classification.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::record::FileRecord;

/// Tag used by tree widgets to pick an icon.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Folder,
    Html,
    Image,
    Csv,
    Text,
    Json,
    Yaml,
    /// No rule matched.
    #[default]
    #[strum(serialize = "")]
    #[serde(rename = "")]
    Unclassified,
}

impl FileType {
    /// The tag as it appears in serialized trees.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Check if this is the folder tag.
    pub fn is_folder(self) -> bool {
        self == FileType::Folder
    }
}

/// Classify a leaf by content type, then by file extension.
pub fn classify_type(record: &FileRecord) -> FileType {
    record
        .content_type
        .as_deref()
        .and_then(|content_type| tag_for_content_type(mime_essence(content_type)))
        .or_else(|| {
            let (_, extension) = record.display_name().rsplit_once('.')?;
            tag_for_extension(extension)
        })
        .unwrap_or(FileType::Unclassified)
}

fn tag_for_content_type(essence: &str) -> Option<FileType> {
    match essence {
        "text/html" => Some(FileType::Html),
        image if image.starts_with("image/") => Some(FileType::Image),
        "text/csv" => Some(FileType::Csv),
        "text/plain" => Some(FileType::Text),
        "text/json" | "application/json" => Some(FileType::Json),
        _ => None,
    }
}

fn tag_for_extension(extension: &str) -> Option<FileType> {
    match extension {
        "html" | "htm" => Some(FileType::Html),
        "png" | "jpg" | "jpeg" | "gif" | "bmp" => Some(FileType::Image),
        "csv" => Some(FileType::Csv),
        "txt" => Some(FileType::Text),
        "json" => Some(FileType::Json),
        "yml" | "yaml" => Some(FileType::Yaml),
        _ => None,
    }
}

/// Strip parameters such as `; charset=utf-8`.
fn mime_essence(content_type: &str) -> &str {
    content_type
        .split_once(';')
        .map_or(content_type, |(essence, _)| essence)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> FileRecord {
        FileRecord::new(format!("root/{name}"), name)
    }

    #[test]
    fn test_content_type_rules() {
        let cases = [
            ("text/html", FileType::Html),
            ("image/svg+xml", FileType::Image),
            ("text/csv", FileType::Csv),
            ("text/plain", FileType::Text),
            ("text/json", FileType::Json),
            ("application/json", FileType::Json),
        ];
        for (content_type, expected) in cases {
            let record = named("blob").with_content_type(content_type);
            assert_eq!(classify_type(&record), expected, "{content_type}");
        }
    }

    #[test]
    fn test_content_type_wins_over_extension() {
        let record = named("data.unknown").with_content_type("application/json");
        assert_eq!(classify_type(&record), FileType::Json);

        let record = named("report.csv").with_content_type("text/html");
        assert_eq!(classify_type(&record), FileType::Html);
    }

    #[test]
    fn test_unknown_content_type_falls_back_to_extension() {
        let record = named("notes.yaml").with_content_type("application/octet-stream");
        assert_eq!(classify_type(&record), FileType::Yaml);
    }

    #[test]
    fn test_content_type_parameters_ignored() {
        let record = named("page").with_content_type("text/html; charset=utf-8");
        assert_eq!(classify_type(&record), FileType::Html);
    }

    #[test]
    fn test_extension_rules() {
        assert_eq!(classify_type(&named("index.htm")), FileType::Html);
        assert_eq!(classify_type(&named("plot.jpeg")), FileType::Image);
        assert_eq!(classify_type(&named("table.csv")), FileType::Csv);
        assert_eq!(classify_type(&named("log.txt")), FileType::Text);
        assert_eq!(classify_type(&named("spec.json")), FileType::Json);
        assert_eq!(classify_type(&named("notes.yml")), FileType::Yaml);
        assert_eq!(classify_type(&named("archive.tar.gz")), FileType::Unclassified);
    }

    #[test]
    fn test_extension_is_case_sensitive() {
        assert_eq!(classify_type(&named("PLOT.PNG")), FileType::Unclassified);
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(classify_type(&named("Makefile")), FileType::Unclassified);
    }

    #[test]
    fn test_extension_from_path_when_unnamed() {
        let record = FileRecord::new("root/a/model.json", "");
        assert_eq!(classify_type(&record), FileType::Json);
    }

    #[test]
    fn test_tag_strings() {
        assert_eq!(FileType::Folder.as_str(), "folder");
        assert_eq!(FileType::Unclassified.as_str(), "");
        assert_eq!(FileType::Yaml.to_string(), "yaml");
        assert_eq!("csv".parse::<FileType>().unwrap(), FileType::Csv);
        assert_eq!(
            serde_json::to_string(&FileType::Unclassified).unwrap(),
            "\"\""
        );
        assert!(FileType::Folder.is_folder());
        assert!(!FileType::Json.is_folder());
    }
}
