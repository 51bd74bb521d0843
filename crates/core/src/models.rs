use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Builds the stable chapter identity `v{volume}-p{part}-c{chapter}`.
pub fn chapter_identity(volume: u32, part: u32, chapter: u32) -> String {
    format!("v{volume}-p{part}-c{chapter}")
}

/// One record as it comes out of the legacy database, before grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub volume: u32,
    pub part: u32,
    pub chapter: u32,
    pub start_page: u32,
    pub end_page: u32,
    pub title: String,
    pub content: String,
}

impl RawRecord {
    pub fn identity(&self) -> String {
        chapter_identity(self.volume, self.part, self.chapter)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub chapter: u32,
    pub title: String,
    pub start_page: u32,
    pub end_page: u32,
    pub content: String,
    pub id: String,
}

impl From<&RawRecord> for Chapter {
    fn from(record: &RawRecord) -> Self {
        Self {
            chapter: record.chapter,
            title: record.title.clone(),
            start_page: record.start_page,
            end_page: record.end_page,
            content: record.content.clone(),
            id: record.identity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Part {
    pub part: u32,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Volume {
    pub volume: u32,
    pub parts: Vec<Part>,
}

/// A chapter resolved together with the volume and part that hold it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChapterLocation {
    pub volume: u32,
    pub part: u32,
    #[serde(flatten)]
    pub chapter: Chapter,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChapterNeighbors {
    pub previous: Option<Chapter>,
    pub next: Option<Chapter>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeSummary {
    pub volume: u32,
    pub part_count: usize,
    pub chapter_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchIndexEntry {
    pub id: String,
    pub volume: u32,
    pub part: u32,
    pub chapter: u32,
    pub title: String,
    pub excerpt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
}

/// Per-chapter reading statistics. `progress` is a scroll percentage.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChapterStats {
    #[serde(default)]
    pub time: u64,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub last_updated: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct QueryFilters {
    pub volume: Option<u32>,
    pub part: Option<u32>,
}

impl QueryFilters {
    pub fn volume(volume: u32) -> Self {
        Self {
            volume: Some(volume),
            part: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.volume.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchIndexOrder {
    /// Entries follow the order records appear in the source file.
    #[default]
    Source,
    /// Entries follow the depth-first chapter order of the hierarchy.
    Hierarchy,
}

#[derive(Debug, Clone)]
pub struct PathRewrite {
    pub from: String,
    pub to: String,
}

impl Default for PathRewrite {
    fn default() -> Self {
        Self {
            from: "/plweb/TImages/".to_string(),
            to: "/TImages/".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestionOptions {
    /// Excerpt length in UTF-16 code units.
    pub excerpt_chars: usize,
    pub path_rewrite: PathRewrite,
    pub hierarchy_file: &'static str,
    pub search_index_file: &'static str,
    pub index_order: SearchIndexOrder,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            excerpt_chars: 200,
            path_rewrite: PathRewrite::default(),
            hierarchy_file: "chronicles.json",
            search_index_file: "search-index.json",
            index_order: SearchIndexOrder::Source,
        }
    }
}
