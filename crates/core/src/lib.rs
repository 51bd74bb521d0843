pub mod encoding;
pub mod error;
pub mod ingest;
pub mod models;
pub mod query;
pub mod reader_state;
pub mod records;
pub mod search;
pub mod service;
pub mod sitemap;
pub mod stores;
pub mod traits;

pub use encoding::{decode_mixed, repair_text};
pub use error::{IngestError, LoadError, StoreError};
pub use ingest::{
    build_hierarchy, build_search_index, ingest_bytes, ingest_file, write_artifacts,
    IngestionReport, WrittenArtifacts,
};
pub use models::{
    chapter_identity, Bookmark, Chapter, ChapterLocation, ChapterNeighbors, ChapterStats,
    IngestionOptions, Part, PathRewrite, QueryFilters, RawRecord, SearchIndexEntry,
    SearchIndexOrder, Volume, VolumeSummary,
};
pub use query::{parse_query, QueryTerm};
pub use reader_state::{format_reading_time, ReaderState};
pub use records::parse_records;
pub use search::{evaluate, search_index, MAX_RESULTS};
pub use service::ChronicleService;
pub use sitemap::render_sitemap;
pub use stores::{FileArtifactSource, HttpArtifactSource, JsonFileStore, MemoryStore};
pub use traits::{ArtifactSource, KeyValueStore};
