use crate::encoding::repair_text;
use crate::models::{
    Chapter, IngestionOptions, Part, RawRecord, SearchIndexEntry, SearchIndexOrder, Volume,
};
use crate::records::parse_records;
use crate::IngestError;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const MARKUP_TAG: &str = r"<[^>]*>";

pub struct IngestionReport {
    pub records: usize,
    pub hierarchy: Vec<Volume>,
    pub search_index: Vec<SearchIndexEntry>,
    pub duplicate_ids: Vec<String>,
    pub checksum: String,
}

pub struct WrittenArtifacts {
    pub hierarchy_path: PathBuf,
    pub search_index_path: PathBuf,
}

pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Groups records by volume and part, sorted by volume, part and chapter.
pub fn build_hierarchy(records: &[RawRecord]) -> Vec<Volume> {
    let mut volumes: BTreeMap<u32, BTreeMap<u32, Vec<Chapter>>> = BTreeMap::new();

    for record in records {
        volumes
            .entry(record.volume)
            .or_default()
            .entry(record.part)
            .or_default()
            .push(Chapter::from(record));
    }

    volumes
        .into_iter()
        .map(|(volume, parts)| Volume {
            volume,
            parts: parts
                .into_iter()
                .map(|(part, mut chapters)| {
                    chapters.sort_by_key(|chapter| chapter.chapter);
                    Part { part, chapters }
                })
                .collect(),
        })
        .collect()
}

/// Takes the first `max_units` UTF-16 code units of `content`, then drops
/// `<...>` tags. A character whose surrogate pair would straddle the limit is
/// left out.
pub fn make_excerpt(markup: &Regex, content: &str, max_units: usize) -> String {
    let mut units = 0;
    let head = content
        .chars()
        .take_while(|ch| {
            units += ch.len_utf16();
            units <= max_units
        })
        .collect::<String>();
    markup.replace_all(&head, "").into_owned()
}

pub fn build_search_index(
    records: &[RawRecord],
    options: &IngestionOptions,
) -> Result<Vec<SearchIndexEntry>, IngestError> {
    let markup = Regex::new(MARKUP_TAG)?;

    let mut entries = records
        .iter()
        .map(|record| SearchIndexEntry {
            id: record.identity(),
            volume: record.volume,
            part: record.part,
            chapter: record.chapter,
            title: record.title.clone(),
            excerpt: make_excerpt(&markup, &record.content, options.excerpt_chars),
        })
        .collect::<Vec<_>>();

    if options.index_order == SearchIndexOrder::Hierarchy {
        entries.sort_by_key(|entry| (entry.volume, entry.part, entry.chapter));
    }

    Ok(entries)
}

pub fn find_duplicate_ids(records: &[RawRecord]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut duplicates = Vec::new();

    for record in records {
        let count = seen.entry(record.identity()).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicates.push(record.identity());
        }
    }

    duplicates
}

pub fn ingest_bytes(
    bytes: &[u8],
    options: &IngestionOptions,
) -> Result<IngestionReport, IngestError> {
    let text = repair_text(bytes, &options.path_rewrite);
    let records = parse_records(&text);
    info!(records = records.len(), "parsed records");

    let duplicate_ids = find_duplicate_ids(&records);
    for id in &duplicate_ids {
        warn!(id = %id, "identity emitted by more than one record");
    }

    Ok(IngestionReport {
        records: records.len(),
        hierarchy: build_hierarchy(&records),
        search_index: build_search_index(&records, options)?,
        duplicate_ids,
        checksum: digest_bytes(bytes),
    })
}

pub fn ingest_file(
    source: &Path,
    options: &IngestionOptions,
) -> Result<IngestionReport, IngestError> {
    if !source.is_file() {
        return Err(IngestError::InvalidArgument(format!(
            "source database not found: {}",
            source.display()
        )));
    }

    info!(source = %source.display(), "reading source database");
    let bytes = fs::read(source)?;
    ingest_bytes(&bytes, options)
}

pub fn write_artifacts(
    report: &IngestionReport,
    output_dir: &Path,
    options: &IngestionOptions,
) -> Result<WrittenArtifacts, IngestError> {
    fs::create_dir_all(output_dir)?;

    let hierarchy_path = output_dir.join(options.hierarchy_file);
    fs::write(&hierarchy_path, serde_json::to_string_pretty(&report.hierarchy)?)?;
    info!(path = %hierarchy_path.display(), volumes = report.hierarchy.len(), "wrote hierarchy");

    let search_index_path = output_dir.join(options.search_index_file);
    fs::write(
        &search_index_path,
        serde_json::to_string_pretty(&report.search_index)?,
    )?;
    info!(
        path = %search_index_path.display(),
        entries = report.search_index.len(),
        "wrote search index"
    );

    Ok(WrittenArtifacts {
        hierarchy_path,
        search_index_path,
    })
}
