use crate::models::{
    ChapterLocation, ChapterNeighbors, QueryFilters, SearchIndexEntry, Volume, VolumeSummary,
};
use crate::search::search_index;
use crate::traits::ArtifactSource;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

pub fn find_chapter(hierarchy: &[Volume], id: &str) -> Option<ChapterLocation> {
    hierarchy.iter().find_map(|volume| {
        volume.parts.iter().find_map(|part| {
            part.chapters
                .iter()
                .find(|chapter| chapter.id == id)
                .map(|chapter| ChapterLocation {
                    volume: volume.volume,
                    part: part.part,
                    chapter: chapter.clone(),
                })
        })
    })
}

/// Previous and next chapter in depth-first hierarchy order.
pub fn chapter_neighbors(hierarchy: &[Volume], id: &str) -> Option<ChapterNeighbors> {
    let chapters = hierarchy
        .iter()
        .flat_map(|volume| volume.parts.iter())
        .flat_map(|part| part.chapters.iter())
        .collect::<Vec<_>>();

    let position = chapters.iter().position(|chapter| chapter.id == id)?;
    Some(ChapterNeighbors {
        previous: position
            .checked_sub(1)
            .and_then(|index| chapters.get(index))
            .map(|chapter| (*chapter).clone()),
        next: chapters.get(position + 1).map(|chapter| (*chapter).clone()),
    })
}

pub fn summarize_volumes(hierarchy: &[Volume]) -> Vec<VolumeSummary> {
    hierarchy
        .iter()
        .map(|volume| VolumeSummary {
            volume: volume.volume,
            part_count: volume.parts.len(),
            chapter_count: volume.parts.iter().map(|part| part.chapters.len()).sum(),
        })
        .collect()
}

/// Owns the loaded artifacts for one session.
///
/// Each artifact is fetched at most once; concurrent first callers share the
/// same in-flight load. A failed load yields an empty collection and is
/// retried on the next call.
pub struct ChronicleService<S>
where
    S: ArtifactSource,
{
    source: S,
    hierarchy: OnceCell<Arc<Vec<Volume>>>,
    search_index: OnceCell<Arc<Vec<SearchIndexEntry>>>,
}

impl<S> ChronicleService<S>
where
    S: ArtifactSource + Send + Sync,
{
    pub fn new(source: S) -> Self {
        Self {
            source,
            hierarchy: OnceCell::new(),
            search_index: OnceCell::new(),
        }
    }

    pub async fn hierarchy(&self) -> Arc<Vec<Volume>> {
        let loaded = self
            .hierarchy
            .get_or_try_init(|| async {
                let volumes = self.source.fetch_hierarchy().await?;
                debug!(volumes = volumes.len(), "loaded hierarchy");
                Ok::<_, crate::LoadError>(Arc::new(volumes))
            })
            .await;

        match loaded {
            Ok(volumes) => Arc::clone(volumes),
            Err(error) => {
                warn!(%error, "error loading hierarchy");
                Arc::new(Vec::new())
            }
        }
    }

    pub async fn search_index(&self) -> Arc<Vec<SearchIndexEntry>> {
        let loaded = self
            .search_index
            .get_or_try_init(|| async {
                let entries = self.source.fetch_search_index().await?;
                debug!(entries = entries.len(), "loaded search index");
                Ok::<_, crate::LoadError>(Arc::new(entries))
            })
            .await;

        match loaded {
            Ok(entries) => Arc::clone(entries),
            Err(error) => {
                warn!(%error, "error loading search index");
                Arc::new(Vec::new())
            }
        }
    }

    pub async fn search(&self, query: &str, filters: &QueryFilters) -> Vec<SearchIndexEntry> {
        let index = self.search_index().await;
        search_index(query, filters, &index)
    }

    pub async fn lookup_chapter_by_id(&self, id: &str) -> Option<ChapterLocation> {
        find_chapter(&self.hierarchy().await, id)
    }

    pub async fn adjacent_chapters(&self, id: &str) -> Option<ChapterNeighbors> {
        chapter_neighbors(&self.hierarchy().await, id)
    }

    pub async fn volume_summaries(&self) -> Vec<VolumeSummary> {
        summarize_volumes(&self.hierarchy().await)
    }
}
