use crate::models::{Bookmark, ChapterStats};
use crate::traits::KeyValueStore;
use crate::StoreError;
use chrono::Utc;
use tracing::warn;

pub const BOOKMARKS_KEY: &str = "chronicles-bookmarks";
pub const PROGRESS_KEY: &str = "chronicles-progress";
pub const STATS_KEY_PREFIX: &str = "reading_stats_";

pub fn stats_key(chapter_id: &str) -> String {
    format!("{STATS_KEY_PREFIX}{chapter_id}")
}

/// Renders a reading time as `45s` or `2m 5s`.
pub fn format_reading_time(seconds: u64) -> String {
    let minutes = seconds / 60;
    let rest = seconds % 60;
    if minutes == 0 {
        format!("{rest}s")
    } else {
        format!("{minutes}m {rest}s")
    }
}

/// Bookmarks, last-read chapter and per-chapter stats for one reader.
pub struct ReaderState<S>
where
    S: KeyValueStore,
{
    store: S,
}

impl<S> ReaderState<S>
where
    S: KeyValueStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bookmarks(&self) -> Result<Vec<Bookmark>, StoreError> {
        match self.store.get(BOOKMARKS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn save_bookmarks(&self, bookmarks: &[Bookmark]) -> Result<(), StoreError> {
        self.store
            .set(BOOKMARKS_KEY, &serde_json::to_string(bookmarks)?)
    }

    /// Returns `false` when the chapter was already bookmarked.
    pub fn add_bookmark(&self, chapter_id: &str, title: &str) -> Result<bool, StoreError> {
        let mut bookmarks = self.bookmarks()?;
        if bookmarks.iter().any(|bookmark| bookmark.id == chapter_id) {
            return Ok(false);
        }

        bookmarks.push(Bookmark {
            id: chapter_id.to_string(),
            title: title.to_string(),
            date: Utc::now(),
        });
        self.save_bookmarks(&bookmarks)?;
        Ok(true)
    }

    pub fn remove_bookmark(&self, chapter_id: &str) -> Result<bool, StoreError> {
        let mut bookmarks = self.bookmarks()?;
        let before = bookmarks.len();
        bookmarks.retain(|bookmark| bookmark.id != chapter_id);
        self.save_bookmarks(&bookmarks)?;
        Ok(bookmarks.len() != before)
    }

    pub fn is_bookmarked(&self, chapter_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .bookmarks()?
            .iter()
            .any(|bookmark| bookmark.id == chapter_id))
    }

    pub fn save_progress(&self, chapter_id: &str) -> Result<(), StoreError> {
        self.store.set(PROGRESS_KEY, chapter_id)
    }

    pub fn progress(&self) -> Result<Option<String>, StoreError> {
        self.store.get(PROGRESS_KEY)
    }

    pub fn clear_progress(&self) -> Result<(), StoreError> {
        self.store.remove(PROGRESS_KEY)
    }

    /// Stored stats for a chapter; zeroed when absent or unreadable.
    pub fn chapter_stats(&self, chapter_id: &str) -> Result<ChapterStats, StoreError> {
        let Some(raw) = self.store.get(&stats_key(chapter_id))? else {
            return Ok(ChapterStats::default());
        };

        match serde_json::from_str(&raw) {
            Ok(stats) => Ok(stats),
            Err(error) => {
                warn!(chapter_id, %error, "failed to parse reading stats");
                Ok(ChapterStats::default())
            }
        }
    }

    pub fn save_chapter_stats(
        &self,
        chapter_id: &str,
        stats: &ChapterStats,
    ) -> Result<(), StoreError> {
        self.store
            .set(&stats_key(chapter_id), &serde_json::to_string(stats)?)
    }

    /// Adds `elapsed_seconds` to the chapter's reading time and records the
    /// latest scroll percentage, clamped to 0..=100.
    pub fn record_reading(
        &self,
        chapter_id: &str,
        elapsed_seconds: u64,
        scroll_percent: f64,
    ) -> Result<ChapterStats, StoreError> {
        let previous = self.chapter_stats(chapter_id)?;
        let progress = if scroll_percent.is_nan() {
            previous.progress
        } else {
            scroll_percent.round().clamp(0.0, 100.0) as u8
        };

        let stats = ChapterStats {
            time: previous.time.saturating_add(elapsed_seconds),
            progress,
            last_updated: Utc::now().timestamp_millis(),
        };
        self.save_chapter_stats(chapter_id, &stats)?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;

    fn state() -> ReaderState<MemoryStore> {
        ReaderState::new(MemoryStore::new())
    }

    #[test]
    fn adding_same_bookmark_twice_keeps_one() -> Result<(), StoreError> {
        let state = state();

        assert!(state.add_bookmark("v1-p1-c1", "Sumedha")?);
        assert!(!state.add_bookmark("v1-p1-c1", "Sumedha again")?);

        let bookmarks = state.bookmarks()?;
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks[0].title, "Sumedha");
        Ok(())
    }

    #[test]
    fn bookmarks_can_be_removed() -> Result<(), StoreError> {
        let state = state();
        state.add_bookmark("v1-p1-c1", "One")?;
        state.add_bookmark("v1-p1-c2", "Two")?;

        assert!(state.remove_bookmark("v1-p1-c1")?);
        assert!(!state.remove_bookmark("v1-p1-c1")?);
        assert!(!state.is_bookmarked("v1-p1-c1")?);
        assert!(state.is_bookmarked("v1-p1-c2")?);
        Ok(())
    }

    #[test]
    fn progress_is_overwritten() -> Result<(), StoreError> {
        let state = state();
        assert_eq!(state.progress()?, None);

        state.save_progress("v1-p1-c1")?;
        state.save_progress("v2-p3-c4")?;
        assert_eq!(state.progress()?.as_deref(), Some("v2-p3-c4"));

        state.clear_progress()?;
        assert_eq!(state.progress()?, None);
        Ok(())
    }

    #[test]
    fn reading_time_accumulates_and_scroll_is_clamped() -> Result<(), StoreError> {
        let state = state();

        state.record_reading("v1-p1-c1", 30, 40.4)?;
        let stats = state.record_reading("v1-p1-c1", 45, 180.0)?;
        assert_eq!(stats.time, 75);
        assert_eq!(stats.progress, 100);
        assert!(stats.last_updated > 0);

        let stored = state.chapter_stats("v1-p1-c1")?;
        assert_eq!(stored, stats);

        let negative = state.record_reading("v1-p1-c2", 0, -5.0)?;
        assert_eq!(negative.progress, 0);
        Ok(())
    }

    #[test]
    fn unreadable_stats_fall_back_to_zero() -> Result<(), StoreError> {
        let state = state();
        state.store().set(&stats_key("v1-p1-c1"), "{broken")?;
        assert_eq!(state.chapter_stats("v1-p1-c1")?, ChapterStats::default());
        Ok(())
    }

    #[test]
    fn stats_keys_use_fixed_prefix() {
        assert_eq!(stats_key("v1-p2-c3"), "reading_stats_v1-p2-c3");
    }

    #[test]
    fn reading_time_formats_minutes() {
        assert_eq!(format_reading_time(45), "45s");
        assert_eq!(format_reading_time(125), "2m 5s");
        assert_eq!(format_reading_time(0), "0s");
    }
}
