use std::fs;
use std::path::Path;

use predicates::prelude::*;

fn write_source(dir: &Path) -> std::path::PathBuf {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"-vol-2\n-part-1\n-chapter-1\n-title-The Four Noble Truths\n");
    bytes.extend_from_slice(b"<p>At Isipatana the Buddha taught the four truths.</p>\n");
    bytes.extend_from_slice(b"-vol-1\n-part-1\n-chapter-1\n-title-");
    bytes.extend_from_slice(&[0x93]);
    bytes.extend_from_slice(b"Sumedha");
    bytes.extend_from_slice(&[0x94]);
    bytes.extend_from_slice(b"\nThe hermit Sumedha lived near Amaravati.\n");

    let path = dir.join("Buddha.src");
    fs::write(&path, bytes).expect("write source database");
    path
}

fn chronicle(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("chronicle");
    cmd.arg("--data-dir")
        .arg(dir.join("data"))
        .arg("--state-file")
        .arg(dir.join("state.json"));
    cmd
}

fn ingest(dir: &Path) {
    let source = write_source(dir);
    chronicle(dir)
        .arg("ingest")
        .arg("--source")
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("Parsed 2 records"))
        .stdout(predicate::str::contains("Created search index with 2 entries"));
}

#[test]
fn ingest_writes_both_artifacts() {
    let dir = tempfile::tempdir().expect("tempdir");
    ingest(dir.path());

    let hierarchy = fs::read_to_string(dir.path().join("data").join("chronicles.json"))
        .expect("read hierarchy");
    let index = fs::read_to_string(dir.path().join("data").join("search-index.json"))
        .expect("read search index");

    assert!(hierarchy.contains("\"startPage\""));
    assert!(hierarchy.contains("\u{201C}Sumedha\u{201D}"));
    let first_v2 = index.find("v2-p1-c1").expect("v2 entry");
    let first_v1 = index.find("v1-p1-c1").expect("v1 entry");
    assert!(first_v2 < first_v1);
}

#[test]
fn ingest_fails_for_missing_source() {
    let dir = tempfile::tempdir().expect("tempdir");
    chronicle(dir.path())
        .args(["ingest", "--source"])
        .arg(dir.path().join("missing.src"))
        .assert()
        .failure();
}

#[test]
fn search_supports_phrases_and_filters() {
    let dir = tempfile::tempdir().expect("tempdir");
    ingest(dir.path());

    chronicle(dir.path())
        .args(["search", "--query", "\"four truths\""])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 result"))
        .stdout(predicate::str::contains("v2-p1-c1"));

    chronicle(dir.path())
        .args(["search", "--query", "buddha|hermit", "--volume", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v1-p1-c1"))
        .stdout(predicate::str::contains("v2-p1-c1").not());

    chronicle(dir.path())
        .args(["search", "--query", "-truths", "--volume", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No results found"));
}

#[test]
fn reading_records_progress_and_bookmarks() {
    let dir = tempfile::tempdir().expect("tempdir");
    ingest(dir.path());

    chronicle(dir.path())
        .args(["read", "--id", "v1-p1-c1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("next: v2-p1-c1"));

    chronicle(dir.path())
        .arg("progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("last read: v1-p1-c1"));

    for _ in 0..2 {
        chronicle(dir.path())
            .args(["bookmark", "add", "--id", "v2-p1-c1"])
            .assert()
            .success();
    }

    chronicle(dir.path())
        .args(["bookmark", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v2-p1-c1").count(1));

    chronicle(dir.path())
        .args(["read", "--id", "v9-p9-c9"])
        .assert()
        .failure();
}

#[test]
fn sort_index_writes_hierarchy_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = write_source(dir.path());
    chronicle(dir.path())
        .args(["ingest", "--sort-index", "--source"])
        .arg(&source)
        .assert()
        .success();

    let index = fs::read_to_string(dir.path().join("data").join("search-index.json"))
        .expect("read search index");
    let first_v1 = index.find("v1-p1-c1").expect("v1 entry");
    let first_v2 = index.find("v2-p1-c1").expect("v2 entry");
    assert!(first_v1 < first_v2);
}

#[test]
fn volumes_lists_part_and_chapter_counts() {
    let dir = tempfile::tempdir().expect("tempdir");
    ingest(dir.path());

    chronicle(dir.path())
        .arg("volumes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Volume 1: 1 parts • 1 chapters"))
        .stdout(predicate::str::contains("Volume 2: 1 parts • 1 chapters"));
}

#[test]
fn stats_accumulate_reading_time() {
    let dir = tempfile::tempdir().expect("tempdir");
    ingest(dir.path());

    chronicle(dir.path())
        .args(["stats", "--id", "v1-p1-c1", "--add-seconds", "65", "--scroll", "40"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v1-p1-c1: read 1m 5s • 40% scrolled"));

    chronicle(dir.path())
        .args(["stats", "--id", "v1-p1-c1", "--add-seconds", "60"])
        .assert()
        .success()
        .stdout(predicate::str::contains("read 2m 5s • 40% scrolled"));

    chronicle(dir.path())
        .args(["stats", "--id", "v2-p1-c1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("read 0s • 0% scrolled"));
}

#[test]
fn sitemap_lists_every_chapter() {
    let dir = tempfile::tempdir().expect("tempdir");
    ingest(dir.path());
    let out = dir.path().join("site").join("sitemap.xml");

    chronicle(dir.path())
        .args(["sitemap", "--base-url", "https://example.org/", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Sitemap written to"));

    let xml = fs::read_to_string(&out).expect("read sitemap");
    assert!(xml.contains("<loc>https://example.org/read/v1-p1-c1</loc>"));
    assert!(xml.contains("<loc>https://example.org/read/v2-p1-c1</loc>"));
}

#[test]
fn sitemap_fails_without_ingested_data() {
    let dir = tempfile::tempdir().expect("tempdir");
    chronicle(dir.path())
        .args(["sitemap", "--out"])
        .arg(dir.path().join("sitemap.xml"))
        .assert()
        .failure();
}

#[test]
fn progress_can_be_cleared() {
    let dir = tempfile::tempdir().expect("tempdir");
    ingest(dir.path());

    chronicle(dir.path())
        .args(["read", "--id", "v2-p1-c1"])
        .assert()
        .success();

    chronicle(dir.path())
        .args(["progress", "--clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reading progress cleared"));

    chronicle(dir.path())
        .arg("progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing read yet"));
}
