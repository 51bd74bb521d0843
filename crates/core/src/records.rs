use crate::models::RawRecord;

const VOLUME: &str = "-vol-";
const PART: &str = "-part-";
const CHAPTER: &str = "-chapter-";
const START_PAGE: &str = "-spage-";
const END_PAGE: &str = "-epage-";
const TITLE: &str = "-title-";

/// Lenient integer parse: leading decimal digits after an optional `+`, 0 when
/// there are none. Negative values also read as 0 since the fields are unsigned.
pub fn parse_field_number(value: &str) -> u32 {
    let value = value.trim();
    let digits = value
        .strip_prefix('+')
        .unwrap_or(value)
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect::<String>();
    digits.parse().unwrap_or(0)
}

struct RecordBuilder {
    record: RawRecord,
    body: Vec<String>,
}

impl RecordBuilder {
    fn new(volume: u32) -> Self {
        Self {
            record: RawRecord {
                volume,
                ..RawRecord::default()
            },
            body: Vec::new(),
        }
    }

    fn finish(self) -> RawRecord {
        let mut record = self.record;
        record.content = self.body.join("\n").trim().to_string();
        record
    }
}

/// Splits repaired database text into records, in source order.
pub fn parse_records(text: &str) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut current: Option<RecordBuilder> = None;

    for raw_line in text.split('\n') {
        let raw_line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        let line = raw_line.trim();

        if let Some(rest) = line.strip_prefix(VOLUME) {
            if let Some(previous) = current.take() {
                records.push(previous.finish());
            }
            current = Some(RecordBuilder::new(parse_field_number(rest)));
            continue;
        }

        let Some(builder) = current.as_mut() else {
            continue;
        };

        if let Some(rest) = line.strip_prefix(PART) {
            builder.record.part = parse_field_number(rest);
        } else if let Some(rest) = line.strip_prefix(CHAPTER) {
            builder.record.chapter = parse_field_number(rest);
        } else if let Some(rest) = line.strip_prefix(START_PAGE) {
            builder.record.start_page = parse_field_number(rest);
        } else if let Some(rest) = line.strip_prefix(END_PAGE) {
            builder.record.end_page = parse_field_number(rest);
        } else if let Some(rest) = line.strip_prefix(TITLE) {
            builder.record.title = rest.trim().to_string();
        } else if !line.is_empty() {
            builder.body.push(raw_line.to_string());
        }
    }

    if let Some(last) = current {
        records.push(last.finish());
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_record_fields_are_parsed() {
        let text = "-vol-1\n-part-1\n-chapter-1\n-title-Test\nHello\nWorld";
        let records = parse_records(text);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.volume, 1);
        assert_eq!(record.part, 1);
        assert_eq!(record.chapter, 1);
        assert_eq!(record.title, "Test");
        assert_eq!(record.content, "Hello\nWorld");
        assert_eq!(record.identity(), "v1-p1-c1");
    }

    #[test]
    fn new_volume_sentinel_finalizes_previous_record() {
        let text = "-vol-2\n-chapter-4\nfirst\n-vol-1\n-chapter-3\nsecond\n";
        let records = parse_records(text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].volume, 2);
        assert_eq!(records[0].content, "first");
        assert_eq!(records[1].volume, 1);
        assert_eq!(records[1].content, "second");
    }

    #[test]
    fn sentinels_before_first_volume_are_ignored() {
        let text = "-part-9\n-title-Orphan\nstray body\n-vol-3\n-title-Kept";
        let records = parse_records(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].part, 0);
        assert_eq!(records[0].title, "Kept");
        assert_eq!(records[0].content, "");
    }

    #[test]
    fn malformed_numbers_default_to_zero() {
        let text = "-vol-x\n-part-\n-chapter-7b\n-spage-12\n-epage-oops";
        let record = &parse_records(text)[0];

        assert_eq!(record.volume, 0);
        assert_eq!(record.part, 0);
        assert_eq!(record.chapter, 7);
        assert_eq!(record.start_page, 12);
        assert_eq!(record.end_page, 0);
    }

    #[test]
    fn body_lines_keep_their_indentation() {
        let text = "-vol-1\r\n  <p>indented</p>\r\n\r\n\tnext\r\n";
        let record = &parse_records(text)[0];
        assert_eq!(record.content, "<p>indented</p>\n\tnext");
    }

    #[test]
    fn indented_sentinels_are_recognized() {
        let text = "   -vol- 5 \n  -title-  Spaced title  \nbody";
        let record = &parse_records(text)[0];
        assert_eq!(record.volume, 5);
        assert_eq!(record.title, "Spaced title");
    }

    #[test]
    fn overflowing_numbers_default_to_zero() {
        assert_eq!(parse_field_number("99999999999999999999"), 0);
        assert_eq!(parse_field_number(" 42 "), 42);
    }

    #[test]
    fn signed_numbers_follow_unsigned_fields() {
        assert_eq!(parse_field_number("+5"), 5);
        assert_eq!(parse_field_number("-3"), 0);
        assert_eq!(parse_field_number("+"), 0);
    }
}
