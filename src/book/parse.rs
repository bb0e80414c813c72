//! JSON parsing for the book metadata and directory endpoints

use super::BookInfo;
use crate::download::ChapterDescriptor;
use crate::{Result, RippleError};
use serde_json::{Map, Value};

type JsonMap = Map<String, Value>;

/// First non-empty string (or number rendered as a string) among `keys`
fn pick_string(map: &JsonMap, keys: &[&str]) -> Option<String> {
    for key in keys {
        match map.get(*key) {
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn pick_count(map: &JsonMap, keys: &[&str]) -> Option<u64> {
    pick_string(map, keys).and_then(|s| s.parse().ok())
}

/// Parses the metadata response, whose book record is `data[0]`
pub fn parse_book_info(book_id: &str, value: &Value) -> Result<BookInfo> {
    let record = value
        .get("data")
        .and_then(|data| data.get(0))
        .and_then(Value::as_object)
        .ok_or_else(|| RippleError::BookApi(format!("no book record for {}", book_id)))?;

    Ok(BookInfo {
        book_id: book_id.to_string(),
        name: pick_string(record, &["book_name", "bookName"]).unwrap_or_else(|| book_id.to_string()),
        author: pick_string(record, &["author", "author_name"]).unwrap_or_default(),
        abstract_text: pick_string(record, &["abstract", "description"]).unwrap_or_default(),
        word_count: pick_count(record, &["word_number", "word_count"]),
        chapter_count: pick_count(record, &["serial_count", "chapter_count"]),
        cover_url: pick_string(record, &["thumb_url", "cover_url"]),
    })
}

/// Parses the directory response into chapters in reading order
///
/// `data.chapterListWithVolume` holds one array per volume; volumes are
/// flattened in order. Items without a title become `第<n>章`.
pub fn parse_chapter_list(value: &Value) -> Result<Vec<ChapterDescriptor>> {
    let volumes = value
        .get("data")
        .and_then(|data| data.get("chapterListWithVolume"))
        .and_then(Value::as_array)
        .ok_or_else(|| RippleError::BookApi("chapter list not found".to_string()))?;

    let items = volumes.iter().flat_map(|volume| match volume {
        Value::Array(items) => items.iter().collect::<Vec<_>>(),
        item => vec![item],
    });

    let mut chapters = Vec::new();
    for item in items.filter_map(Value::as_object) {
        let Some(id) = pick_string(item, &["itemId", "item_id"]) else {
            continue;
        };
        let title = pick_string(item, &["title"])
            .unwrap_or_else(|| format!("第{}章", chapters.len() + 1));
        chapters.push(ChapterDescriptor::new(id, title));
    }

    if chapters.is_empty() {
        return Err(RippleError::BookApi("chapter list is empty".to_string()));
    }
    Ok(chapters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_book_info() {
        let value = json!({
            "data": [{
                "book_name": "  星海  ",
                "author": "某人",
                "abstract": "简介",
                "word_number": "123456",
                "serial_count": 88,
                "thumb_url": "https://img.example.com/c.jpg"
            }]
        });

        let info = parse_book_info("7", &value).unwrap();
        assert_eq!(info.name, "星海");
        assert_eq!(info.author, "某人");
        assert_eq!(info.word_count, Some(123456));
        assert_eq!(info.chapter_count, Some(88));
        assert_eq!(info.cover_url.as_deref(), Some("https://img.example.com/c.jpg"));
    }

    #[test]
    fn test_parse_book_info_without_record() {
        let result = parse_book_info("7", &json!({ "data": [] }));
        assert!(matches!(result, Err(RippleError::BookApi(_))));
    }

    #[test]
    fn test_parse_chapter_list_flattens_volumes() {
        let value = json!({
            "data": {
                "chapterListWithVolume": [
                    [{ "itemId": "11", "title": "序" }, { "itemId": "12", "title": "" }],
                    [{ "itemId": "21", "title": "第三章" }]
                ]
            }
        });

        let chapters = parse_chapter_list(&value).unwrap();
        assert_eq!(
            chapters,
            vec![
                ChapterDescriptor::new("11", "序"),
                ChapterDescriptor::new("12", "第2章"),
                ChapterDescriptor::new("21", "第三章"),
            ]
        );
    }

    #[test]
    fn test_parse_chapter_list_missing() {
        let result = parse_chapter_list(&json!({ "data": {} }));
        assert!(matches!(result, Err(RippleError::BookApi(_))));

        let result = parse_chapter_list(&json!({ "data": { "chapterListWithVolume": [[]] } }));
        assert!(matches!(result, Err(RippleError::BookApi(_))));
    }
}
