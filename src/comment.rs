// src/comment.rs
use crate::error::RecordError;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One persisted comment, anchored to a page image by fractional position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub image_id: String,
    pub x_pct: f64,
    pub y_pct: f64,
    pub text: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub chapter: String,
}

/// Fallbacks applied while normalizing records.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDefaults {
    pub author: String,
    pub chapter: String,
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            author: crate::overlay_config::DEFAULT_AUTHOR.to_string(),
            chapter: crate::overlay_config::DEFAULT_CHAPTER.to_string(),
        }
    }
}

impl CommentRecord {
    /// Builds a record from an authoring click. Returns `None` when the author
    /// or the text is blank after trimming.
    pub fn authored(
        image_id: &str,
        (x_pct, y_pct): (f64, f64),
        author: &str,
        text: &str,
        chapter: &str,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let author = author.trim();
        let text = text.trim();
        if author.is_empty() || text.is_empty() {
            return None;
        }
        Some(
            Self {
                id: None,
                image_id: image_id.to_string(),
                x_pct,
                y_pct,
                text: text.to_string(),
                author: author.to_string(),
                created_at: Some(now.to_rfc3339()),
                chapter: chapter.to_string(),
            }
            .clamped(),
        )
    }

    /// Validates a loosely-shaped record coming back from the comment service.
    pub fn from_value(value: &Value, defaults: &RecordDefaults) -> Result<Self, RecordError> {
        let obj = value.as_object().ok_or(RecordError::NotAnObject)?;

        let y_pct = obj
            .get("yPct")
            .and_then(Value::as_f64)
            .ok_or(RecordError::MissingVerticalPosition)?;
        let x_pct = match obj.get("xPct") {
            Some(v) => v.as_f64().ok_or(RecordError::NonNumeric("xPct"))?,
            None => return Err(RecordError::MissingField("xPct")),
        };
        let image_id = obj
            .get("imageId")
            .and_then(Value::as_str)
            .ok_or(RecordError::MissingField("imageId"))?;
        let text = obj
            .get("text")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        if text.is_empty() {
            return Err(RecordError::EmptyText);
        }

        // Older records carry the author under `name`.
        let author = ["author", "name"]
            .iter()
            .filter_map(|key| obj.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .find(|a| !a.is_empty())
            .unwrap_or(defaults.author.as_str());
        let chapter = obj
            .get("chapter")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(defaults.chapter.as_str());

        Ok(Self {
            id: obj.get("id").and_then(Value::as_str).map(str::to_string),
            image_id: image_id.to_string(),
            x_pct,
            y_pct,
            text: text.to_string(),
            author: author.to_string(),
            created_at: obj
                .get("createdAt")
                .and_then(Value::as_str)
                .map(str::to_string),
            chapter: chapter.to_string(),
        }
        .clamped())
    }

    /// Both fractions pinned to `[0, 1]`.
    pub fn clamped(mut self) -> Self {
        self.x_pct = clamp_fraction(self.x_pct);
        self.y_pct = clamp_fraction(self.y_pct);
        self
    }

    pub fn elapsed_label(&self, now: DateTime<Utc>) -> String {
        format_elapsed(self.created_at.as_deref(), now)
    }
}

fn clamp_fraction(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Keeps the records that validate; the rest are dropped with a debug line.
/// Anything that is not a JSON array yields no records.
pub fn parse_comment_list(data: &Value, defaults: &RecordDefaults) -> Vec<CommentRecord> {
    let Some(items) = data.as_array() else {
        log::warn!("Comment list is not an array, ignoring it");
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match CommentRecord::from_value(item, defaults) {
            Ok(record) => Some(record),
            Err(e) => {
                log::debug!("Dropping comment record: {}", e);
                None
            }
        })
        .collect()
}

/// Relative age label. Whole days once a day has passed, whole hours before.
/// Missing or unparseable timestamps give an empty label.
pub fn format_elapsed(created_at: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(raw) = created_at.filter(|s| !s.trim().is_empty()) else {
        return String::new();
    };
    let Some(created) = parse_timestamp(raw.trim()) else {
        return String::new();
    };

    // Clock skew can put `created` in the future.
    let elapsed = (now - created).max(chrono::Duration::zero());
    let days = elapsed.num_days();
    if days >= 1 {
        format!("{} ngay truoc", days)
    } else {
        format!("{} gio truoc", elapsed.num_hours())
    }
}

/// RFC 3339, or an ISO-8601 date-time without offset read as local time.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = raw.parse::<NaiveDateTime>().ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_clamp_before_storage() {
        let value = json!({"xPct": 1.5, "yPct": -0.2, "text": "hi", "author": "a", "imageId": "img1"});
        let record = CommentRecord::from_value(&value, &RecordDefaults::default()).unwrap();
        assert_eq!(record.x_pct, 1.0);
        assert_eq!(record.y_pct, 0.0);

        let body = serde_json::to_value(&record).unwrap();
        assert_eq!(body["xPct"], json!(1.0));
        assert_eq!(body["yPct"], json!(0.0));
        assert_eq!(body["imageId"], json!("img1"));
        assert!(body.get("id").is_none());
    }

    #[test]
    fn test_authored_record() {
        let record = CommentRecord::authored("img/3.jpg", (1.2, 0.4), "  Mai ", " nice panel ", "k2", now())
            .unwrap();
        assert_eq!(record.author, "Mai");
        assert_eq!(record.text, "nice panel");
        assert_eq!(record.x_pct, 1.0);
        assert_eq!(record.y_pct, 0.4);
        assert_eq!(record.chapter, "k2");
        assert_eq!(record.created_at.as_deref(), Some("2024-05-10T12:00:00+00:00"));

        assert!(CommentRecord::authored("img", (0.1, 0.1), "  ", "text", "k1", now()).is_none());
        assert!(CommentRecord::authored("img", (0.1, 0.1), "me", "", "k1", now()).is_none());
    }

    #[test]
    fn test_missing_vertical_position() {
        let defaults = RecordDefaults::default();
        let no_y = json!({"xPct": 0.5, "text": "hi", "imageId": "img1"});
        assert_eq!(
            CommentRecord::from_value(&no_y, &defaults),
            Err(RecordError::MissingVerticalPosition)
        );

        let string_y = json!({"xPct": 0.5, "yPct": "0.5", "text": "hi", "imageId": "img1"});
        assert_eq!(
            CommentRecord::from_value(&string_y, &defaults),
            Err(RecordError::MissingVerticalPosition)
        );
    }

    #[test]
    fn test_fallbacks() {
        let defaults = RecordDefaults::default();
        let value = json!({"xPct": 0.5, "yPct": 0.5, "text": " hi ", "imageId": "img1", "name": " Old "});
        let record = CommentRecord::from_value(&value, &defaults).unwrap();
        assert_eq!(record.author, "Old");
        assert_eq!(record.chapter, "default");
        assert_eq!(record.text, "hi");
        assert_eq!(record.created_at, None);

        let anonymous = json!({"xPct": 0.5, "yPct": 0.5, "text": "hi", "imageId": "img1", "author": "  "});
        let record = CommentRecord::from_value(&anonymous, &defaults).unwrap();
        assert_eq!(record.author, "Anonymous");
    }

    #[test]
    fn test_parse_comment_list_drops_bad_entries() {
        let data = json!([
            {"id": "a1", "xPct": 0.2, "yPct": 0.3, "text": "ok", "imageId": "img1", "author": "x", "chapter": "k1"},
            {"xPct": 0.2, "text": "no y", "imageId": "img1"},
            {"xPct": 0.2, "yPct": 0.9, "text": "   ", "imageId": "img1"},
            "garbage"
        ]);
        let records = parse_comment_list(&data, &RecordDefaults::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_deref(), Some("a1"));
        assert_eq!(records[0].chapter, "k1");

        assert!(parse_comment_list(&json!({"error": "boom"}), &RecordDefaults::default()).is_empty());
    }

    #[test]
    fn test_elapsed_hours_and_days() {
        let three_hours = (now() - Duration::hours(3)).to_rfc3339();
        assert_eq!(format_elapsed(Some(&three_hours), now()), "3 gio truoc");

        let a_day_ago = (now() - Duration::hours(25)).to_rfc3339();
        assert_eq!(format_elapsed(Some(&a_day_ago), now()), "1 ngay truoc");

        let js_style = "2024-05-08T11:00:00.000Z";
        assert_eq!(format_elapsed(Some(js_style), now()), "2 ngay truoc");
    }

    #[test]
    fn test_elapsed_without_offset_is_local() {
        let created = Local.with_ymd_and_hms(2024, 5, 8, 11, 0, 0).unwrap();
        let now = created.with_timezone(&Utc) + Duration::hours(5);
        assert_eq!(format_elapsed(Some("2024-05-08T11:00:00"), now), "5 gio truoc");
        assert_eq!(format_elapsed(Some("2024-05-08T11:00:00.250"), now), "4 gio truoc");
    }

    #[test]
    fn test_elapsed_degrades_to_empty() {
        assert_eq!(format_elapsed(Some("not a date"), now()), "");
        assert_eq!(format_elapsed(Some(""), now()), "");
        assert_eq!(format_elapsed(None, now()), "");
    }

    #[test]
    fn test_elapsed_future_timestamp() {
        let ahead = (now() + Duration::hours(5)).to_rfc3339();
        assert_eq!(format_elapsed(Some(&ahead), now()), "0 gio truoc");
    }
}
