use std::collections::BTreeMap;

use anyhow::Result;

use crate::db::Database;

use super::params::SkipSegment;

const OFFSETS_KEY: &str = "skip_offsets";

pub(crate) fn load_offsets(db: &Database) -> BTreeMap<String, i64> {
    let Ok(Some(raw)) = db.kv_get(OFFSETS_KEY) else {
        return BTreeMap::new();
    };
    serde_json::from_str(&raw).unwrap_or_default()
}

pub(crate) fn get_offset(db: &Database, card_id: Option<&str>) -> i64 {
    let Some(card_id) = card_id else {
        return 0;
    };
    load_offsets(db).get(card_id).copied().unwrap_or(0)
}

pub(crate) fn set_offset(db: &Database, card_id: &str, value: i64) -> Result<()> {
    let mut offsets = load_offsets(db);
    if value == 0 {
        offsets.remove(card_id);
    } else {
        offsets.insert(card_id.to_string(), value);
    }
    db.kv_set(OFFSETS_KEY, &serde_json::to_string(&offsets)?)
}

pub(crate) fn apply_offset(segments: &[SkipSegment], offset: i64) -> Vec<SkipSegment> {
    if offset == 0 || segments.is_empty() {
        return segments.to_vec();
    }
    let shift = offset as f64;
    segments
        .iter()
        .map(|segment| SkipSegment {
            start: (segment.start + shift).max(0.0),
            end: (segment.end + shift).max(0.0),
            name: segment.name.clone(),
        })
        .collect()
}
