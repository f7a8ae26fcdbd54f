use log::warn;
use serde::Serialize;

use crate::models::{BucketValue, Timeline};

pub const SLOT_COUNT: usize = 3;

/// The three sorted result lists backing the timeline list view.
///
/// Slot 0 is daily, 1 weekly, 2 monthly. Slots are always present so the
/// view renders all three sections even when a section has zero rows.
#[derive(Debug, Default)]
pub struct PresentationStore {
    slots: [Vec<BucketValue>; SLOT_COUNT],
}

/// Point-in-time copy of the presentation state, safe to hand to a renderer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationSnapshot {
    pub slots: [Vec<BucketValue>; SLOT_COUNT],
}

impl PresentationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a slot's list wholesale, then re-sort it by bucket start
    /// descending. The sort is stable so equal starts keep their incoming
    /// order.
    pub fn apply(&mut self, slot: usize, values: Vec<BucketValue>) {
        if slot >= SLOT_COUNT {
            warn!("ignoring apply to out-of-range slot {slot}");
            return;
        }

        self.slots[slot] = values;
        self.slots[slot].sort_by(|a, b| b.bucket_start.cmp(&a.bucket_start));
    }

    pub fn snapshot(&self) -> PresentationSnapshot {
        PresentationSnapshot {
            slots: self.slots.clone(),
        }
    }

    /// True iff every slot is empty; drives the empty-state view.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }

    pub fn section_count(&self) -> usize {
        SLOT_COUNT
    }

    pub fn row_count(&self, section: usize) -> usize {
        self.slots.get(section).map_or(0, Vec::len)
    }

    pub fn row(&self, section: usize, row: usize) -> Option<&BucketValue> {
        self.slots.get(section)?.get(row)
    }

    pub fn section_title(&self, section: usize) -> Option<&'static str> {
        Timeline::from_slot(section).map(|t| t.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bucket(day: u32, value: f64) -> BucketValue {
        let start = Utc.with_ymd_and_hms(2021, 5, day, 0, 0, 0).unwrap();
        BucketValue {
            bucket_start: start,
            bucket_end: start + Duration::days(1),
            value,
        }
    }

    #[test]
    fn starts_empty_with_three_sections() {
        let store = PresentationStore::new();
        assert!(store.is_empty());
        assert_eq!(store.section_count(), 3);
        for section in 0..3 {
            assert_eq!(store.row_count(section), 0);
        }
    }

    #[test]
    fn apply_sorts_descending_by_bucket_start() {
        let mut store = PresentationStore::new();
        store.apply(0, vec![bucket(7, 1.0), bucket(10, 2.0), bucket(8, 3.0)]);

        let starts: Vec<u32> = (0..store.row_count(0))
            .map(|row| {
                use chrono::Datelike;
                store.row(0, row).unwrap().bucket_start.day()
            })
            .collect();
        assert_eq!(starts, vec![10, 8, 7]);
    }

    #[test]
    fn apply_replaces_slot_wholesale() {
        let mut store = PresentationStore::new();
        store.apply(1, vec![bucket(7, 1.0), bucket(8, 2.0)]);
        store.apply(1, vec![bucket(9, 5.0)]);

        assert_eq!(store.row_count(1), 1);
        assert_eq!(store.row(1, 0).unwrap().value, 5.0);
    }

    #[test]
    fn emptiness_flips_on_first_non_empty_apply() {
        let mut store = PresentationStore::new();
        assert!(store.is_empty());

        store.apply(2, Vec::new());
        assert!(store.is_empty());

        store.apply(2, vec![bucket(7, 1.0)]);
        assert!(!store.is_empty());
    }

    #[test]
    fn out_of_range_slot_is_ignored() {
        let mut store = PresentationStore::new();
        store.apply(9, vec![bucket(7, 1.0)]);
        assert!(store.is_empty());
    }

    #[test]
    fn section_titles_follow_slot_order() {
        let store = PresentationStore::new();
        assert_eq!(store.section_title(0), Some("Daily"));
        assert_eq!(store.section_title(1), Some("Weekly"));
        assert_eq!(store.section_title(2), Some("Monthly"));
        assert_eq!(store.section_title(3), None);
    }
}
