use serde::{Deserialize, Serialize};

/// Granularity of one of the three rolling statistics windows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Timeline {
    Daily,
    Weekly,
    Monthly,
}

impl Timeline {
    pub const ALL: [Timeline; 3] = [Timeline::Daily, Timeline::Weekly, Timeline::Monthly];

    /// Index of this timeline's slot in the presentation store.
    pub const fn slot_index(&self) -> usize {
        match self {
            Timeline::Daily => 0,
            Timeline::Weekly => 1,
            Timeline::Monthly => 2,
        }
    }

    pub fn from_slot(slot: usize) -> Option<Timeline> {
        Timeline::ALL.into_iter().find(|t| t.slot_index() == slot)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Timeline::Daily => "Daily",
            Timeline::Weekly => "Weekly",
            Timeline::Monthly => "Monthly",
        }
    }
}

// Each timeline must map to its own slot.
const _: () = {
    assert!(Timeline::Daily.slot_index() == 0);
    assert!(Timeline::Weekly.slot_index() == 1);
    assert!(Timeline::Monthly.slot_index() == 2);
};
