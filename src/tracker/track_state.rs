/// Lifecycle of a tracked id.
///
/// A track starts out provisional and becomes confirmed once, when it has been
/// observed in enough frames. The class label and per-class ordinal are fixed
/// at that moment and never revised, even if later votes change the majority.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TrackState {
    /// Seen, but not often enough to count as a real object
    #[default]
    Provisional,
    /// Counted as a unique object
    Confirmed(Confirmation),
}

impl TrackState {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        match self {
            Self::Confirmed(confirmation) => Some(confirmation),
            Self::Provisional => None,
        }
    }
}

/// What was locked in when a track was confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    /// Majority class at confirmation time
    pub class_label: String,
    /// 1-based running count of confirmations for `class_label`
    pub ordinal: u32,
    /// Frame on which the track was confirmed
    pub frame_index: u64,
    /// Detection confidence on the confirming frame
    pub confidence: f32,
}
