//! Majority vote over the class labels a track has been given.

/// Per-track tally of class labels in first-seen order.
///
/// The detector may flicker between labels for the same object ("chair" on
/// one frame, "couch" on the next). The resolved label is the one with the
/// most votes; ties go to the label that received its first vote earliest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassVotes {
    votes: Vec<(String, u32)>,
}

impl ClassVotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one vote for `label`.
    pub fn record(&mut self, label: &str) {
        match self.votes.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => *count += 1,
            None => self.votes.push((label.to_owned(), 1)),
        }
    }

    /// Number of votes recorded for `label`.
    pub fn count(&self, label: &str) -> u32 {
        self.votes
            .iter()
            .find(|(l, _)| l == label)
            .map_or(0, |(_, count)| *count)
    }

    /// Total votes across all labels.
    pub fn total(&self) -> u32 {
        self.votes.iter().map(|(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// The winning label, or `None` if no vote was ever recorded.
    pub fn resolve(&self) -> Option<&str> {
        let mut best: Option<&(String, u32)> = None;
        for entry in &self.votes {
            // strictly greater keeps the earliest label on ties
            if best.is_none_or(|b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(label, _)| label.as_str())
    }

    /// Labels and their counts in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.votes.iter().map(|(l, c)| (l.as_str(), *c))
    }
}
