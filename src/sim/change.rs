//! Property-level change records for observers of the creature.

use std::fmt;

/// One observed field change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub field: &'static str,
    pub old: String,
    pub new: String,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.field, self.old, self.new)
    }
}

/// Receives change records after each applied action and each tick.
pub trait ChangeListener: Send {
    fn on_change(&mut self, change: &Change);
}

impl<F> ChangeListener for F
where
    F: FnMut(&Change) + Send,
{
    fn on_change(&mut self, change: &Change) {
        self(change)
    }
}

/// Observable fields captured before and after a mutation and diffed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Observed {
    pub fields: Vec<(&'static str, String)>,
}

impl Observed {
    pub fn diff(&self, after: &Observed) -> Vec<Change> {
        self.fields
            .iter()
            .zip(after.fields.iter())
            .filter(|(before, after)| before.1 != after.1)
            .map(|(before, after)| Change {
                field: before.0,
                old: before.1.clone(),
                new: after.1.clone(),
            })
            .collect()
    }
}
