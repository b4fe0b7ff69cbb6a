use std::collections::HashSet;

/// De-duplicating set of originals waiting for the next batch.
///
/// Scoped to whichever language is active; the translator clears it on a
/// language switch.
#[derive(Debug, Default)]
pub struct PendingQueue {
    texts: HashSet<String>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `text` to the queue. Returns `false` if it was already pending.
    pub fn push(&mut self, text: &str) -> bool {
        if self.texts.contains(text) {
            return false;
        }
        self.texts.insert(text.to_string())
    }

    /// Take every pending string, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<String> {
        self.texts.drain().collect()
    }

    pub fn clear(&mut self) {
        self.texts.clear();
    }

    pub fn contains(&self, text: &str) -> bool {
        self.texts.contains(text)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}
