//! Entropic memory records

use serde::{Deserialize, Serialize};

use crate::decay::S_MAX;

/// Smallest reconsolidation boost
pub const MIN_BOOST: f64 = 0.02;

/// A memory whose strength decays in internal time.
///
/// `strength` is the value as of the last creation or access; decay is always
/// recomputed on demand and never written back here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntropicMemory {
    /// Unique id within a store
    pub id: String,
    /// Remembered text
    pub content: String,
    /// Strength at the last creation or access, in `[0, s_max]`
    pub strength: f64,
    /// Free-form labels
    pub tags: Vec<String>,
    /// Reconsolidation ceiling; stores overwrite it with their own cap
    pub s_max: f64,
    /// Internal time of encoding
    pub created_at_tau: f64,
    /// Internal time of the latest access; decay is measured from here
    pub last_accessed_tau: f64,
    /// Accesses including creation (starts at 1)
    pub access_count: u32,
}

impl EntropicMemory {
    /// New memory with a random short id
    pub fn new(content: &str, strength: f64) -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        Self::with_id(id, content, strength)
    }

    /// New memory with a caller-chosen id
    pub fn with_id(id: impl Into<String>, content: &str, strength: f64) -> Self {
        Self {
            id: id.into(),
            content: content.to_string(),
            strength,
            tags: Vec::new(),
            s_max: S_MAX,
            created_at_tau: 0.0,
            last_accessed_tau: 0.0,
            access_count: 1,
        }
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    /// Refresh on access.
    ///
    /// Every call counts as an access. When at least `cooldown` tau has passed
    /// since the last access, strength grows by `max(0.02, 0.1 / access_count)`
    /// up to `s_max`. `last_accessed_tau` never moves backwards here.
    pub fn reconsolidate(&mut self, current_tau: f64, cooldown: f64) -> f64 {
        let elapsed = current_tau - self.last_accessed_tau;
        self.last_accessed_tau = self.last_accessed_tau.max(current_tau);
        self.access_count = self.access_count.saturating_add(1);

        if elapsed >= cooldown {
            let boost = (0.1 / self.access_count as f64).max(MIN_BOOST);
            self.strength = (self.strength + boost).min(self.s_max);
        }
        self.strength
    }
}
