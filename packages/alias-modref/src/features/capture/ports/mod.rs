//! Port for capture-information providers.

use crate::shared::models::{InstId, ValueId};

/// Provider of escape facts about identified objects.
///
/// Providers cache internally and answer under `&self`; they are owned by
/// whichever component or session constructs them, and only that owner may
/// invalidate them when the program changes.
pub trait CaptureInfo {
    /// True when `object` is guaranteed not to have escaped before or at
    /// instruction `at`. A `false` answer is always sound.
    fn is_not_captured_before_or_at(&self, object: ValueId, at: InstId) -> bool;
}
