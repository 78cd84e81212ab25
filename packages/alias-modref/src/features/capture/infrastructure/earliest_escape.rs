//! Context-sensitive capture provider.

use crate::features::capture::ports::CaptureInfo;
use crate::shared::models::{InstId, PointerUse, ValueId};
use crate::shared::ports::ProgramInfo;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;
use tracing::debug;

/// Tracks, per object, the dominance-earliest point at which escape is
/// possible.
///
/// An escape inside a loop is attributed to the boundary before the loop:
/// the body may execute its escaping operation on any iteration, so loop
/// entry is the last point where "not yet escaped" is certain. A query is
/// true exactly when no escape point exists or the cached point strictly
/// follows the query point in dominance order.
///
/// A reverse index from instruction to dependent objects supports targeted
/// invalidation: when the host removes an instruction it must call
/// [`on_instruction_removed`](Self::on_instruction_removed), which purges
/// every object whose cached fact rests on that instruction. A stale
/// earliest point is a correctness bug, not a performance one.
pub struct EarliestEscapeInfo {
    ir: Rc<dyn ProgramInfo>,

    /// Object -> attributed earliest escape point; `None` = never escapes
    earliest: RefCell<FxHashMap<ValueId, Option<InstId>>>,

    /// Instruction -> objects whose cached fact depends on it (both the
    /// escaping instruction itself and its loop-entry attribution)
    inst_to_objects: RefCell<FxHashMap<InstId, Vec<ValueId>>>,
}

impl EarliestEscapeInfo {
    pub fn new(ir: Rc<dyn ProgramInfo>) -> Self {
        Self {
            ir,
            earliest: RefCell::new(FxHashMap::default()),
            inst_to_objects: RefCell::new(FxHashMap::default()),
        }
    }

    /// Purge every object whose cached escape fact depends on `inst`,
    /// forcing recomputation on next query.
    pub fn on_instruction_removed(&self, inst: InstId) {
        if let Some(objects) = self.inst_to_objects.borrow_mut().remove(&inst) {
            let mut earliest = self.earliest.borrow_mut();
            for object in &objects {
                earliest.remove(object);
            }
            debug!(
                inst,
                purged = objects.len(),
                "invalidated earliest-escape facts for removed instruction"
            );
        }
    }

    /// Walk the object's use closure and return the dominance-earliest
    /// escape, as `(attributed point, raw escaping instruction)`.
    fn find_earliest_escape(&self, object: ValueId) -> Option<(InstId, InstId)> {
        let mut visited = FxHashSet::default();
        visited.insert(object);
        let mut worklist = vec![object];
        let mut earliest: Option<(InstId, InstId)> = None;

        while let Some(value) = worklist.pop() {
            for pointer_use in self.ir.pointer_uses(value) {
                match pointer_use {
                    PointerUse::Escape { at } => {
                        let attributed = self.ir.loop_entry_before(at).unwrap_or(at);
                        earliest = Some(match earliest {
                            None => (attributed, at),
                            Some(best) => {
                                if self.ir.dominance_order(attributed, best.0)
                                    == Ordering::Less
                                {
                                    (attributed, at)
                                } else {
                                    best
                                }
                            }
                        });
                    }
                    PointerUse::Derive { derived, .. } => {
                        if visited.insert(derived) {
                            worklist.push(derived);
                        }
                    }
                    PointerUse::Read { .. } => {}
                }
            }
        }
        earliest
    }

    fn lookup_or_compute(&self, object: ValueId) -> Option<InstId> {
        if let Some(&cached) = self.earliest.borrow().get(&object) {
            return cached;
        }

        let found = self.find_earliest_escape(object);
        let attributed = found.map(|(attributed, _)| attributed);
        if let Some((attributed, raw)) = found {
            let mut index = self.inst_to_objects.borrow_mut();
            index.entry(attributed).or_default().push(object);
            if raw != attributed {
                index.entry(raw).or_default().push(object);
            }
        }
        self.earliest.borrow_mut().insert(object, attributed);
        attributed
    }
}

impl CaptureInfo for EarliestEscapeInfo {
    fn is_not_captured_before_or_at(&self, object: ValueId, at: InstId) -> bool {
        match self.lookup_or_compute(object) {
            None => true,
            Some(escape) => self.ir.dominance_order(escape, at) == Ordering::Greater,
        }
    }
}
