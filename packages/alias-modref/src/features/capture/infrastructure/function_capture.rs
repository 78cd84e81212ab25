//! Context-free capture provider.

use crate::features::capture::ports::CaptureInfo;
use crate::shared::models::{InstId, PointerUse, ValueId};
use crate::shared::ports::ProgramInfo;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// Computes and caches whether an object is captured anywhere in the
/// function, without distinguishing where. The program point passed to
/// queries is ignored: a captured object is treated as captured
/// everywhere, an uncaptured one as uncaptured everywhere.
pub struct FunctionCaptureInfo {
    ir: Rc<dyn ProgramInfo>,
    captured: RefCell<FxHashMap<ValueId, bool>>,
}

impl FunctionCaptureInfo {
    pub fn new(ir: Rc<dyn ProgramInfo>) -> Self {
        Self {
            ir,
            captured: RefCell::new(FxHashMap::default()),
        }
    }

    /// Conservative fixed-point over the object's uses, following derived
    /// pointers: any escaping use of the object or of a pointer derived
    /// from it captures the object.
    fn compute_captured(&self, object: ValueId) -> bool {
        let mut visited = FxHashSet::default();
        visited.insert(object);
        let mut worklist = vec![object];

        while let Some(value) = worklist.pop() {
            for pointer_use in self.ir.pointer_uses(value) {
                match pointer_use {
                    PointerUse::Escape { .. } => return true,
                    PointerUse::Derive { derived, .. } => {
                        if visited.insert(derived) {
                            worklist.push(derived);
                        }
                    }
                    PointerUse::Read { .. } => {}
                }
            }
        }
        false
    }
}

impl CaptureInfo for FunctionCaptureInfo {
    fn is_not_captured_before_or_at(&self, object: ValueId, _at: InstId) -> bool {
        if let Some(&captured) = self.captured.borrow().get(&object) {
            return !captured;
        }
        let captured = self.compute_captured(object);
        trace!(object, captured, "computed function-level capture fact");
        self.captured.borrow_mut().insert(object, captured);
        !captured
    }
}
