//! Concrete capture-info providers.

mod earliest_escape;
mod function_capture;

pub use earliest_escape::EarliestEscapeInfo;
pub use function_capture::FunctionCaptureInfo;
