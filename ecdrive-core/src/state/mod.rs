//! Display state
//!
//! Segment bookkeeping and the phase machine the engines step through.

pub mod events;
pub mod machine;
pub mod segment;

pub use events::PhaseEvent;
pub use machine::EnginePhase;
pub use segment::{Segment, SegmentMask, SegmentState, SegmentStore, MAX_SEGMENTS};
