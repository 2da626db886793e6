//! The merge phase: fixed-point driver, scope matching and subcomponent
//! finalization.
//!
//! - [`MergeDriver`]: decides per round whether merge requests wait or finalize
//! - [`MergeRequest`]: a parsed `@MergeComponent` declaration
//! - [`ScopeResolver`]: selects the lookups matching a scope, minus exclusions
//! - [`SubcomponentFinalizer`]: concrete components for merged subcomponents
//! - [`ProcessedSet`]: requests already finalized in this session

mod driver;
mod processed;
mod request;
mod resolver;
mod subcomponent;

pub use driver::{FinalizedMerge, MergeDriver, StepOutcome};
pub use processed::ProcessedSet;
pub use request::{aggregate_name, MergeRequest};
pub use resolver::{is_lookup, is_subcomponent_lookup, ScopeResolver};
pub use subcomponent::{FinalComponents, SubcomponentFinalizer};
