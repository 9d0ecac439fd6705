//! Hit-and-run compliance rules.
//!
//! A session is *unsatisfied* when the user downloaded more than the
//! configured buffer share of a torrent, has not seeded it for the required
//! time and is not immune. The rules here are pure functions over a record
//! and its torrent; the query layer composes them into filters.

mod evaluator;
mod policy;
mod types;

pub use evaluator::ComplianceEvaluator;
pub use policy::HitRunPolicy;
pub use types::{ComplianceStatus, TriState, UnsatisfiedMode};
