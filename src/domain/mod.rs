//! Domain logic - pure version and naming rules independent of git operations

pub mod branch;
pub mod distribution;
pub mod semver_tag;
pub mod tag;
pub mod version;

pub use branch::{checkout_states, BranchState, TrackedBranch};
pub use distribution::Distribution;
pub use semver_tag::Semver;
pub use tag::{sweekt_counter, TriggerRef};
pub use version::{BaseVersion, GradleVersion};
