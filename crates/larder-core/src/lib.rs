//! Core library of the larder weekly meal planner.
//!
//! The planning pipeline: [`acquire::PoolAcquirer`] fills the typed pools
//! of a [`store::CandidateStore`] from the user's collections and the
//! recipe search index; [`allocate`] draws a deduplicated weekly plan from
//! those pools under time/ingredient/ratio constraints; [`suggest`]
//! resolves partial ingredient queries through a layered search fallback.
//! [`context::PlannerContext`] owns one session's state and exposes the
//! boundary operations.
//!
//! External services are reached through the object-safe traits in
//! [`services`]; HTTP adapters live in the `larder-http` crate and test
//! fakes in `larder-test-utils`.

pub mod acquire;
pub mod allocate;
pub mod calendar;
pub mod candidate;
pub mod context;
pub mod error;
pub mod locale;
pub mod services;
pub mod slot;
pub mod store;
pub mod suggest;
