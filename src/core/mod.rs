//! Core business logic - framework-agnostic repositories, policies and generators.
//!
//! Nothing in here depends on poise or serenity; the bot layer converts Discord types
//! into the plain inputs these functions take.

/// Owner gate and elevated-role checks
pub mod access;
/// Admission of inbound interactions
pub mod dispatch;
/// Weekly form link storage and expiry evaluation
pub mod form;
/// Guild repository
pub mod guild;
/// Best-effort error channel for bookkeeping writes
pub mod non_fatal;
/// Random number, coin and dice generation
pub mod random;
/// Command descriptors and the name-keyed registry
pub mod registry;
/// Usage log and aggregate statistics
pub mod usage;
/// User repository
pub mod user;
