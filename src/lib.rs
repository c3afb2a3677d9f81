//! Workflow execution engine for collections automations.
//!
//! A stored automation graph (triggers, switches, approval and interactive
//! gates, timed waits, actions) is walked against a business event. Every
//! visited node leaves an append-only step record; dry runs take the same
//! branching decisions without halting on waits or enqueueing actions.

pub mod compiler;
pub mod config;
pub mod dsl;
pub mod error;
pub mod nodes;
pub mod runtime;
