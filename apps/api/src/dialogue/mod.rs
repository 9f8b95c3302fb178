//! Dialogue: the per-user conversation state machine and its flows.

pub mod compile;
mod cover_letter;
pub mod engine;
pub mod grading;
pub mod handlers;
mod interview;
pub mod menu;
pub mod models;
pub mod prompts;
mod resume;
mod vacancy_search;

#[cfg(test)]
pub mod testing;

pub use engine::{DialogueEngine, DialogueSettings};
