//! Prompt domain module

mod entity;
mod repository;

pub use entity::{ConfigPayload, OrgId, Prompt, PromptId, PromptSnapshot};
pub use repository::PromptRepository;
