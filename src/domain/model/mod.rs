//! Language model domain module

mod entity;
mod registry;
mod repository;
mod schema;

pub use entity::{LanguageModel, ModelId, Vendor};
pub use registry::ParameterSchemaRegistry;
pub use repository::ModelRepository;
pub use schema::{ParameterDefinition, ParameterSchema};
