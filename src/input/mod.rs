//! Role catalog, CSV corpora and free-form text documents

pub mod catalog;
pub mod corpus;
pub mod file_detector;
pub mod manager;
pub mod text_extractor;

pub use catalog::{RoleCatalog, RoleLookup, RoleRequirement, RoleResolution};
pub use manager::InputManager;
