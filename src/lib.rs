//! Skill gap analysis and retrieval-grounded job matching

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod processing;
pub mod llm;
pub mod output;

pub use error::{Result, SkillBridgeError};
pub use config::Config;
