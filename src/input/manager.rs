//! Input manager for reading free-form text documents

use crate::error::{Result, SkillBridgeError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PlainTextExtractor, TextExtractor};
use log::info;
use std::collections::HashMap;
use std::path::Path;

pub struct InputManager {
    cache: HashMap<String, String>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        let path_str = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(&path_str) {
                info!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        if !path.exists() {
            return Err(SkillBridgeError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let file_type = self.detect_file_type(path)?;
        if !file_type.is_document() {
            return Err(SkillBridgeError::UnsupportedFormat(format!(
                "Expected a .txt or .md document: {}",
                path.display()
            )));
        }

        let text = if file_type == FileType::Markdown {
            info!("Processing markdown file: {}", path.display());
            MarkdownExtractor.extract(path).await?
        } else {
            info!("Reading plain text file: {}", path.display());
            PlainTextExtractor.extract(path).await?
        };

        if self.enable_cache {
            self.cache.insert(path_str, text.clone());
        }

        Ok(text)
    }

    /// Inline text wins; otherwise the file is read. One of the two is required.
    pub async fn text_or_file(&mut self, inline: Option<&str>, path: Option<&Path>, what: &str) -> Result<String> {
        match (inline, path) {
            (Some(text), _) => Ok(text.to_string()),
            (None, Some(path)) => self.extract_text(path).await,
            (None, None) => Err(SkillBridgeError::InvalidInput(format!(
                "Provide the {} as text or as a file",
                what
            ))),
        }
    }

    fn detect_file_type(&self, path: &Path) -> Result<FileType> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| SkillBridgeError::InvalidInput(format!("File has no extension: {}", path.display())))?;

        Ok(FileType::from_extension(extension))
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
