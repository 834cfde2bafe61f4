//! Text extraction from plain text and markdown documents

use crate::error::Result;
use pulldown_cmark::{Event, Parser, Tag};
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).await?;
        Ok(content)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = fs::read_to_string(path).await?;
        Ok(Self::to_plain_text(&markdown_content))
    }
}

impl MarkdownExtractor {
    /// Keep the text content of a markdown document, one block per line
    pub fn to_plain_text(markdown: &str) -> String {
        let mut output = String::new();

        for event in Parser::new(markdown) {
            match event {
                Event::Text(text) | Event::Code(text) => output.push_str(&text),
                Event::SoftBreak | Event::HardBreak => output.push(' '),
                Event::Start(Tag::Item) => output.push('\n'),
                Event::End(Tag::Paragraph) | Event::End(Tag::Heading(..)) | Event::End(Tag::CodeBlock(_)) => {
                    output.push('\n')
                }
                _ => {}
            }
        }

        output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
