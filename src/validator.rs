//! Upload validation.
//!
//! Checks run in two stages. [`DocumentValidator::validate`] looks at the raw
//! bytes and declared content type before anything is parsed;
//! [`DocumentValidator::validate_page_count`] runs right after the structural
//! load. Both stages only read, so a rejected document is never partially
//! mutated.

use crate::config::EngineConfig;
use crate::error::{Error, Result};

/// Enforces the size ceiling, page-count ceiling and content type.
#[derive(Debug, Clone)]
pub struct DocumentValidator {
    max_file_size: usize,
    max_page_count: u32,
    content_type: String,
}

impl DocumentValidator {
    /// Build a validator from engine configuration.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            max_page_count: config.max_page_count,
            content_type: config.content_type.to_ascii_lowercase(),
        }
    }

    /// Validate raw upload bytes and their declared content type.
    pub fn validate(&self, bytes: &[u8], declared_content_type: &str) -> Result<()> {
        if bytes.is_empty() {
            return Err(Error::invalid("file is empty"));
        }

        if bytes.len() > self.max_file_size {
            return Err(Error::invalid(format!(
                "file size {} bytes exceeds the limit of {} bytes",
                bytes.len(),
                self.max_file_size
            )));
        }

        let essence = mime_essence(declared_content_type);
        if essence != self.content_type {
            return Err(Error::invalid(format!(
                "unsupported content type '{}', expected '{}'",
                declared_content_type.trim(),
                self.content_type
            )));
        }

        Ok(())
    }

    /// Validate the page count of a freshly loaded document.
    pub fn validate_page_count(&self, page_count: u32) -> Result<()> {
        if page_count > self.max_page_count {
            return Err(Error::invalid(format!(
                "document has {} pages, the limit is {}",
                page_count, self.max_page_count
            )));
        }
        Ok(())
    }
}

/// `type/subtype` part of a MIME string, lowercased, parameters dropped.
fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}
