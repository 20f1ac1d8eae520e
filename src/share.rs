use std::path::Path;

use serde::{Deserialize, Serialize};

/// Передаёт готовый файл пользователю.
pub trait Sharer {
    fn share(&self, path: &Path) -> ShareResult;
}

/// Способ передачи файла пользователю.
#[derive(Serialize, Deserialize, Default, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShareMethod {
    /// Путь до файла копируется в буфер обмена.
    #[default]
    Clipboard,

    /// Путь до файла печатается в stdout.
    Print,
}

impl ShareMethod {
    pub fn sharer(self) -> Box<dyn Sharer> {
        match self {
            Self::Clipboard => Box::new(ClipboardSharer),
            Self::Print => Box::new(PrintSharer),
        }
    }
}

pub struct ClipboardSharer;

impl Sharer for ClipboardSharer {
    fn share(&self, path: &Path) -> ShareResult {
        cli_clipboard::set_contents(path.display().to_string())
            .map_err(|e| ShareError::Clipboard(e.to_string()))?;

        println!("Document path copied to clipboard: {}", path.display());

        Ok(())
    }
}

pub struct PrintSharer;

impl Sharer for PrintSharer {
    fn share(&self, path: &Path) -> ShareResult {
        println!("{}", path.display());
        Ok(())
    }
}

pub type ShareResult = std::result::Result<(), ShareError>;

#[derive(thiserror::Error, Debug)]
pub enum ShareError {
    #[error("copy to clipboard: {0}")]
    Clipboard(String),
}
