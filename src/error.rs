//! Error types shared across the reader

use pdfium_render::prelude::PdfiumError;
use thiserror::Error;

/// Errors that can occur while loading documents or settings
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF engine error: {0}")]
    Pdf(#[from] PdfiumError),

    /// A single page failed to rasterize
    #[error("page {index} could not be rendered: {reason}")]
    Render { index: usize, reason: String },

    /// PDFium addresses pages with 16-bit indices
    #[error("page index {0} is out of range for the PDF engine")]
    PageIndex(usize),

    #[error("invalid settings file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("could not serialize settings: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
