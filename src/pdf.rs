//! PDF rendering and document handling

use crate::error::{Error, Result};
use image::RgbaImage;
use pdfium_render::prelude::*;
use std::fs;
use std::path::Path;

/// Initialize the PDFium library
///
/// Looks next to the working directory first, then in `/usr/lib`, then
/// falls back to whatever the system loader finds.
pub fn init_pdfium() -> Result<Pdfium> {
    let lib_name = if cfg!(target_os = "windows") {
        "pdfium.dll"
    } else if cfg!(target_os = "macos") {
        "libpdfium.dylib"
    } else {
        "libpdfium.so"
    };

    let bindings = Pdfium::bind_to_library(format!("./{}", lib_name))
        .or_else(|_| Pdfium::bind_to_library(format!("/usr/lib/{}", lib_name)))
        .or_else(|_| Pdfium::bind_to_system_library())?;

    Ok(Pdfium::new(bindings))
}

/// Anything that can hand out page bitmaps by index
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Rasterizes page `index` at `target_width` pixels wide, keeping its aspect ratio
    fn render_page(&self, index: usize, target_width: u32) -> Result<RgbaImage>;
}

/// [`PageSource`] backed by a PDFium document
pub struct PdfiumSource<'a> {
    document: pdfium_render::prelude::PdfDocument<'a>,
}

impl<'a> PdfiumSource<'a> {
    pub fn open(pdfium: &'a Pdfium, path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(pdfium, bytes)
    }

    pub fn from_bytes(pdfium: &'a Pdfium, bytes: Vec<u8>) -> Result<Self> {
        let document = pdfium.load_pdf_from_byte_vec(bytes, None)?;
        Ok(Self { document })
    }
}

impl PageSource for PdfiumSource<'_> {
    fn page_count(&self) -> usize {
        usize::from(self.document.pages().len())
    }

    fn render_page(&self, index: usize, target_width: u32) -> Result<RgbaImage> {
        let page_index = u16::try_from(index).map_err(|_| Error::PageIndex(index))?;
        let page = self.document.pages().get(page_index)?;

        let width = i32::try_from(target_width).unwrap_or(i32::MAX);
        let render_config = PdfRenderConfig::new().set_target_width(width);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|err| Error::Render {
                index,
                reason: err.to_string(),
            })?;
        Ok(bitmap.as_image().to_rgba8())
    }
}

/// A fully decoded document: every page held in memory as RGBA
#[derive(Debug, Clone)]
pub struct Document {
    title: String,
    pages: Vec<RgbaImage>,
}

impl Document {
    pub fn new(title: impl Into<String>, pages: Vec<RgbaImage>) -> Self {
        Self {
            title: title.into(),
            pages,
        }
    }

    /// Eagerly rasterizes every page of `source`. Fails on the first page that does not render.
    pub fn decode(
        title: impl Into<String>,
        source: &dyn PageSource,
        target_width: u32,
    ) -> Result<Self> {
        let count = source.page_count();
        let mut pages = Vec::with_capacity(count);
        for index in 0..count {
            pages.push(source.render_page(index, target_width)?);
        }
        Ok(Self::new(title, pages))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn pages(&self) -> &[RgbaImage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Name shown for a file: its name without the last extension
pub fn display_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "Document".to_string())
}

/// Opens and fully decodes the PDF at `path`
pub fn load_document(path: &Path, target_width: u32) -> Result<Document> {
    let pdfium = init_pdfium()?;
    let source = PdfiumSource::open(&pdfium, path)?;
    tracing::debug!(
        "Decoding {} pages from {} at {}px",
        source.page_count(),
        path.display(),
        target_width
    );
    Document::decode(display_title(path), &source, target_width)
}
