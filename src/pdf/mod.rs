//! PDF processing layer
//!
//! This module provides the PDFium implementation of the form engine.

mod pdfium;

pub use pdfium::{PdfiumBackend, PdfiumForm};
