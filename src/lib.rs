//! PDF Form Filler Library
//!
//! This crate fills PDF form fields and reads form field metadata:
//! - `form`: case-insensitive field-name normalization and the form operations
//! - `pdf`: the PDFium-backed form engine
//! - `service`: fill from key/value pairs or JSON files, read fields, download PDFs
//! - `server`: MCP tools `fill_form`, `get_form_fields`, and `generate_file`

pub mod error;
pub mod form;
pub mod pdf;
pub mod server;
pub mod service;
pub mod source;

pub use error::{Error, Result};
pub use form::{
    extract_field_metadata, prepare_field_values, CaseInsensitiveMap, FieldDescriptor,
    FieldDescriptorMap, FieldType, FillReport, FormBackend, FormEngine, NormalizedFieldMap,
};
pub use server::{
    run_server, run_server_with_config, FillFormParams, GetFormFieldsParams, PdfServer, PdfSource,
    ServerConfig,
};
pub use pdf::PdfiumBackend;
pub use service::{parse_field_data, PdfService};
