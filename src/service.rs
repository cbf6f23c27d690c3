//! Form filling service
//!
//! Wires the form operations to a [`FormBackend`], to JSON field data, and
//! to file and network I/O.

use crate::error::{Error, Result};
use crate::form::{
    fill_document, prepare_field_values, read_document_fields, FieldDescriptorMap, FillReport,
    FormBackend,
};
use crate::pdf::PdfiumBackend;
use crate::source::{resolve_path, resolve_url};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Decode field data from a flat JSON object.
///
/// Object order is preserved. Strings are taken verbatim, numbers and
/// booleans as their JSON text, and `null` as the empty string.
pub fn parse_field_data(json_text: &str) -> Result<Vec<(String, String)>> {
    let value: Value = serde_json::from_str(json_text)?;
    let Value::Object(object) = value else {
        return Err(Error::InvalidFieldData {
            reason: "Field data must be a JSON object".to_string(),
        });
    };

    object
        .into_iter()
        .map(|(name, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(Error::InvalidFieldData {
                        reason: format!("Value for field {} must be a scalar", name),
                    })
                }
            };
            Ok((name, text))
        })
        .collect()
}

/// Fills forms and reads form metadata through a [`FormBackend`]
#[derive(Clone)]
pub struct PdfService {
    backend: Arc<dyn FormBackend>,
}

impl PdfService {
    /// Create a service backed by PDFium
    pub fn new() -> Self {
        Self::with_backend(Arc::new(PdfiumBackend))
    }

    pub fn with_backend(backend: Arc<dyn FormBackend>) -> Self {
        Self { backend }
    }

    /// Fill form fields and return the filled PDF bytes.
    ///
    /// Field names may use `$` for `.` and are matched case-insensitively.
    pub fn fill_form<I, K, V>(
        &self,
        data: &[u8],
        password: Option<&str>,
        fields: I,
    ) -> Result<(Vec<u8>, FillReport)>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let values = prepare_field_values(fields);
        let (output, report) = fill_document(self.backend.as_ref(), data, password, &values)?;

        tracing::info!(
            fields_filled = report.fields_filled,
            fields_skipped = report.fields_skipped.len(),
            "Filled PDF form"
        );
        Ok((output, report))
    }

    /// Read every form field, deduplicated and sorted case-insensitively
    pub fn get_form_fields(&self, data: &[u8], password: Option<&str>) -> Result<FieldDescriptorMap> {
        let fields = read_document_fields(self.backend.as_ref(), data, password)?;
        tracing::debug!(total_fields = fields.len(), "Read PDF form fields");
        Ok(fields)
    }

    /// Fill `in_file` with the JSON field data in `json_file` and write `out_file`
    pub fn generate_file(
        &self,
        in_file: impl AsRef<Path>,
        json_file: impl AsRef<Path>,
        out_file: impl AsRef<Path>,
    ) -> Result<FillReport> {
        let json_text = std::fs::read_to_string(json_file.as_ref())?;
        let fields = parse_field_data(&json_text)?;
        let input = resolve_path(in_file.as_ref())?;

        let (output, report) = self.fill_form(&input.data, None, fields)?;
        std::fs::write(out_file.as_ref(), output)?;

        tracing::info!(
            input = %input.source_name,
            output = %out_file.as_ref().display(),
            "Generated filled PDF"
        );
        Ok(report)
    }

    /// Download a PDF from an absolute URL
    pub async fn download_url(
        &self,
        url: &str,
        allow_private_urls: bool,
        max_download_bytes: u64,
    ) -> Result<Vec<u8>> {
        resolve_url(url, allow_private_urls, max_download_bytes)
            .await
            .map(|resolved| resolved.data)
    }
}

impl Default for PdfService {
    fn default() -> Self {
        Self::new()
    }
}
