//! PDF engine capabilities used by the form operations
//!
//! The crate never parses or writes PDF bytes itself. A [`FormBackend`]
//! loads a document and hands out a [`FormEngine`], which exposes the four
//! capabilities the form operations need: enumerate fields, read a field,
//! set a field, and serialize the document.

use super::case_map::CaseInsensitiveMap;
use super::normalize::{
    try_extract_field_metadata, FieldDescriptor, FieldDescriptorMap, NormalizedFieldMap,
};
use crate::error::{Error, Result};
use std::collections::HashSet;

/// One loaded document with an interactive form
pub trait FormEngine {
    /// All field names in the form, in document order. May contain duplicates.
    fn field_names(&self) -> Result<Vec<String>>;

    /// Type and current value of the field with exactly this name
    fn field(&self, name: &str) -> Result<FieldDescriptor>;

    /// Set the value of the field with exactly this name
    fn set_field(&mut self, name: &str, value: &str) -> Result<()>;

    /// Serialize the (possibly modified) document
    fn save_to_bytes(&self) -> Result<Vec<u8>>;
}

/// Loads raw PDF bytes into a [`FormEngine`]
pub trait FormBackend: Send + Sync {
    /// Load `data` and run `f` against the loaded form.
    ///
    /// The engine only lives for the duration of the call.
    fn with_form(
        &self,
        data: &[u8],
        password: Option<&str>,
        f: &mut dyn FnMut(&mut dyn FormEngine) -> Result<()>,
    ) -> Result<()>;
}

/// Result of filling form fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Number of fields successfully filled
    pub fields_filled: u32,
    /// Fields that could not be filled
    pub fields_skipped: Vec<SkippedField>,
}

/// Info about a field that could not be filled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedField {
    /// Field name as supplied by the caller
    pub name: String,
    /// Reason the field was skipped
    pub reason: String,
}

/// Write prepared values into the form.
///
/// A name that exists in the document with exactly that spelling is written
/// as is. Otherwise it is matched case-insensitively against the document's
/// field names, and the first spelling in the document wins. A field that
/// cannot be written is reported in [`FillReport::fields_skipped`] and does
/// not abort the fill.
pub fn fill_form<E>(form: &mut E, values: &NormalizedFieldMap) -> Result<FillReport>
where
    E: FormEngine + ?Sized,
{
    let names = form.field_names()?;
    let exact_names: HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut document_names: CaseInsensitiveMap<()> = CaseInsensitiveMap::new();
    for name in &names {
        document_names.insert_if_absent(name.as_str(), ());
    }

    let mut report = FillReport::default();
    for (name, value) in values {
        // An exact spelling in the document beats its case-insensitive representative
        let target = if exact_names.contains(name) {
            name
        } else if let Some((representative, _)) = document_names.get_key_value(name) {
            representative
        } else {
            report.fields_skipped.push(SkippedField {
                name: name.to_string(),
                reason: "Field not found in PDF".to_string(),
            });
            continue;
        };

        match form.set_field(target, value) {
            Ok(()) => {
                tracing::debug!(field = %target, "Filled form field");
                report.fields_filled += 1;
            }
            Err(e) => {
                tracing::debug!(field = %target, error = %e, "Skipped form field");
                report.fields_skipped.push(SkippedField {
                    name: name.to_string(),
                    reason: skip_reason(&e),
                });
            }
        }
    }

    Ok(report)
}

fn skip_reason(error: &Error) -> String {
    match error {
        Error::FieldNotFound { .. } => "Field not found in PDF".to_string(),
        Error::UnsupportedField { field_type, .. } => {
            format!("Unsupported field type for writing: {}", field_type)
        }
        other => format!("Failed to set value: {}", other),
    }
}

/// Read the metadata of every field in the form
pub fn read_form_fields<E>(form: &E) -> Result<FieldDescriptorMap>
where
    E: FormEngine + ?Sized,
{
    let names = form.field_names()?;
    try_extract_field_metadata(names, |name| form.field(name))
}

/// Load a document, fill it, and return the serialized result
pub fn fill_document(
    backend: &dyn FormBackend,
    data: &[u8],
    password: Option<&str>,
    values: &NormalizedFieldMap,
) -> Result<(Vec<u8>, FillReport)> {
    let mut outcome = None;
    backend.with_form(data, password, &mut |form| {
        let report = fill_form(&mut *form, values)?;
        let bytes = form.save_to_bytes()?;
        outcome = Some((bytes, report));
        Ok(())
    })?;

    outcome.ok_or_else(|| Error::Pdfium {
        reason: "Form backend returned without filling the document".to_string(),
    })
}

/// Load a document and read its field metadata
pub fn read_document_fields(
    backend: &dyn FormBackend,
    data: &[u8],
    password: Option<&str>,
) -> Result<FieldDescriptorMap> {
    let mut outcome = None;
    backend.with_form(data, password, &mut |form| {
        outcome = Some(read_form_fields(&*form)?);
        Ok(())
    })?;

    outcome.ok_or_else(|| Error::Pdfium {
        reason: "Form backend returned without reading the document".to_string(),
    })
}
