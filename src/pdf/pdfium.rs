//! Form engine backed by PDFium

use crate::error::{Error, Result};
use crate::form::{FieldDescriptor, FieldType, FormBackend, FormEngine};
use pdfium_render::prelude::*;

/// Values that leave a checkbox unchecked (compared case-insensitively)
const UNCHECKED_VALUES: &[&str] = &["", "off", "false", "no", "0"];

/// Get PDFium instance (creates new instance each time - PDFium is not thread-safe)
fn create_pdfium() -> Result<Pdfium> {
    // Try to bind to system library or use static linking
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Error::Pdfium {
            reason: format!("Failed to initialize PDFium: {}", e),
        })?;

    Ok(Pdfium::new(bindings))
}

fn pdfium_error(e: PdfiumError) -> Error {
    Error::Pdfium {
        reason: format!("{}", e),
    }
}

/// Whether a string value should check a checkbox
pub(crate) fn is_checked_value(value: &str) -> bool {
    let value = value.trim();
    !UNCHECKED_VALUES
        .iter()
        .any(|unchecked| unchecked.eq_ignore_ascii_case(value))
}

fn field_type_of(field: &PdfFormField) -> FieldType {
    if field.as_text_field().is_some() {
        FieldType::Text
    } else if field.as_checkbox_field().is_some() {
        FieldType::Checkbox
    } else if field.as_radio_button_field().is_some() {
        FieldType::RadioButton
    } else if field.as_combo_box_field().is_some() {
        FieldType::ComboBox
    } else if field.as_list_box_field().is_some() {
        FieldType::ListBox
    } else if field.as_push_button_field().is_some() {
        FieldType::PushButton
    } else if field.as_signature_field().is_some() {
        FieldType::Signature
    } else {
        FieldType::Unknown
    }
}

fn checked_text(checked: bool) -> &'static str {
    if checked {
        "Yes"
    } else {
        "Off"
    }
}

/// Whether a write of `value` leaves a radio group as it already is.
///
/// `selected` is the group value PDFium reports, with "Off" meaning nothing
/// is selected.
fn radio_request_is_current(selected: Option<&str>, value: &str) -> bool {
    let value = value.trim().trim_start_matches('/');
    match selected.filter(|s| !s.eq_ignore_ascii_case("off")) {
        Some(selected) => selected == value,
        None => !is_checked_value(value),
    }
}

/// Labels of the selected options, comma separated
fn selected_labels(options: &PdfFormFieldOptions) -> String {
    (0..options.len())
        .filter_map(|i| options.get(i).ok())
        .filter(|option| option.is_set())
        .filter_map(|option| option.label().cloned())
        .collect::<Vec<_>>()
        .join(",")
}

/// Current value of one widget as text
fn widget_value(field: &PdfFormField) -> String {
    if let Some(text_field) = field.as_text_field() {
        text_field.value().unwrap_or_default()
    } else if let Some(checkbox) = field.as_checkbox_field() {
        checked_text(checkbox.is_checked().unwrap_or(false)).to_string()
    } else if let Some(radio) = field.as_radio_button_field() {
        checked_text(radio.is_checked().unwrap_or(false)).to_string()
    } else if let Some(combo) = field.as_combo_box_field() {
        selected_labels(combo.options())
    } else if let Some(list) = field.as_list_box_field() {
        selected_labels(list.options())
    } else {
        String::new()
    }
}

/// A document loaded into PDFium
pub struct PdfiumForm<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumForm<'a> {
    pub fn new(document: PdfDocument<'a>) -> Self {
        Self { document }
    }
}

impl FormEngine for PdfiumForm<'_> {
    fn field_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for page in self.document.pages().iter() {
            for annotation in page.annotations().iter() {
                if let Some(name) = annotation.as_form_field().and_then(|f| f.name()) {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }

    fn field(&self, name: &str) -> Result<FieldDescriptor> {
        let mut descriptor: Option<FieldDescriptor> = None;

        for page in self.document.pages().iter() {
            for annotation in page.annotations().iter() {
                let Some(field) = annotation.as_form_field() else {
                    continue;
                };
                if field.name().as_deref() != Some(name) {
                    continue;
                }

                let value = widget_value(field);
                if let Some(d) = descriptor.as_mut() {
                    // Radio groups span several widgets; the group is on if any widget is.
                    if d.field_type == FieldType::RadioButton && value == "Yes" {
                        d.value = value;
                    }
                } else {
                    descriptor = Some(FieldDescriptor::new(name, field_type_of(field), value));
                }
            }
        }

        descriptor.ok_or_else(|| Error::FieldNotFound {
            name: name.to_string(),
        })
    }

    fn set_field(&mut self, name: &str, value: &str) -> Result<()> {
        let mut matched = false;

        let pages = self.document.pages();
        for page_index in 0..pages.len() {
            let page = pages.get(page_index).map_err(|e| Error::Pdfium {
                reason: format!("Failed to get page {}: {}", page_index + 1, e),
            })?;

            for mut annotation in page.annotations().iter() {
                let Some(field) = annotation.as_form_field_mut() else {
                    continue;
                };
                if field.name().as_deref() != Some(name) {
                    continue;
                }
                matched = true;

                let field_type = field_type_of(field);
                if let Some(text_field) = field.as_text_field_mut() {
                    text_field.set_value(value).map_err(pdfium_error)?;
                } else if let Some(checkbox) = field.as_checkbox_field_mut() {
                    checkbox
                        .set_checked(is_checked_value(value))
                        .map_err(pdfium_error)?;
                } else if let Some(radio) = field.as_radio_button_field() {
                    // pdfium-render keeps option export values private, and its
                    // set_checked writes to stdout, so a group can only be confirmed.
                    let selected = radio.group_value();
                    if !radio_request_is_current(selected.as_deref(), value) {
                        return Err(Error::InvalidFieldData {
                            reason: format!(
                                "Radio button {} cannot be set to {:?}: option export values are not readable",
                                name, value
                            ),
                        });
                    }
                } else {
                    return Err(Error::UnsupportedField {
                        name: name.to_string(),
                        field_type: field_type.to_string(),
                    });
                }
            }
        }

        if matched {
            Ok(())
        } else {
            Err(Error::FieldNotFound {
                name: name.to_string(),
            })
        }
    }

    fn save_to_bytes(&self) -> Result<Vec<u8>> {
        self.document.save_to_bytes().map_err(|e| Error::Pdfium {
            reason: format!("Failed to save modified PDF: {}", e),
        })
    }
}

/// Production [`FormBackend`] that loads documents with PDFium
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumBackend;

impl PdfiumBackend {
    /// Whether a PDFium library can be bound on this machine
    pub fn is_available() -> bool {
        create_pdfium().is_ok()
    }
}

impl FormBackend for PdfiumBackend {
    fn with_form(
        &self,
        data: &[u8],
        password: Option<&str>,
        f: &mut dyn FnMut(&mut dyn FormEngine) -> Result<()>,
    ) -> Result<()> {
        if data.len() < 4 || &data[0..4] != b"%PDF" {
            return Err(Error::InvalidPdf {
                reason: "Not a valid PDF file".to_string(),
            });
        }

        let pdfium = create_pdfium()?;

        let document = pdfium
            .load_pdf_from_byte_slice(data, password)
            .map_err(|e| match e {
                PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
                    if password.is_some() {
                        Error::IncorrectPassword
                    } else {
                        Error::PasswordRequired
                    }
                }
                _ => pdfium_error(e),
            })?;

        let mut form = PdfiumForm::new(document);
        f(&mut form)
    }
}
