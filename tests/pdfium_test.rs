//! Form engine tests against real AcroForm documents
//!
//! `form.pdf` holds text fields `Name` (Ada) and `name` (Grace), an unchecked
//! checkbox `Agree`, a radio group `choice` with options A (selected) and B,
//! and a combo box `Color`. `protected.pdf` needs the user password `secret`.
//!
//! Each test returns early when no PDFium library can be bound.

use pdf_form_filler::form::{FieldDescriptor, FieldType, FormBackend};
use pdf_form_filler::{Error, PdfService, PdfiumBackend, Result};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn fixture(name: &str) -> Vec<u8> {
    std::fs::read(fixture_path(name)).expect("Failed to read fixture")
}

fn pdfium_missing() -> bool {
    if PdfiumBackend::is_available() {
        false
    } else {
        eprintln!("PDFium library not found, skipping");
        true
    }
}

/// Read one field by its exact name
fn exact_field(data: &[u8], name: &str) -> Result<FieldDescriptor> {
    let mut found = None;
    PdfiumBackend.with_form(data, None, &mut |form| {
        found = Some(form.field(name)?);
        Ok(())
    })?;
    Ok(found.expect("with_form ran the closure"))
}

// ============================================================================
// Reading
// ============================================================================

#[test]
fn test_read_fixture_fields() {
    if pdfium_missing() {
        return;
    }

    let fields = PdfService::new()
        .get_form_fields(&fixture("form.pdf"), None)
        .expect("Failed to read form fields");

    // `name` folds into `Name`, the first spelling in the document
    assert_eq!(
        fields.keys().collect::<Vec<_>>(),
        vec!["Agree", "choice", "Color", "Name"]
    );

    let name = fields.get("Name").unwrap();
    assert_eq!(name.field_type, FieldType::Text);
    assert_eq!(name.value, "Ada");

    let agree = fields.get("Agree").unwrap();
    assert_eq!(agree.field_type, FieldType::Checkbox);
    assert_eq!(agree.value, "Off");

    let choice = fields.get("choice").unwrap();
    assert_eq!(choice.field_type, FieldType::RadioButton);
    assert_eq!(choice.value, "Yes");

    assert_eq!(fields.get("color").unwrap().field_type, FieldType::ComboBox);
}

#[test]
fn test_exact_lookup_keeps_case_variants_apart() {
    if pdfium_missing() {
        return;
    }

    let data = fixture("form.pdf");
    assert_eq!(exact_field(&data, "Name").unwrap().value, "Ada");
    assert_eq!(exact_field(&data, "name").unwrap().value, "Grace");
    assert!(matches!(
        exact_field(&data, "NAME"),
        Err(Error::FieldNotFound { .. })
    ));
}

// ============================================================================
// Filling
// ============================================================================

#[test]
fn test_fill_text_and_checkbox_survive_save() {
    if pdfium_missing() {
        return;
    }

    let service = PdfService::new();
    let (output, report) = service
        .fill_form(
            &fixture("form.pdf"),
            None,
            [("name", "Hopper"), ("AGREE", "yes")],
        )
        .expect("Failed to fill form");

    assert_eq!(report.fields_filled, 2);
    assert!(report.fields_skipped.is_empty());

    assert_eq!(exact_field(&output, "name").unwrap().value, "Hopper");
    assert_eq!(exact_field(&output, "Name").unwrap().value, "Ada");
    assert_eq!(exact_field(&output, "Agree").unwrap().value, "Yes");
}

#[test]
fn test_fill_checkbox_off_after_on() {
    if pdfium_missing() {
        return;
    }

    let service = PdfService::new();
    let (checked, _) = service
        .fill_form(&fixture("form.pdf"), None, [("Agree", "Yes")])
        .unwrap();
    let (unchecked, report) = service
        .fill_form(&checked, None, [("Agree", "Off")])
        .unwrap();

    assert_eq!(report.fields_filled, 1);
    assert_eq!(exact_field(&unchecked, "Agree").unwrap().value, "Off");
}

#[test]
fn test_fill_radio_with_selected_option() {
    if pdfium_missing() {
        return;
    }

    let (output, report) = PdfService::new()
        .fill_form(&fixture("form.pdf"), None, [("choice", "A")])
        .unwrap();

    assert_eq!(report.fields_filled, 1);
    assert!(report.fields_skipped.is_empty());
    assert_eq!(exact_field(&output, "choice").unwrap().value, "Yes");
}

#[test]
fn test_fill_radio_with_other_option_is_skipped() {
    if pdfium_missing() {
        return;
    }

    let (output, report) = PdfService::new()
        .fill_form(&fixture("form.pdf"), None, [("choice", "B"), ("Name", "Lovelace")])
        .unwrap();

    assert_eq!(report.fields_filled, 1);
    assert_eq!(report.fields_skipped.len(), 1);
    assert_eq!(report.fields_skipped[0].name, "choice");
    assert!(report.fields_skipped[0].reason.contains("export values"));

    // The group keeps its selection and the rest of the fill still lands
    assert_eq!(exact_field(&output, "choice").unwrap().value, "Yes");
    assert_eq!(exact_field(&output, "Name").unwrap().value, "Lovelace");
}

#[test]
fn test_fill_unknown_field_is_skipped() {
    if pdfium_missing() {
        return;
    }

    let (_, report) = PdfService::new()
        .fill_form(&fixture("form.pdf"), None, [("Missing", "x")])
        .unwrap();

    assert_eq!(report.fields_filled, 0);
    assert_eq!(report.fields_skipped[0].reason, "Field not found in PDF");
}

// ============================================================================
// Passwords
// ============================================================================

#[test]
fn test_protected_pdf_without_password() {
    if pdfium_missing() {
        return;
    }

    let result = PdfService::new().get_form_fields(&fixture("protected.pdf"), None);
    assert!(matches!(result, Err(Error::PasswordRequired)));
}

#[test]
fn test_protected_pdf_wrong_password() {
    if pdfium_missing() {
        return;
    }

    let result = PdfService::new().get_form_fields(&fixture("protected.pdf"), Some("wrong"));
    assert!(matches!(result, Err(Error::IncorrectPassword)));
}

#[test]
fn test_protected_pdf_with_password() {
    if pdfium_missing() {
        return;
    }

    let fields = PdfService::new()
        .get_form_fields(&fixture("protected.pdf"), Some("secret"))
        .expect("Failed to open protected PDF");
    assert!(fields.is_empty());
}
