//! Field-name normalization and form-field metadata extraction

use super::case_map::CaseInsensitiveMap;
use std::convert::Infallible;

/// Character callers may use in place of the hierarchical separator
pub const ESCAPED_SEPARATOR: char = '$';

/// Separator between the parts of a hierarchical (fully qualified) field name
pub const FIELD_SEPARATOR: char = '.';

/// Field values keyed case-insensitively by fully qualified field name
pub type NormalizedFieldMap = CaseInsensitiveMap<String>;

/// Field descriptors keyed case-insensitively by representative field name
pub type FieldDescriptorMap = CaseInsensitiveMap<FieldDescriptor>;

/// AcroForm field type with stable numeric identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldType {
    #[default]
    Unknown,
    PushButton,
    Checkbox,
    RadioButton,
    Text,
    ListBox,
    ComboBox,
    Signature,
}

impl FieldType {
    /// Numeric type identifier
    pub fn id(self) -> u8 {
        match self {
            FieldType::Unknown => 0,
            FieldType::PushButton => 1,
            FieldType::Checkbox => 2,
            FieldType::RadioButton => 3,
            FieldType::Text => 4,
            FieldType::ListBox => 5,
            FieldType::ComboBox => 6,
            FieldType::Signature => 7,
        }
    }

    pub fn from_id(id: u8) -> Self {
        match id {
            1 => FieldType::PushButton,
            2 => FieldType::Checkbox,
            3 => FieldType::RadioButton,
            4 => FieldType::Text,
            5 => FieldType::ListBox,
            6 => FieldType::ComboBox,
            7 => FieldType::Signature,
            _ => FieldType::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Unknown => "unknown",
            FieldType::PushButton => "push_button",
            FieldType::Checkbox => "checkbox",
            FieldType::RadioButton => "radio_button",
            FieldType::Text => "text",
            FieldType::ListBox => "list_box",
            FieldType::ComboBox => "combo_box",
            FieldType::Signature => "signature",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata about one form field as reported by the PDF engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    /// Current value, empty when the field has none
    pub value: String,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type,
            value: value.into(),
        }
    }
}

/// Translate escaped separators in a field name (`a$b` -> `a.b`)
pub fn unescape_field_name(name: &str) -> String {
    name.replace(ESCAPED_SEPARATOR, &FIELD_SEPARATOR.to_string())
}

/// Prepare caller-supplied field values for writing into a form.
///
/// Every `$` in a name becomes `.`. Names are then merged case-insensitively
/// in input order: a later value replaces an earlier one, while the spelling
/// of the first occurrence is kept.
pub fn prepare_field_values<I, K, V>(raw: I) -> NormalizedFieldMap
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    raw.into_iter()
        .map(|(k, v)| (unescape_field_name(k.as_ref()), v.into()))
        .collect()
}

/// Build the field metadata map for a form.
///
/// Names are grouped case-insensitively; the first name seen in each group
/// is its representative and is the only one passed to `lookup`.
pub fn extract_field_metadata<I, S, F>(raw_field_names: I, mut lookup: F) -> FieldDescriptorMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: FnMut(&str) -> FieldDescriptor,
{
    match try_extract_field_metadata(raw_field_names, |name| {
        Ok::<_, Infallible>(lookup(name))
    }) {
        Ok(map) => map,
        Err(never) => match never {},
    }
}

/// Like [`extract_field_metadata`], stopping at the first lookup error
pub fn try_extract_field_metadata<I, S, F, E>(
    raw_field_names: I,
    mut lookup: F,
) -> std::result::Result<FieldDescriptorMap, E>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: FnMut(&str) -> std::result::Result<FieldDescriptor, E>,
{
    let mut representatives: CaseInsensitiveMap<()> = CaseInsensitiveMap::new();
    let mut order = Vec::new();
    for name in raw_field_names {
        let name = name.as_ref();
        if representatives.insert_if_absent(name, ()) {
            order.push(name.to_string());
        }
    }

    let mut fields = FieldDescriptorMap::new();
    for name in order {
        let descriptor = lookup(&name)?;
        fields.insert(name, descriptor);
    }
    Ok(fields)
}
