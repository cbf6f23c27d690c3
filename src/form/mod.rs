//! Form field normalization and the engine-facing form operations

pub mod case_map;
pub mod engine;
pub mod normalize;

pub use case_map::CaseInsensitiveMap;
pub use engine::{
    fill_document, fill_form, read_document_fields, read_form_fields, FillReport, FormBackend,
    FormEngine, SkippedField,
};
pub use normalize::{
    extract_field_metadata, prepare_field_values, try_extract_field_metadata,
    unescape_field_name, FieldDescriptor, FieldDescriptorMap, FieldType, NormalizedFieldMap,
    ESCAPED_SEPARATOR, FIELD_SEPARATOR,
};
