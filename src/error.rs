//! Error types for the PDF form filler

use thiserror::Error;

/// Result type alias for the PDF form filler
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the PDF form filler
#[derive(Error, Debug)]
pub enum Error {
    /// PDF file not found
    #[error("PDF not found: {path}")]
    PdfNotFound { path: String },

    /// Invalid PDF file
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// PDF is password protected and no password was provided
    #[error("PDF is password protected")]
    PasswordRequired,

    /// Incorrect password provided
    #[error("Incorrect password")]
    IncorrectPassword,

    /// The supplied URL is not a valid, absolute URI
    #[error("The URL was not a valid, absolute URI: {url}")]
    InvalidUri { url: String },

    /// A remote fetch produced no usable stream
    #[error("No stream available from {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// SSRF blocked (URL resolves to private/reserved IP)
    #[error("SSRF blocked: {url}")]
    SsrfBlocked { url: String },

    /// Download too large
    #[error("Download too large: {size} bytes (max: {max_size} bytes)")]
    DownloadTooLarge { size: u64, max_size: u64 },

    /// No form field with this name exists in the document
    #[error("Form field not found: {name}")]
    FieldNotFound { name: String },

    /// The form field exists but its type cannot be written
    #[error("Unsupported field type '{field_type}' for field {name}")]
    UnsupportedField { name: String, field_type: String },

    /// Field data was not a flat JSON object of scalar values
    #[error("Invalid field data: {reason}")]
    InvalidFieldData { reason: String },

    /// Cache key not found
    #[error("Cache key not found: {key}")]
    CacheKeyNotFound { key: String },

    /// Path access denied (outside allowed resource directories)
    #[error("Path access denied: {path}")]
    PathAccessDenied { path: String },

    /// Base64 decode error
    #[error("Invalid base64 data: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PDFium error
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Return a sanitized error message safe to send to clients.
    /// Internal details (paths, library errors, file sizes) are omitted.
    /// Full details should be logged via tracing before calling this.
    pub fn client_message(&self) -> String {
        match self {
            Error::PdfNotFound { .. } => "PDF not found".to_string(),
            Error::InvalidPdf { .. } => "Invalid PDF file".to_string(),
            Error::PasswordRequired => "PDF is password protected".to_string(),
            Error::IncorrectPassword => "Incorrect password".to_string(),
            Error::InvalidUri { url } => {
                format!("The URL was not a valid, absolute URI: {}", url)
            }
            Error::FetchFailed { .. } => "No stream available from URL".to_string(),
            Error::SsrfBlocked { .. } => "URL not allowed".to_string(),
            Error::DownloadTooLarge { max_size, .. } => {
                format!("Download exceeds maximum size of {} bytes", max_size)
            }
            Error::FieldNotFound { name } => format!("Form field not found: {}", name),
            Error::UnsupportedField { name, field_type } => {
                format!("Unsupported field type '{}' for field {}", field_type, name)
            }
            Error::InvalidFieldData { reason } => format!("Invalid field data: {}", reason),
            Error::CacheKeyNotFound { .. } => "Cache key not found".to_string(),
            Error::PathAccessDenied { .. } => "Access denied".to_string(),
            Error::Base64Decode(_) => "Invalid base64 data".to_string(),
            Error::Io(_) => "I/O error".to_string(),
            Error::Pdfium { .. } => "PDF processing error".to_string(),
            Error::Serialization(_) => "Serialization error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_hides_paths() {
        let err = Error::PdfNotFound {
            path: "/secret/location/form.pdf".to_string(),
        };
        assert_eq!(err.client_message(), "PDF not found");

        let err = Error::PathAccessDenied {
            path: "/etc/passwd".to_string(),
        };
        assert!(!err.client_message().contains("/etc"));
    }

    #[test]
    fn test_client_message_keeps_field_names() {
        let err = Error::FieldNotFound {
            name: "applicant.name".to_string(),
        };
        assert_eq!(err.client_message(), "Form field not found: applicant.name");
    }

    #[test]
    fn test_invalid_uri_display() {
        let err = Error::InvalidUri {
            url: "not a url".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "The URL was not a valid, absolute URI: not a url"
        );
    }
}
