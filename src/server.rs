//! MCP Server implementation using rmcp

use crate::form::{CaseInsensitiveMap, FieldDescriptor, FillReport, FormBackend};
use crate::service::PdfService;
use crate::source::{
    resolve_base64, resolve_cache, resolve_path, resolve_url, DocumentCache, PathSandbox,
    ResolvedPdf,
};
use anyhow::Result;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    schemars::JsonSchema, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// PDF source specification
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum PdfSource {
    /// File path (absolute or relative)
    Path {
        /// Path to the PDF file
        path: String,
    },
    /// Base64 encoded PDF data
    Base64 {
        /// Base64 encoded PDF content
        base64: String,
    },
    /// URL to download PDF from
    Url {
        /// URL of the PDF file
        url: String,
    },
    /// Reference to cached PDF
    CacheRef {
        /// Cache key from previous operation
        cache_key: String,
    },
}

impl<'de> serde::Deserialize<'de> for PdfSource {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;

        let Some(obj) = value.as_object() else {
            return Err(serde::de::Error::custom(
                "Invalid source: expected an object with one of \"path\", \"base64\", \"url\", or \"cache_key\"",
            ));
        };

        let string_field = |key: &str| -> Option<std::result::Result<String, D::Error>> {
            obj.get(key).map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    serde::de::Error::custom(format!("\"{}\" must be a string", key))
                })
            })
        };

        if let Some(path) = string_field("path") {
            return Ok(PdfSource::Path { path: path? });
        }
        if let Some(base64) = string_field("base64") {
            return Ok(PdfSource::Base64 { base64: base64? });
        }
        if let Some(url) = string_field("url") {
            return Ok(PdfSource::Url { url: url? });
        }
        if let Some(cache_key) = string_field("cache_key") {
            return Ok(PdfSource::CacheRef {
                cache_key: cache_key?,
            });
        }

        let keys: Vec<&String> = obj.keys().collect();
        Err(serde::de::Error::custom(format!(
            "Invalid source: expected an object with one of \"path\", \"base64\", \"url\", or \"cache_key\", but got keys: {:?}",
            keys
        )))
    }
}

/// Security and resource configuration for the form filler server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directories that path sources and output paths must stay within.
    /// Empty means unrestricted.
    pub resource_dirs: Vec<String>,
    /// Allow URLs that resolve to private/reserved IPs (default: false)
    pub allow_private_urls: bool,
    /// Maximum download size in bytes for URL sources (default: 100MB)
    pub max_download_bytes: u64,
    /// Maximum total bytes in cache (default: 512MB)
    pub cache_max_bytes: usize,
    /// Maximum number of cache entries (default: 100)
    pub cache_max_entries: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            resource_dirs: Vec::new(),
            allow_private_urls: false,
            max_download_bytes: 100 * 1024 * 1024, // 100MB
            cache_max_bytes: 512 * 1024 * 1024,    // 512MB
            cache_max_entries: 100,
        }
    }
}

impl ServerConfig {
    /// Read overrides from `PDF_FORM_FILLER_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from a variable lookup. Unset or unparsable values keep their defaults.
    pub fn from_lookup(mut lookup: impl FnMut(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dirs) = lookup("PDF_FORM_FILLER_RESOURCE_DIRS") {
            config.resource_dirs = std::env::split_paths(&dirs)
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_string_lossy().to_string())
                .collect();
        }
        if let Some(allow) = lookup("PDF_FORM_FILLER_ALLOW_PRIVATE_URLS") {
            config.allow_private_urls = matches!(
                allow.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }
        if let Some(max) = lookup("PDF_FORM_FILLER_MAX_DOWNLOAD_BYTES") {
            match max.trim().parse() {
                Ok(max) => config.max_download_bytes = max,
                Err(_) => tracing::warn!(value = %max, "Ignoring invalid max download size"),
            }
        }
        if let Some(max) = lookup("PDF_FORM_FILLER_CACHE_MAX_BYTES") {
            match max.trim().parse() {
                Ok(max) => config.cache_max_bytes = max,
                Err(_) => tracing::warn!(value = %max, "Ignoring invalid cache byte limit"),
            }
        }
        if let Some(max) = lookup("PDF_FORM_FILLER_CACHE_MAX_ENTRIES") {
            match max.trim().parse::<usize>() {
                Ok(max) if max > 0 => config.cache_max_entries = max,
                _ => tracing::warn!(value = %max, "Ignoring invalid cache entry limit"),
            }
        }

        config
    }
}

/// PDF form filler MCP server
#[derive(Clone)]
pub struct PdfServer {
    service: PdfService,
    cache: Arc<RwLock<DocumentCache>>,
    sandbox: Arc<PathSandbox>,
    tool_router: ToolRouter<Self>,
    config: Arc<ServerConfig>,
}

/// Run PDF engine work on the blocking pool
async fn run_blocking<T, F>(work: F) -> crate::error::Result<T>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| crate::error::Error::Pdfium {
            reason: format!("PDF engine task failed: {}", e),
        })?
}

// ============================================================================
// Request/Response types for fill_form
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FieldValueParam {
    /// Field name. `$` may be used in place of `.` in hierarchical names.
    pub name: String,
    /// Value to set. Checkboxes treat "", "Off", "false", "no" and "0" as unchecked.
    pub value: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FillFormParams {
    /// Source PDF containing form fields
    pub source: PdfSource,
    /// Field values to set, applied in order (later duplicates win)
    pub fields: Vec<FieldValueParam>,
    /// Output file path (optional). If provided, saves the filled PDF to this path.
    #[serde(default)]
    pub output_path: Option<String>,
    /// Password for encrypted PDFs
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SkippedFieldInfo {
    /// Field name
    pub name: String,
    /// Reason the field was skipped
    pub reason: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct FillFormResult {
    /// Source identifier
    pub source: String,
    /// Cache key for the output PDF, for chaining operations.
    /// Absent when the output is too large to cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_cache_key: Option<String>,
    /// Number of fields successfully filled
    pub fields_filled: u32,
    /// Fields that could not be filled
    pub fields_skipped: Vec<SkippedFieldInfo>,
    /// Path where PDF was saved (if output_path was specified)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn skipped_info(report: FillReport) -> Vec<SkippedFieldInfo> {
    report
        .fields_skipped
        .into_iter()
        .map(|s| SkippedFieldInfo {
            name: s.name,
            reason: s.reason,
        })
        .collect()
}

// ============================================================================
// Request/Response types for get_form_fields
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetFormFieldsParams {
    /// PDF sources to process
    pub sources: Vec<PdfSource>,
    /// Password for encrypted PDFs
    #[serde(default)]
    pub password: Option<String>,
    /// Cache the source PDF and return its cache key
    #[serde(default)]
    pub cache: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct FormFieldInfo {
    /// Field name (first spelling seen among case variants)
    pub name: String,
    /// Numeric field type (0 unknown, 1 push_button, 2 checkbox, 3 radio_button, 4 text, 5 list_box, 6 combo_box, 7 signature)
    pub field_type_id: u8,
    /// Field type name
    pub field_type: String,
    /// Current value, empty when unset
    pub value: String,
}

impl From<FieldDescriptor> for FormFieldInfo {
    fn from(d: FieldDescriptor) -> Self {
        Self {
            name: d.name,
            field_type_id: d.field_type.id(),
            field_type: d.field_type.as_str().to_string(),
            value: d.value,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct GetFormFieldsResult {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
    /// Fields keyed by name, sorted case-insensitively
    #[schemars(with = "BTreeMap<String, FormFieldInfo>")]
    pub fields: CaseInsensitiveMap<FormFieldInfo>,
    pub total_fields: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Request/Response types for generate_file
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateFileParams {
    /// Path of the PDF form to fill
    pub input_path: String,
    /// Path of a JSON file holding a flat object of field name to value
    pub json_path: String,
    /// Path to write the filled PDF to
    pub output_path: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct GenerateFileResult {
    pub input_path: String,
    pub output_path: String,
    pub fields_filled: u32,
    pub fields_skipped: Vec<SkippedFieldInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Tool implementations
// ============================================================================

const SOURCE_FORMAT: &str = "Source format: one of {\"path\": \"/absolute/path.pdf\"}, {\"url\": \"https://...\"}, {\"base64\": \"...\"}, or {\"cache_key\": \"...\"}";

#[tool_router]
impl PdfServer {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Create a new PdfServer with full configuration
    pub fn with_config(config: ServerConfig) -> Self {
        Self::with_backend(config, Arc::new(crate::pdf::PdfiumBackend))
    }

    /// Create a new PdfServer over a specific form backend
    pub fn with_backend(config: ServerConfig, backend: Arc<dyn FormBackend>) -> Self {
        let cache = DocumentCache::new(config.cache_max_entries, config.cache_max_bytes);
        let sandbox = PathSandbox::new(&config.resource_dirs);
        Self {
            service: PdfService::with_backend(backend),
            cache: Arc::new(RwLock::new(cache)),
            sandbox: Arc::new(sandbox),
            tool_router: Self::tool_router(),
            config: Arc::new(config),
        }
    }

    /// Fill form fields in a PDF
    #[tool(
        description = "Fill form fields in a PDF and produce a new PDF. Supports text fields, checkboxes, and radio buttons.

Each fields entry specifies:
- name: The field name (use get_form_fields to discover names). Matching is case-insensitive and `$` may stand in for `.` in hierarchical names.
- value: The value as a string. Checkboxes are unchecked by \"\", \"Off\", \"false\", \"no\" or \"0\" and checked by anything else.

When the same field is given more than once, the last value wins.
Unmatched fields are reported as skipped.

The output is cached (output_cache_key) for chaining with other tools, unless it exceeds the cache size limit.

Source format: must be one of {\"path\": \"/absolute/path.pdf\"}, {\"url\": \"https://...\"}, {\"base64\": \"...\"}, or {\"cache_key\": \"...\"}"
    )]
    async fn fill_form(&self, Parameters(params): Parameters<FillFormParams>) -> String {
        let result = self.process_fill_form(&params).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "fill_form failed");
            FillFormResult {
                source: Self::source_name(&params.source),
                output_cache_key: None,
                fields_filled: 0,
                fields_skipped: vec![],
                output_path: None,
                error: Some(e.client_message()),
            }
        });

        let response = serde_json::json!({ "results": [result] });
        serde_json::to_string_pretty(&response).unwrap_or_default()
    }

    /// Read form field metadata from PDF files
    #[tool(
        description = "Read the form fields of PDF files. Returns, per field, its name, numeric type id, type name, and current value.

Fields whose names differ only by letter case are reported once, under the first spelling found. Fields are keyed by name and sorted case-insensitively.

Type ids: 0 unknown, 1 push_button, 2 checkbox, 3 radio_button, 4 text, 5 list_box, 6 combo_box, 7 signature.

Source format: each element must be one of {\"path\": \"/absolute/path.pdf\"}, {\"url\": \"https://...\"}, {\"base64\": \"...\"}, or {\"cache_key\": \"...\"}"
    )]
    async fn get_form_fields(&self, Parameters(params): Parameters<GetFormFieldsParams>) -> String {
        let mut results = Vec::new();

        for source in &params.sources {
            let result = self
                .process_get_form_fields(source, &params)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "get_form_fields failed");
                    GetFormFieldsResult {
                        source: Self::source_name(source),
                        cache_key: None,
                        fields: CaseInsensitiveMap::new(),
                        total_fields: 0,
                        error: Some(e.client_message()),
                    }
                });
            results.push(result);
        }

        let response = serde_json::json!({ "results": results });
        serde_json::to_string_pretty(&response).unwrap_or_default()
    }

    /// Fill a PDF on disk from a JSON file on disk
    #[tool(
        description = "Fill a PDF form file using field values from a JSON file and write the result to output_path.

The JSON file must contain a flat object mapping field names to values. String values are used as-is, numbers and booleans as their JSON text, and null as an empty value. Field names follow the same rules as fill_form."
    )]
    async fn generate_file(&self, Parameters(params): Parameters<GenerateFileParams>) -> String {
        let result = self
            .process_generate_file(&params)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "generate_file failed");
                GenerateFileResult {
                    input_path: params.input_path.clone(),
                    output_path: params.output_path.clone(),
                    fields_filled: 0,
                    fields_skipped: vec![],
                    error: Some(e.client_message()),
                }
            });

        let response = serde_json::json!({ "results": [result] });
        serde_json::to_string_pretty(&response).unwrap_or_default()
    }
}

impl PdfServer {
    fn source_name(source: &PdfSource) -> String {
        match source {
            PdfSource::Path { path } => path.clone(),
            PdfSource::Base64 { .. } => "<base64>".to_string(),
            PdfSource::Url { url } => url.clone(),
            PdfSource::CacheRef { cache_key } => format!("<cache:{}>", cache_key),
        }
    }

    async fn resolve_source(&self, source: &PdfSource) -> crate::error::Result<ResolvedPdf> {
        match source {
            PdfSource::Path { path } => resolve_path(self.sandbox.check_existing(path)?),
            PdfSource::Base64 { base64 } => resolve_base64(base64),
            PdfSource::Url { url } => {
                resolve_url(
                    url,
                    self.config.allow_private_urls,
                    self.config.max_download_bytes,
                )
                .await
            }
            PdfSource::CacheRef { cache_key } => resolve_cache(cache_key, &self.cache).await,
        }
    }

    /// Write a filled document to `output_path`, creating parent directories
    fn write_output(
        &self,
        output_path: &Option<String>,
        data: &[u8],
    ) -> crate::error::Result<Option<String>> {
        let Some(requested) = output_path else {
            return Ok(None);
        };
        let path = self.sandbox.check_output(requested)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(&path, data)?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "Wrote filled PDF");
        Ok(Some(requested.clone()))
    }

    pub async fn process_fill_form(
        &self,
        params: &FillFormParams,
    ) -> crate::error::Result<FillFormResult> {
        let resolved = self.resolve_source(&params.source).await?;
        let source_name = resolved.source_name.clone();

        let fields: Vec<(String, String)> = params
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect();
        let data = resolved.data;
        let password = params.password.clone();
        let service = self.service.clone();

        let (output_data, report) =
            run_blocking(move || service.fill_form(&data, password.as_deref(), fields)).await?;

        let output_cache_key = {
            let cache_guard = self.cache.write().await;
            cache_guard.insert(output_data.clone(), format!("filled:{}", source_name))
        };

        let output_path = self.write_output(&params.output_path, &output_data)?;

        Ok(FillFormResult {
            source: source_name,
            output_cache_key,
            fields_filled: report.fields_filled,
            fields_skipped: skipped_info(report),
            output_path,
            error: None,
        })
    }

    pub async fn process_get_form_fields(
        &self,
        source: &PdfSource,
        params: &GetFormFieldsParams,
    ) -> crate::error::Result<GetFormFieldsResult> {
        let resolved = self.resolve_source(source).await?;
        let source_name = resolved.source_name.clone();

        let cache_key = if params.cache {
            let cache_guard = self.cache.write().await;
            cache_guard.insert(resolved.data.clone(), source_name.clone())
        } else {
            None
        };

        let data = resolved.data;
        let password = params.password.clone();
        let service = self.service.clone();

        let descriptors =
            run_blocking(move || service.get_form_fields(&data, password.as_deref())).await?;

        let fields: CaseInsensitiveMap<FormFieldInfo> = descriptors
            .into_iter()
            .map(|(name, d)| (name, FormFieldInfo::from(d)))
            .collect();
        let total_fields = fields.len();

        Ok(GetFormFieldsResult {
            source: source_name,
            cache_key,
            fields,
            total_fields,
            error: None,
        })
    }

    pub async fn process_generate_file(
        &self,
        params: &GenerateFileParams,
    ) -> crate::error::Result<GenerateFileResult> {
        let input = self.sandbox.check_existing(&params.input_path)?;
        let json = self.sandbox.check_existing(&params.json_path)?;
        let output = self.sandbox.check_output(&params.output_path)?;

        let service = self.service.clone();
        let report = run_blocking(move || service.generate_file(input, json, output)).await?;

        Ok(GenerateFileResult {
            input_path: params.input_path.clone(),
            output_path: params.output_path.clone(),
            fields_filled: report.fields_filled,
            fields_skipped: skipped_info(report),
            error: None,
        })
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(format!(
                "PDF form filler: read form fields with get_form_fields, fill them with fill_form, \
                 or fill a PDF file from a JSON file with generate_file. {}",
                SOURCE_FORMAT
            )),
        }
    }
}

/// Run the MCP server with the default configuration
pub async fn run_server() -> Result<()> {
    run_server_with_config(ServerConfig::default()).await
}

/// Run the MCP server with full configuration
pub async fn run_server_with_config(config: ServerConfig) -> Result<()> {
    let server = PdfServer::with_config(config);

    tracing::info!("PDF form filler ready, waiting for connections...");

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_name() {
        assert_eq!(
            PdfServer::source_name(&PdfSource::Path {
                path: "/test.pdf".to_string()
            }),
            "/test.pdf"
        );
        assert_eq!(
            PdfServer::source_name(&PdfSource::Base64 {
                base64: "JVBERi0=".to_string()
            }),
            "<base64>"
        );
        assert_eq!(
            PdfServer::source_name(&PdfSource::CacheRef {
                cache_key: "abc".to_string()
            }),
            "<cache:abc>"
        );
    }

    #[test]
    fn test_pdf_source_deserialization() {
        let source: PdfSource = serde_json::from_str(r#"{"url": "https://x/y.pdf"}"#).unwrap();
        assert!(matches!(source, PdfSource::Url { url } if url == "https://x/y.pdf"));

        let source: PdfSource = serde_json::from_str(r#"{"cache_key": "k"}"#).unwrap();
        assert!(matches!(source, PdfSource::CacheRef { cache_key } if cache_key == "k"));

        assert!(serde_json::from_str::<PdfSource>(r#"{"path": 3}"#).is_err());
        assert!(serde_json::from_str::<PdfSource>(r#"{"file": "x"}"#).is_err());
        assert!(serde_json::from_str::<PdfSource>(r#""x.pdf""#).is_err());
    }

    #[test]
    fn test_fill_params_deserialization() {
        let params: FillFormParams = serde_json::from_str(
            r#"{"source": {"path": "/f.pdf"}, "fields": [{"name": "a$b", "value": "1"}]}"#,
        )
        .unwrap();
        assert_eq!(params.fields.len(), 1);
        assert_eq!(params.fields[0].name, "a$b");
        assert!(params.output_path.is_none());
        assert!(params.password.is_none());
    }

    #[test]
    fn test_get_form_fields_params_defaults() {
        let params: GetFormFieldsParams =
            serde_json::from_str(r#"{"sources": [{"path": "/f.pdf"}]}"#).unwrap();
        assert!(!params.cache);
        assert!(params.password.is_none());
    }

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::default();
        assert!(config.resource_dirs.is_empty());
        assert!(!config.allow_private_urls);
        assert_eq!(config.max_download_bytes, 100 * 1024 * 1024);
        assert_eq!(config.cache_max_entries, 100);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = ServerConfig::from_lookup(|name| match name {
            "PDF_FORM_FILLER_RESOURCE_DIRS" => Some("/srv/forms".to_string()),
            "PDF_FORM_FILLER_ALLOW_PRIVATE_URLS" => Some("TRUE".to_string()),
            "PDF_FORM_FILLER_MAX_DOWNLOAD_BYTES" => Some("2048".to_string()),
            "PDF_FORM_FILLER_CACHE_MAX_BYTES" => Some("lots".to_string()),
            "PDF_FORM_FILLER_CACHE_MAX_ENTRIES" => Some(" 8 ".to_string()),
            _ => None,
        });

        assert_eq!(config.resource_dirs, vec!["/srv/forms".to_string()]);
        assert!(config.allow_private_urls);
        assert_eq!(config.max_download_bytes, 2048);
        assert_eq!(config.cache_max_bytes, 512 * 1024 * 1024);
        assert_eq!(config.cache_max_entries, 8);
    }

    #[test]
    fn test_config_rejects_zero_cache_entries() {
        let config = ServerConfig::from_lookup(|name| match name {
            "PDF_FORM_FILLER_CACHE_MAX_ENTRIES" => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(config.cache_max_entries, 100);
    }

    #[test]
    fn test_config_from_empty_lookup() {
        let config = ServerConfig::from_lookup(|_| None);
        assert!(config.resource_dirs.is_empty());
        assert!(!config.allow_private_urls);
    }

    #[tokio::test]
    async fn test_path_source_outside_resource_dirs() {
        let allowed = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let outside = other.path().join("form.pdf");
        std::fs::write(&outside, b"%PDF-1.7").unwrap();

        let server = PdfServer::with_config(ServerConfig {
            resource_dirs: vec![allowed.path().to_string_lossy().to_string()],
            ..ServerConfig::default()
        });

        let source = PdfSource::Path {
            path: outside.to_string_lossy().to_string(),
        };
        let result = server.resolve_source(&source).await;
        assert!(matches!(
            result,
            Err(crate::error::Error::PathAccessDenied { .. })
        ));

        let output = Some(other.path().join("out.pdf").to_string_lossy().to_string());
        let result = server.write_output(&output, b"%PDF-1.7");
        assert!(matches!(
            result,
            Err(crate::error::Error::PathAccessDenied { .. })
        ));
    }
}
