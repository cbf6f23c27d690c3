//! Source resolution, caching, and path sandboxing

pub mod cache;
pub mod resolver;
pub mod sandbox;

pub use cache::{CachedDocument, DocumentCache};
pub use resolver::{
    parse_absolute_url, resolve_base64, resolve_cache, resolve_path, resolve_url, ResolvedPdf,
};
pub use sandbox::PathSandbox;
