//! Product configuration trait for bundler binaries
//!
//! Each binary implements this trait to name itself and to say where the
//! artifacts it bundles are published.

/// Configuration trait for a bundled product
///
/// Implementors define:
/// - Product identity (name, display name)
/// - Artifact source URL and its environment override
/// - The fallback host written into the bundle's init call
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Base URL the artifacts are fetched from by default
    fn default_source_url(&self) -> &'static str;

    /// Environment variable name for overriding the source URL
    fn source_url_env(&self) -> &'static str;

    /// Public host passed as profiles/memory-initializer prefix at init.
    /// The patched code never reaches it.
    fn fallback_prefix(&self) -> &'static str;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}
