//! Bundle assembly
//!
//! The bundle is six statements, in this order:
//! 1. the memory image as an embedded `Uint8Array`
//! 2. the glue code, its profile fetch replaced by the fetched catalog
//! 3. `Quiet.init` with the fallback prefixes
//! 4. the loader code, its async read replaced by the embedded memory image
//! 5. `Quiet.Module` attachment
//! 6. the CommonJS export

use crate::artifacts::{ArtifactKey, ResolvedArtifacts};
use crate::encoding::{binary_literal, template_literal};
use crate::error::Result;
use crate::patch::replace_function_body;
use std::fmt;

/// Statement separator in the emitted module
pub const STATEMENT_SEPARATOR: &str = ";\n";

/// Precedes the glue function that fetches the profile catalog
pub const PROFILES_ANCHOR: &str = "setProfilesPrefix";

/// Precedes the loader function that fetches the memory image
pub const READ_ASYNC_ANCHOR: &str = r#"Module["readAsync"]"#;

/// Variable the memory image is bound to inside the bundle
const MEMORY_BINDING: &str = "mem";

/// The assembled module, one entry per top-level statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    statements: Vec<String>,
}

impl Bundle {
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Full module text
    pub fn render(&self) -> String {
        self.statements.join(STATEMENT_SEPARATOR)
    }
}

impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Compose the offline bundle from the fetched artifacts
pub fn assemble(artifacts: &ResolvedArtifacts, fallback_prefix: &str) -> Result<Bundle> {
    let memory_image = artifacts.bytes(ArtifactKey::MemoryImage)?;
    let glue = artifacts.text(ArtifactKey::Glue)?;
    let loader = artifacts.text(ArtifactKey::Loader)?;
    let catalog = artifacts.text(ArtifactKey::Profiles)?;

    let statements = vec![
        format!("let {}={}", MEMORY_BINDING, binary_literal(memory_image)),
        replace_function_body(
            glue,
            PROFILES_ANCHOR,
            &format!("onProfilesFetch({})", template_literal(catalog)),
        )?,
        format!(
            "Quiet.init({{profilesPrefix: '{0}', memoryInitializerPrefix: '{0}'}})",
            fallback_prefix
        ),
        replace_function_body(
            loader,
            READ_ASYNC_ANCHOR,
            &format!("onload({});", MEMORY_BINDING),
        )?,
        "Quiet.Module=Module".to_string(),
        "module.exports=Quiet".to_string(),
    ];

    Ok(Bundle { statements })
}
