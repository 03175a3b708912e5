//! Framework document store and directive composition.
//!
//! Documents live under `<root>/<domain>/<framework>.md`. Each domain may carry
//! a `_standards.md` that is prepended to every framework it serves.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Extension of instruction documents
pub const FRAMEWORK_EXTENSION: &str = "md";
/// Reserved per-domain standards document
pub const STANDARDS_FILE: &str = "_standards.md";

static SAFE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_-]+$").expect("safe name pattern should compile")
});

/// Domain and framework names double as path segments.
pub fn is_safe_name(name: &str) -> bool {
    SAFE_NAME.is_match(name)
}

#[derive(Debug, Clone)]
pub struct FrameworkStore {
    root: PathBuf,
}

impl FrameworkStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map each domain to its sorted framework names.
    ///
    /// Returns `None` when the root directory does not exist. Domains without
    /// any framework document are left out.
    pub async fn list(&self) -> std::io::Result<Option<BTreeMap<String, Vec<String>>>> {
        if !tokio::fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Ok(None);
        }

        let mut result = BTreeMap::new();
        let mut domains = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = domains.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let Some(domain) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let frameworks = list_domain(&entry.path()).await?;
            if !frameworks.is_empty() {
                result.insert(domain, frameworks);
            }
        }
        Ok(Some(result))
    }

    /// Build the directive for `domain/framework`, or an `Error: ...` line.
    pub async fn read_instructions(&self, domain: &str, framework: &str, target: &str) -> String {
        if !is_safe_name(domain) {
            return format!("Error: Invalid domain name '{}'.", domain);
        }
        if !is_safe_name(framework) {
            return format!("Error: Invalid framework name '{}'.", framework);
        }

        let domain_dir = self.root.join(domain);
        let framework_path = domain_dir.join(format!("{}.{}", framework, FRAMEWORK_EXTENSION));
        let instructions = match tokio::fs::read_to_string(&framework_path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return format!(
                    "Error: No framework found at 'docs/{}/{}.{}'. Use `list_frameworks` to see options.",
                    domain, framework, FRAMEWORK_EXTENSION
                );
            }
            Err(e) => {
                warn!("Failed to read framework {}/{}: {}", domain, framework, e);
                return format!(
                    "Error: Failed to read framework 'docs/{}/{}.{}': {}",
                    domain, framework, FRAMEWORK_EXTENSION, e
                );
            }
        };

        let standards = match tokio::fs::read_to_string(domain_dir.join(STANDARDS_FILE)).await {
            Ok(text) => {
                info!("Injected standards from {}/{}", domain, STANDARDS_FILE);
                Some(text)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to load standards file for {}: {}", domain, e);
                None
            }
        };

        compose_directive(domain, framework, standards.as_deref(), &instructions, target)
    }
}

async fn list_domain(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let path = entry.path();
        if path.file_name().and_then(|n| n.to_str()) == Some(STANDARDS_FILE) {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(FRAMEWORK_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Assemble standards, task instructions and next steps into one prompt.
pub fn compose_directive(
    domain: &str,
    framework: &str,
    standards: Option<&str>,
    instructions: &str,
    target: &str,
) -> String {
    let mut prompt = format!(
        "You are executing the '{}' framework for the '{}' domain.\n\n",
        framework, domain
    );

    if let Some(standards) = standards {
        prompt.push_str(&format!(
            "### GLOBAL {} STANDARDS\n{}\n\n---\n\n",
            domain.to_uppercase(),
            standards.trim_end()
        ));
    }

    prompt.push_str("### YOUR TASK INSTRUCTIONS\n");
    prompt.push_str(instructions.trim_end());
    prompt.push_str("\n\n---\n### YOUR NEXT STEPS\n");

    let target = target.trim();
    if target.is_empty() {
        prompt.push_str(
            "1. The user wants to initiate this framework but did not provide a specific target record.\n\
             2. Interview the user to gather the required context or data points needed to fulfill the instructions.\n\
             3. If the instructions require creating or updating a record, use your `create_record` or `update_record` tools once you have gathered enough information.\n",
        );
    } else {
        prompt.push_str(&format!(
            "1. You have been asked to review/process the record: **{}**.\n\
             2. Use your `get_single_record` or `query_records` tool to fetch the necessary data from ServiceNow.\n\
             3. Apply the instructions strictly to the data you retrieved and output the final result.\n",
            target
        ));
    }

    prompt
}
