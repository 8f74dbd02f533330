//! JSON adapters for the external contracts: resolver output and layering
//! rules.

use crate::domain::rules::LayeringRule;
use crate::domain::unit::ResolvedProject;
use anyhow::{Context as _, Result};
use std::path::Path;

/// Load a resolver-produced project document.
pub fn load_project(path: &Path) -> Result<ResolvedProject> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read units file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse resolved project JSON: {}", path.display()))
}

/// Load a layering-rule list (a JSON array of rules).
pub fn load_rules(path: &Path) -> Result<Vec<LayeringRule>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rules file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse layering rules JSON: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_load_project_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "project_name": "demo",
                "units": [
                    {{
                        "qualified_name": "ui.Screen",
                        "references": [
                            {{"target": "data.Repo", "kind": "fieldType", "line": 7}}
                        ]
                    }},
                    {{"qualified_name": "data.Broken", "failure": "unresolved symbol"}}
                ]
            }}"#
        )
        .unwrap();

        let project = load_project(file.path()).unwrap();
        assert_eq!(project.project_name, "demo");
        assert_eq!(project.units.len(), 2);
        assert_eq!(
            project.units[0].references[0].target.as_deref(),
            Some("data.Repo")
        );
        assert!(project.units[1].failure.is_some());
    }

    #[test]
    fn test_load_rules_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_rules(file.path()).is_err());
    }
}
