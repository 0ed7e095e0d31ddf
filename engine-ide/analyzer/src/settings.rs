//! User-facing configuration, read from flat JSON records in which every
//! field is optional.

use serde::{Deserialize, Serialize};

/// Indentation switches the formatter respects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeStyleSettings {
    pub indent_where_with_tab_size: bool,
    pub indent_do_with_tab_size: bool,
}

impl Default for CodeStyleSettings {
    fn default() -> CodeStyleSettings {
        CodeStyleSettings { indent_where_with_tab_size: true, indent_do_with_tab_size: true }
    }
}

/// How the hoogle binary is found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoogleSettings {
    pub path: String,
}

impl Default for HoogleSettings {
    fn default() -> HoogleSettings {
        HoogleSettings { path: String::from("hoogle") }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    pub code_style: CodeStyleSettings,
    pub hoogle: HoogleSettings,
    /// Package names used to narrow project-scoped symbol search.
    pub project_packages: Vec<String>,
}

impl AnalyzerSettings {
    pub fn from_json(text: &str) -> Result<AnalyzerSettings, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings = AnalyzerSettings::from_json("{}").unwrap();
        assert_eq!(settings, AnalyzerSettings::default());
        assert!(settings.code_style.indent_where_with_tab_size);
        assert!(settings.code_style.indent_do_with_tab_size);
        assert_eq!(settings.hoogle.path, "hoogle");
        assert!(settings.project_packages.is_empty());
    }

    #[test]
    fn partial_records_keep_unmentioned_defaults() {
        let settings = AnalyzerSettings::from_json(
            r#"{ "hoogle": { "path": "/opt/hoogle" }, "project_packages": ["registry"] }"#,
        )
        .unwrap();
        assert_eq!(settings.hoogle.path, "/opt/hoogle");
        assert_eq!(settings.project_packages, vec!["registry"]);
        assert!(settings.code_style.indent_where_with_tab_size);
    }

    #[test]
    fn settings_survive_a_json_round_trip() {
        let mut settings = AnalyzerSettings::default();
        settings.code_style.indent_where_with_tab_size = false;
        settings.project_packages.push(String::from("registry"));
        let text = serde_json::to_string(&settings).unwrap();
        assert_eq!(AnalyzerSettings::from_json(&text).unwrap(), settings);
    }
}
