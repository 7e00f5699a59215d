//! Dependency core types.

/// Distribution names whose import name is not derivable from the name.
const IMPORT_NAME_OVERRIDES: &[(&str, &str)] = &[
    ("beautifulsoup4", "bs4"),
    ("opencv-python", "cv2"),
    ("pillow", "PIL"),
    ("python-dateutil", "dateutil"),
    ("pyyaml", "yaml"),
    ("scikit-learn", "sklearn"),
];

/// A declared pip package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// Requirement as handed to pip, e.g. `streamlit` or `pandas>=2`.
    pub requirement: String,
    /// Bare distribution name, lowercased.
    pub name: String,
    /// Module name used to probe whether the package imports.
    pub module: String,
}

impl PackageSpec {
    /// Parse a pip requirement string.
    pub fn parse(requirement: &str) -> Self {
        let requirement = requirement.trim();
        let end = requirement
            .find(|c: char| matches!(c, '<' | '>' | '=' | '!' | '~' | '[' | ';' | ' ' | '@'))
            .unwrap_or(requirement.len());
        let name = requirement[..end].to_ascii_lowercase();
        let module = IMPORT_NAME_OVERRIDES
            .iter()
            .find(|(dist, _)| *dist == name)
            .map(|(_, module)| module.to_string())
            .unwrap_or_else(|| name.replace(['-', '.'], "_"));

        Self {
            requirement: requirement.to_string(),
            name,
            module,
        }
    }

    /// Parse every requirement in order.
    pub fn parse_all(requirements: &[String]) -> Vec<Self> {
        requirements.iter().map(|r| Self::parse(r)).collect()
    }
}

/// Python snippet that imports every module, failing on the first missing one.
pub fn import_probe_script(packages: &[PackageSpec]) -> String {
    let modules: Vec<&str> = packages.iter().map(|p| p.module.as_str()).collect();
    format!("import {}", modules.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_name() {
        let p = PackageSpec::parse("streamlit");
        assert_eq!(p.requirement, "streamlit");
        assert_eq!(p.name, "streamlit");
        assert_eq!(p.module, "streamlit");
    }

    #[test]
    fn test_parse_with_version_constraint() {
        let p = PackageSpec::parse("pandas>=2.0");
        assert_eq!(p.requirement, "pandas>=2.0");
        assert_eq!(p.name, "pandas");
        assert_eq!(p.module, "pandas");
    }

    #[test]
    fn test_parse_with_extras() {
        let p = PackageSpec::parse("Plotly[express]==5.0");
        assert_eq!(p.name, "plotly");
        assert_eq!(p.module, "plotly");
    }

    #[test]
    fn test_parse_dash_becomes_underscore() {
        let p = PackageSpec::parse("streamlit-aggrid");
        assert_eq!(p.module, "streamlit_aggrid");
    }

    #[test]
    fn test_parse_known_override() {
        assert_eq!(PackageSpec::parse("scikit-learn").module, "sklearn");
        assert_eq!(PackageSpec::parse("PyYAML").module, "yaml");
    }

    #[test]
    fn test_import_probe_script() {
        let packages = PackageSpec::parse_all(&[
            "streamlit".to_string(),
            "pandas".to_string(),
            "plotly".to_string(),
            "openpyxl".to_string(),
        ]);
        assert_eq!(
            import_probe_script(&packages),
            "import streamlit, pandas, plotly, openpyxl"
        );
    }
}
