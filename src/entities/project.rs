//! Project entity - major development projects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Project lifecycle phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectPhase {
    #[default]
    Planning,
    Approved,
    UnderConstruction,
    Completed,
}

impl ProjectPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectPhase::Planning => "planning",
            ProjectPhase::Approved => "approved",
            ProjectPhase::UnderConstruction => "under-construction",
            ProjectPhase::Completed => "completed",
        }
    }
}

impl fmt::Display for ProjectPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProjectPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planning" => Ok(ProjectPhase::Planning),
            "approved" => Ok(ProjectPhase::Approved),
            "under-construction" | "under_construction" => Ok(ProjectPhase::UnderConstruction),
            "completed" => Ok(ProjectPhase::Completed),
            _ => Err(format!("unknown project phase: '{}'", s)),
        }
    }
}

/// A development project, keyed by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,

    /// Owning developer; `None` when the source row named no developer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,

    /// Total investment in whole dollars
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_value: Option<f64>,

    #[serde(default)]
    pub phase: ProjectPhase,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Project {
    pub const FIELDS: &'static [&'static str] = &[
        "name",
        "project_type",
        "developer_id",
        "area",
        "total_value",
        "phase",
        "description",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_serializes_kebab_case() {
        let json = serde_json::to_string(&ProjectPhase::UnderConstruction).unwrap();
        assert_eq!(json, "\"under-construction\"");
        assert_eq!(ProjectPhase::UnderConstruction.to_string(), "under-construction");
    }

    #[test]
    fn test_phase_from_str() {
        assert_eq!("Completed".parse::<ProjectPhase>().unwrap(), ProjectPhase::Completed);
        assert_eq!(
            "under_construction".parse::<ProjectPhase>().unwrap(),
            ProjectPhase::UnderConstruction
        );
        assert!("demolished".parse::<ProjectPhase>().is_err());
    }
}
