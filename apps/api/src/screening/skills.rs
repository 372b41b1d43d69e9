use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Static job title → expected skills configuration. Loaded once at startup
/// and shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SkillMap {
    roles: Vec<RoleSkills>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleSkills {
    pub title: String,
    pub skills: Vec<String>,
}

impl SkillMap {
    pub fn new(roles: Vec<RoleSkills>) -> Self {
        Self { roles }
    }

    /// Reads a JSON object of the form `{"Data Scientist": ["Python", ...]}`.
    /// Skill order within a role is kept.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read skill map {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("invalid skill map in {}", path.display()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)?;
        let mut roles = Vec::with_capacity(object.len());
        for (title, skills) in object {
            let skills: Vec<String> = serde_json::from_value(skills)
                .with_context(|| format!("skills for '{title}' must be a list of strings"))?;
            roles.push(RoleSkills { title, skills });
        }
        Ok(Self { roles })
    }

    /// Exact title match after trimming surrounding whitespace.
    pub fn skills_for(&self, title: &str) -> Option<&[String]> {
        let title = title.trim();
        self.roles
            .iter()
            .find(|r| r.title == title)
            .map(|r| r.skills.as_slice())
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(|r| r.title.as_str())
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl Default for SkillMap {
    fn default() -> Self {
        let role = |title: &str, skills: &[&str]| RoleSkills {
            title: title.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
        };
        Self::new(vec![
            role(
                "Data Scientist",
                &["Python", "Machine Learning", "Statistics", "Data Analysis"],
            ),
            role("Frontend Developer", &["HTML", "CSS", "JavaScript", "React"]),
            role(
                "HR Manager",
                &["Recruitment", "Onboarding", "HR Policies", "Employee Relations"],
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_map_has_three_roles() {
        let map = SkillMap::default();
        assert_eq!(map.len(), 3);
        assert_eq!(
            map.skills_for("Frontend Developer").unwrap(),
            &["HTML", "CSS", "JavaScript", "React"]
        );
    }

    #[test]
    fn test_lookup_trims_title_but_is_case_sensitive() {
        let map = SkillMap::default();
        assert!(map.skills_for("  HR Manager ").is_some());
        assert!(map.skills_for("hr manager").is_none());
    }

    #[test]
    fn test_from_json_str_keeps_skill_order() {
        let map = SkillMap::from_json_str(
            r#"{"Rust Engineer": ["Rust", "Tokio"], "Analyst": ["SQL"]}"#,
        )
        .unwrap();
        let mut titles: Vec<&str> = map.titles().collect();
        titles.sort();
        assert_eq!(titles, vec!["Analyst", "Rust Engineer"]);
        assert_eq!(map.skills_for("Rust Engineer").unwrap(), &["Rust", "Tokio"]);
    }

    #[test]
    fn test_from_json_str_rejects_non_list_skills() {
        assert!(SkillMap::from_json_str(r#"{"Analyst": "SQL"}"#).is_err());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skills.json");
        std::fs::write(&path, r#"{"Designer": ["Figma"]}"#).unwrap();

        let map = SkillMap::from_json_file(&path).unwrap();
        assert_eq!(map.skills_for("Designer").unwrap(), &["Figma"]);
    }
}
