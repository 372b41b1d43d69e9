// Screening prompt templates. The reply contract chosen here must match the
// interpreter strategy that reads the reply; both are keyed on `ResponseFormat`.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::Serialize;

use crate::screening::skills::SkillMap;

pub const SCORE: &str = "Score";
pub const SKILL_MATCH_PERCENTAGE: &str = "Skill Match Percentage";
pub const EXPERIENCE_YEARS: &str = "Experience Years";
pub const TOP_STRENGTHS: &str = "Top Strengths";
pub const RED_FLAGS: &str = "Red Flags";
pub const FIT_JUSTIFICATION: &str = "Fit Justification";
pub const WHY_NOT_SELECTED: &str = "Why Not Selected";
pub const FINAL_VERDICT: &str = "Final Verdict";
pub const ONE_LINE_RECOMMENDATION: &str = "One Line Recommendation";
pub const RESUME_SUMMARY: &str = "Resume Summary";

/// Every field the model is asked for, in prompt order.
pub const FIELD_LABELS: [&str; 10] = [
    SCORE,
    SKILL_MATCH_PERCENTAGE,
    EXPERIENCE_YEARS,
    TOP_STRENGTHS,
    RED_FLAGS,
    FIT_JUSTIFICATION,
    WHY_NOT_SELECTED,
    FINAL_VERDICT,
    ONE_LINE_RECOMMENDATION,
    RESUME_SUMMARY,
];

/// Substituted for the skill list when the job title has no configured skills.
pub const INFER_SKILLS_PLACEHOLDER: &str = "[Let AI infer skills]";

/// Which reply contract the prompt asks for and the interpreter expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Exactly one JSON object with the ten named fields.
    Json,
    /// Ten numbered `Label: value` items in markdown.
    Markdown,
}

impl FromStr for ResponseFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ResponseFormat::Json),
            "markdown" | "md" => Ok(ResponseFormat::Markdown),
            other => Err(format!("unknown response format '{other}'")),
        }
    }
}

const JSON_CONTRACT: &str = r#"Please evaluate and respond ONLY with this JSON structure. No explanation, markdown, or code block. Just plain JSON.

{
  "Score": 0-100,
  "Skill Match Percentage": 0-100,
  "Experience Years": "string or number",
  "Top Strengths": "text",
  "Red Flags": "text",
  "Fit Justification": "text",
  "Why Not Selected": "text",
  "Final Verdict": "Strong Fit / Moderate Fit / Not Recommended",
  "One Line Recommendation": "text",
  "Resume Summary": "education, companies, tools etc."
}

Strictly return only a valid JSON object."#;

/// Hint shown after each numbered label in the markdown contract.
const MARKDOWN_HINTS: [&str; 10] = [
    "overall fit from 0 to 100",
    "share of the expected skills the candidate shows, 0 to 100",
    "total relevant years of experience",
    "the three strongest points for this role",
    "gaps, inconsistencies or concerns",
    "why the candidate does or does not fit the role",
    "if not recommended, explain why; otherwise write N/A",
    "one of Strong Fit / Moderate Fit / Not Recommended",
    "a single sentence for the hiring manager",
    "key data from the resume: education, companies, tools",
];

fn markdown_contract() -> String {
    let mut contract = String::from(
        "Please evaluate the candidate and respond in structured markdown with exactly these \
         ten numbered items. Start every item with its label followed by a colon, exactly as written:\n\n",
    );
    for (index, (label, hint)) in FIELD_LABELS.iter().zip(MARKDOWN_HINTS).enumerate() {
        let _ = writeln!(contract, "{}. {label}: <{hint}>", index + 1);
    }
    contract.push_str("\nDo not add any other sections.");
    contract
}

/// Renders the evaluation request for one candidate.
pub fn build_prompt(
    format: ResponseFormat,
    cv_text: &str,
    job_title: &str,
    job_description: &str,
    skill_map: &SkillMap,
) -> String {
    let skills_required = match skill_map.skills_for(job_title) {
        Some(skills) if !skills.is_empty() => skills.join(", "),
        _ => INFER_SKILLS_PLACEHOLDER.to_string(),
    };

    let contract = match format {
        ResponseFormat::Json => JSON_CONTRACT.to_string(),
        ResponseFormat::Markdown => markdown_contract(),
    };

    format!(
        "We are hiring for the role: {job_title}\n\n\
         Job Description:\n{job_description}\n\n\
         Key Skills Expected:\n{skills_required}\n\n\
         Resume:\n{cv_text}\n\n\
         {contract}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::skills::RoleSkills;

    const CV: &str = "Jane Doe\n5 years Python, pandas, scikit-learn";

    #[test]
    fn test_known_title_lists_every_skill() {
        let map = SkillMap::default();
        let prompt = build_prompt(
            ResponseFormat::Json,
            CV,
            "Data Scientist",
            "Build models",
            &map,
        );
        for skill in map.skills_for("Data Scientist").unwrap() {
            assert!(prompt.contains(skill.as_str()), "missing skill {skill}");
        }
        assert!(!prompt.contains(INFER_SKILLS_PLACEHOLDER));
    }

    #[test]
    fn test_unknown_title_uses_placeholder() {
        let map = SkillMap::default();
        let prompt = build_prompt(
            ResponseFormat::Json,
            "John Roe\nTest pilot, 12 years",
            "Astronaut",
            "Go to space",
            &map,
        );
        assert!(prompt.contains(INFER_SKILLS_PLACEHOLDER));
        assert!(prompt.contains("Key Skills Expected:\n[Let AI infer skills]\n"));
        for title in map.titles() {
            for skill in map.skills_for(title).unwrap() {
                assert!(!prompt.contains(&format!("{skill}, ")));
            }
        }
    }

    #[test]
    fn test_empty_skill_list_uses_placeholder() {
        let map = SkillMap::new(vec![RoleSkills {
            title: "Intern".into(),
            skills: vec![],
        }]);
        let prompt = build_prompt(ResponseFormat::Json, CV, "Intern", "Learn", &map);
        assert!(prompt.contains(INFER_SKILLS_PLACEHOLDER));
    }

    #[test]
    fn test_prompt_carries_inputs() {
        let prompt = build_prompt(
            ResponseFormat::Json,
            CV,
            "HR Manager",
            "Own recruiting",
            &SkillMap::default(),
        );
        assert!(prompt.starts_with("We are hiring for the role: HR Manager"));
        assert!(prompt.contains("Own recruiting"));
        assert!(prompt.contains(CV));
    }

    #[test]
    fn test_json_contract_names_all_ten_fields() {
        let prompt = build_prompt(ResponseFormat::Json, CV, "x", "y", &SkillMap::default());
        for label in FIELD_LABELS {
            assert!(prompt.contains(&format!("\"{label}\":")), "missing {label}");
        }
        assert!(prompt.contains("Strictly return only a valid JSON object."));
    }

    #[test]
    fn test_markdown_contract_numbers_labels_as_anchors() {
        let prompt = build_prompt(ResponseFormat::Markdown, CV, "x", "y", &SkillMap::default());
        for (index, label) in FIELD_LABELS.iter().enumerate() {
            assert!(prompt.contains(&format!("{}. {label}:", index + 1)));
        }
        assert!(!prompt.contains("Strictly return only a valid JSON object."));
    }

    #[test]
    fn test_response_format_from_str() {
        assert_eq!("JSON".parse::<ResponseFormat>().unwrap(), ResponseFormat::Json);
        assert_eq!(
            " markdown ".parse::<ResponseFormat>().unwrap(),
            ResponseFormat::Markdown
        );
        assert!("yaml".parse::<ResponseFormat>().is_err());
    }
}
