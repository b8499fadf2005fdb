use serde::{Deserialize, Deserializer, Serialize};

/// One planned task attached to a day.
///
/// Every field but `name` defaults when missing so blobs written by older
/// versions, or by variants without subjects, still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
    /// Hours. `null` (an unparsable entry saved by the web version) reads as 0.
    #[serde(default, deserialize_with = "lenient_hours")]
    pub duration: f64,
}

fn lenient_hours<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let hours = Option::<f64>::deserialize(deserializer)?;
    Ok(hours.filter(|h| h.is_finite()).unwrap_or(0.0))
}

impl Task {
    pub fn description(&self) -> Option<&str> {
        let d = self.description.trim();
        if d.is_empty() { None } else { Some(d) }
    }

    /// `"2 hours"`, `"1 hour"`, `"1.5 hours"`.
    pub fn duration_display(&self) -> String {
        if self.duration == 1.0 {
            "1 hour".to_string()
        } else {
            format!("{} hours", self.duration)
        }
    }

    /// Whole seconds for the countdown, rounded to the nearest second.
    pub fn duration_secs(&self) -> u64 {
        if self.duration.is_finite() && self.duration > 0.0 {
            (self.duration * 3600.0).round() as u64
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub color: String,
}

impl Subject {
    fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

/// Fixed subject-to-color lookup used when a task doesn't pick its own color.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectPalette {
    subjects: Vec<Subject>,
}

impl Default for SubjectPalette {
    fn default() -> Self {
        Self {
            subjects: vec![
                Subject::new("Mathematics", "#FF6B6B"),
                Subject::new("Science", "#f072c6"),
                Subject::new("English", "#a283f8"),
                Subject::new("History", "#f7ce82"),
                Subject::new("Electives", "#2ECC71"),
            ],
        }
    }
}

impl SubjectPalette {
    /// An empty list falls back to the built-in palette.
    pub fn new(subjects: Vec<Subject>) -> Self {
        if subjects.is_empty() {
            Self::default()
        } else {
            Self { subjects }
        }
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn get(&self, index: usize) -> Option<&Subject> {
        self.subjects.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.subjects
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn color_for(&self, name: &str) -> Option<&str> {
        self.index_of(name)
            .map(|i| self.subjects[i].color.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(duration: f64) -> Task {
        Task {
            name: "Essay".into(),
            subject: Some("English".into()),
            color: "#a283f8".into(),
            description: String::new(),
            duration,
        }
    }

    #[test]
    fn duration_seconds_round() {
        assert_eq!(task(2.0).duration_secs(), 7200);
        assert_eq!(task(0.25).duration_secs(), 900);
        assert_eq!(task(0.0001).duration_secs(), 0);
        assert_eq!(task(1.0 / 7.0).duration_secs(), 514);
        assert_eq!(task(f64::NAN).duration_secs(), 0);
    }

    #[test]
    fn duration_labels() {
        assert_eq!(task(1.0).duration_display(), "1 hour");
        assert_eq!(task(2.0).duration_display(), "2 hours");
        assert_eq!(task(1.5).duration_display(), "1.5 hours");
    }

    #[test]
    fn missing_optional_fields_load() {
        let t: Task = serde_json::from_str(r#"{"name":"Read"}"#).expect("parse");
        assert_eq!(t.name, "Read");
        assert_eq!(t.subject, None);
        assert_eq!(t.duration, 0.0);
        assert_eq!(t.description(), None);
    }

    #[test]
    fn null_duration_reads_as_zero() {
        let t: Task =
            serde_json::from_str(r#"{"name":"Read","duration":null}"#).expect("parse");
        assert_eq!(t.duration, 0.0);
        let json = serde_json::to_string(&t).expect("serialize");
        assert!(json.contains(r#""duration":0.0"#));
    }

    #[test]
    fn palette_lookup_is_case_insensitive() {
        let palette = SubjectPalette::default();
        assert_eq!(palette.color_for("english"), Some("#a283f8"));
        assert_eq!(palette.color_for("Art"), None);
        assert_eq!(SubjectPalette::new(Vec::new()), palette);
    }
}
