use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};

/// A stored feedback submission. Rows are never modified after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = crate::schema::feedback)]
#[diesel(check_for_backend(Sqlite))]
pub struct FeedbackEntry {
    pub id: i32,
    pub overall: String,
    pub program: String,
    pub food: String,
    pub management: String,
    pub venue: String,
    pub favorite: String,
    pub suggestions: String,
    pub contribute: String,
    pub comments: String,
    pub timestamp: String,
}

#[derive(Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::feedback)]
pub struct NewFeedbackEntry {
    pub overall: String,
    pub program: String,
    pub food: String,
    pub management: String,
    pub venue: String,
    pub favorite: String,
    pub suggestions: String,
    pub contribute: String,
    pub comments: String,
    // id is assigned by SQLite
    pub timestamp: String,
}

/// The fields posted by the public feedback form. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackForm {
    pub overall_experience: Option<String>,
    pub program_content: Option<String>,
    pub food: Option<String>,
    pub management: Option<String>,
    pub venue: Option<String>,
    pub favorite_part: Option<String>,
    pub suggestions: Option<String>,
    pub volunteer: Option<String>,
    pub comments: Option<String>,
}

impl FeedbackForm {
    /// Reads an urlencoded request body. The body is never rejected: unknown keys are ignored,
    /// the first value of a repeated key wins, and anything unparseable just leaves fields absent.
    pub fn from_body(body: &[u8]) -> Self {
        let mut form = Self::default();
        for (key, value) in form_urlencoded::parse(body) {
            let field = match key.as_ref() {
                "overall_experience" => &mut form.overall_experience,
                "program_content" => &mut form.program_content,
                "food" => &mut form.food,
                "management" => &mut form.management,
                "venue" => &mut form.venue,
                "favorite_part" => &mut form.favorite_part,
                "suggestions" => &mut form.suggestions,
                "volunteer" => &mut form.volunteer,
                "comments" => &mut form.comments,
                _ => continue,
            };
            if field.is_none() {
                *field = Some(value.into_owned());
            }
        }
        form
    }

    /// Builds the row to insert, substituting the empty string for every absent field.
    pub fn into_new_entry(self, timestamp: String) -> NewFeedbackEntry {
        NewFeedbackEntry {
            overall: self.overall_experience.unwrap_or_default(),
            program: self.program_content.unwrap_or_default(),
            food: self.food.unwrap_or_default(),
            management: self.management.unwrap_or_default(),
            venue: self.venue.unwrap_or_default(),
            favorite: self.favorite_part.unwrap_or_default(),
            suggestions: self.suggestions.unwrap_or_default(),
            contribute: self.volunteer.unwrap_or_default(),
            comments: self.comments.unwrap_or_default(),
            timestamp,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub password: String,
}

impl LoginForm {
    /// A missing body or missing `password` field reads as the empty password.
    pub fn from_body(body: &[u8]) -> Self {
        let password = form_urlencoded::parse(body)
            .find(|(key, _)| key == "password")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        Self { password }
    }
}

/// Per-client server-side session state. `admin` is only set by a successful login.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminSession {
    pub admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_form_from_body() {
        let form = FeedbackForm::from_body(
            b"overall_experience=Great&food=&favorite_part=The+food&comments=caf%C3%A9&other=x",
        );
        assert_eq!(form.overall_experience.as_deref(), Some("Great"));
        assert_eq!(form.food.as_deref(), Some(""));
        assert_eq!(form.favorite_part.as_deref(), Some("The food"));
        assert_eq!(form.comments.as_deref(), Some("café"));
        assert_eq!(form.program_content, None);
        assert_eq!(form.volunteer, None);
    }

    #[test]
    fn test_feedback_form_repeated_key_keeps_first() {
        let form = FeedbackForm::from_body(b"food=a&food=b&volunteer=Yes&volunteer=No");
        assert_eq!(form.food.as_deref(), Some("a"));
        assert_eq!(form.volunteer.as_deref(), Some("Yes"));
    }

    #[test]
    fn test_feedback_form_empty_or_garbage_body() {
        assert_eq!(FeedbackForm::from_body(b""), FeedbackForm::default());
        assert_eq!(FeedbackForm::from_body(b"{\"food\": 1}"), FeedbackForm::default());

        let entry = FeedbackForm::from_body(b"").into_new_entry("2025-03-01 18:30:00".into());
        assert_eq!(entry.overall, "");
        assert_eq!(entry.contribute, "");
    }

    #[test]
    fn test_login_form_from_body() {
        assert_eq!(LoginForm::from_body(b"password=open+sesame").password, "open sesame");
        assert_eq!(LoginForm::from_body(b"password=a&password=b").password, "a");
        assert_eq!(LoginForm::from_body(b"").password, "");
        assert_eq!(LoginForm::from_body(b"user=admin").password, "");
    }
}
