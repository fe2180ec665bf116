//! Plain records for the CRUD entities: users, folders, forms, filled
//! forms and view counters. Form designs live in [`crate::design`],
//! the workspace aggregate in [`crate::workspace`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

pub const NAME_MIN_LEN: usize = 4;
pub const NAME_MAX_LEN: usize = 20;

const PASSWORD_SPECIALS: &str = "@$!%*?&";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public projection of a user, safe to embed in responses.
#[derive(Clone, Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    /// `None` means the form sits at the root level, outside any folder.
    pub folder_id: Option<Uuid>,
}

/// Declared kind of a single response entry. Respondents echo back
/// either the broad element class or the concrete element variant.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ResponseKind {
    Bubble,
    InputType,
    BubbleText,
    BubbleImage,
    InputText,
    InputNumber,
    InputEmail,
    InputPhone,
    InputDate,
    InputRating,
    InputButton,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEntry {
    pub element_id: String,
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
}

/// One respondent session for a form. Responses accumulate over
/// multiple partial submissions and are upserted by element id.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledForm {
    pub id: Uuid,
    pub form_id: Uuid,
    pub responses: Vec<ResponseEntry>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FilledForm {
    pub fn new(form_id: Uuid, responses: Vec<ResponseEntry>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            form_id,
            responses,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Upsert incoming responses by element id: an entry for a known
    /// element overwrites that element's answer, unknown ids append.
    pub fn merge_responses(&mut self, incoming: Vec<ResponseEntry>) {
        for entry in incoming {
            match self
                .responses
                .iter_mut()
                .find(|existing| existing.element_id == entry.element_id)
            {
                Some(existing) => existing.response = entry.response,
                None => self.responses.push(entry),
            }
        }
        self.updated_at = Utc::now();
    }
}

/// Monotonic per-form view counter, created on first view.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCounter {
    pub form_id: Uuid,
    pub views: u64,
}

pub fn validate_name(name: &str) -> CoreResult<()> {
    if name.len() < NAME_MIN_LEN {
        return Err(CoreError::InvalidArgument(format!(
            "Username is too short. It must be at least {NAME_MIN_LEN} characters."
        )));
    }
    if name.len() > NAME_MAX_LEN {
        return Err(CoreError::InvalidArgument(format!(
            "Username is too long. It must not exceed {NAME_MAX_LEN} characters."
        )));
    }
    Ok(())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Shape check only: `local@domain.tld`, no whitespace. Deliverability
/// is not verified.
pub fn validate_email(email: &str) -> CoreResult<()> {
    let invalid = || CoreError::InvalidArgument("Invalid email format".to_string());
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None)
            if !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.') =>
        {
            Ok(())
        }
        _ => Err(invalid()),
    }
}

/// At least 8 characters with one lowercase, one uppercase, one digit
/// and one of `@$!%*?&`, drawn only from those classes.
pub fn validate_password(password: &str) -> CoreResult<()> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c);
    let ok = password.len() >= 8
        && password.chars().all(allowed)
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    if ok {
        Ok(())
    } else {
        Err(CoreError::InvalidArgument(
            "Password must be at least 8 characters long, include at least one uppercase letter, \
             one lowercase letter, one number, and one special character."
                .to_string(),
        ))
    }
}
