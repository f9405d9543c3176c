use serde::Serialize;

pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl NewContact {
    /// Checks presence and column limits, returning one message per violation.
    pub fn validate(
        name: Option<&str>,
        email: Option<&str>,
        message: Option<&str>,
    ) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();

        let name = required_field(name, "Name", &mut errors);
        let email = required_field(email, "Email", &mut errors);
        let message = required_field(message, "Message", &mut errors);

        if let Some(name) = &name {
            if name.chars().count() > NAME_MAX_CHARS {
                errors.push(format!("Name must be at most {NAME_MAX_CHARS} characters."));
            }
        }
        if let Some(email) = &email {
            if email.chars().count() > EMAIL_MAX_CHARS {
                errors.push(format!("Email must be at most {EMAIL_MAX_CHARS} characters."));
            }
        }

        match (name, email, message) {
            (Some(name), Some(email), Some(message)) if errors.is_empty() => Ok(Self {
                name,
                email,
                message,
            }),
            _ => Err(errors),
        }
    }
}

fn required_field(value: Option<&str>, label: &str, errors: &mut Vec<String>) -> Option<String> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => {
            errors.push(format!("{label} is required."));
            None
        }
    }
}
