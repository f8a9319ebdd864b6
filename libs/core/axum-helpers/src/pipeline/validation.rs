use std::borrow::Cow;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::errors::ApiError;

/// Separator between individual validation messages.
pub const MESSAGE_SEPARATOR: &str = ";;";

/// Collected validation failures for one request.
///
/// Messages are ordered by field name so the combined message is stable.
#[derive(Debug, Default, Clone)]
pub struct Violations {
    entries: Vec<(String, String)>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the outcome of a derived `validator::Validate` run.
    pub fn from_validator(result: Result<(), ValidationErrors>) -> Self {
        let mut violations = Self::new();
        if let Err(errors) = result {
            violations.collect(None, &errors);
        }
        violations
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.entries.push((field.into(), message.into()));
    }

    /// `Ok` when nothing was collected, otherwise a bad request whose
    /// message joins all collected messages.
    pub fn into_result(mut self) -> Result<(), ApiError> {
        if self.entries.is_empty() {
            return Ok(());
        }

        self.entries.sort_by(|a, b| a.0.cmp(&b.0));
        let message = self
            .entries
            .into_iter()
            .map(|(_, message)| message)
            .collect::<Vec<_>>()
            .join(MESSAGE_SEPARATOR);

        Err(ApiError::bad_request(message))
    }

    fn collect(&mut self, prefix: Option<&str>, errors: &ValidationErrors) {
        for (field, kind) in errors.errors() {
            let path = match prefix {
                Some(prefix) => format!("{prefix}.{field}"),
                None => field.to_string(),
            };

            match kind {
                ValidationErrorsKind::Field(field_errors) => {
                    for error in field_errors {
                        let message = error
                            .message
                            .clone()
                            .unwrap_or_else(|| Cow::Owned(format!("{field} is invalid")));
                        self.entries.push((path.clone(), message.into_owned()));
                    }
                }
                ValidationErrorsKind::Struct(nested) => self.collect(Some(&path), nested),
                ValidationErrorsKind::List(items) => {
                    for (index, nested) in items {
                        self.collect(Some(&format!("{path}[{index}]")), nested);
                    }
                }
            }
        }
    }
}
