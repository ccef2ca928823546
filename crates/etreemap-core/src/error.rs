use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid treemap document: {message}")]
    InvalidDocument { message: String },

    #[error(transparent)]
    Settings(#[from] SettingsErrors),
}

/// A single rejected settings value.
///
/// Messages name the offending field so they can be shown to the author as-is.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("settings entry {index} must be an object")]
    NotAnObject { index: usize },

    #[error("{field} must be a number!")]
    NotANumber { field: String },

    #[error("{field} must be >= {low}")]
    BelowMinimum { field: String, low: f64, value: f64 },

    #[error("{field} must be <= {high}")]
    AboveMaximum { field: String, high: f64, value: f64 },

    #[error("{field} must be true or false (no quotes)!")]
    NotABoolean { field: String },

    #[error("{field} must be in this list: {}", .allowed.join(","))]
    NotInList {
        field: String,
        allowed: &'static [&'static str],
    },

    #[error("{field} must be an object with any of h, s, l and a")]
    NotAColor { field: String },

    #[error("aspect_ratio cannot include any zeros")]
    AspectRatioZero,

    #[error("aspect_ratio must be written as \"width:height\", got {raw}")]
    MalformedAspectRatio { raw: String },
}

impl SettingsError {
    pub fn field(&self) -> &str {
        match self {
            SettingsError::NotAnObject { .. } => "settings",
            SettingsError::NotANumber { field }
            | SettingsError::BelowMinimum { field, .. }
            | SettingsError::AboveMaximum { field, .. }
            | SettingsError::NotABoolean { field }
            | SettingsError::NotInList { field, .. }
            | SettingsError::NotAColor { field } => field,
            SettingsError::AspectRatioZero | SettingsError::MalformedAspectRatio { .. } => {
                "aspect_ratio"
            }
        }
    }
}

/// Every error collected while resolving one document's settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingsErrors(pub Vec<SettingsError>);

impl SettingsErrors {
    pub fn iter(&self) -> std::slice::Iter<'_, SettingsError> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for SettingsErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SettingsErrors {}

impl<'a> IntoIterator for &'a SettingsErrors {
    type Item = &'a SettingsError;
    type IntoIter = std::slice::Iter<'a, SettingsError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
