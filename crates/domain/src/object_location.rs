use std::fmt::{Display, Formatter};

use ppecheck_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Storage location of a newly created object that triggered an inspection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectLocation {
    container: NonEmptyString,
    object_key: NonEmptyString,
}

impl ObjectLocation {
    /// Creates a validated object location.
    pub fn new(container: impl Into<String>, object_key: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            container: NonEmptyString::new(container)?,
            object_key: NonEmptyString::new(object_key)?,
        })
    }

    /// Returns the bucket or container name.
    #[must_use]
    pub fn container(&self) -> &str {
        self.container.as_str()
    }

    /// Returns the full object key inside the container.
    #[must_use]
    pub fn object_key(&self) -> &str {
        self.object_key.as_str()
    }

    /// Returns the name recorded alongside the compliance verdicts.
    #[must_use]
    pub fn file_name(&self) -> &NonEmptyString {
        &self.object_key
    }

    /// Returns the last path segment of the object key.
    ///
    /// Falls back to the whole key when it ends with a separator.
    #[must_use]
    pub fn object_basename(&self) -> &str {
        let key = self.object_key.as_str();
        key.rsplit('/')
            .next()
            .filter(|segment| !segment.trim().is_empty())
            .unwrap_or(key)
    }

    /// Returns the lowercase extension of the object key, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let basename = self.object_basename();
        let (stem, extension) = basename.rsplit_once('.')?;
        (!stem.is_empty() && !extension.is_empty()).then(|| extension.to_ascii_lowercase())
    }
}

impl Display for ObjectLocation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "gs://{}/{}", self.container, self.object_key)
    }
}
