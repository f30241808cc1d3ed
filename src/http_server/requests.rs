use std::collections::{BTreeMap, BTreeSet};

use garde::Validate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{GameChanges, GenreChanges, NewGame, NewGenre};

/// Field name → messages, in field order. Serialized as the `errors` object
/// of a 422 response.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_field(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    fn extend_from_report(&mut self, prefix: Option<&str>, report: &garde::Report) {
        for (path, error) in report.iter() {
            let field = match prefix {
                Some(prefix) => format!("{prefix}.{path}"),
                None => path.to_string(),
            };
            self.add(field, error.to_string());
        }
    }
}

impl From<garde::Report> for ValidationErrors {
    fn from(report: garde::Report) -> Self {
        let mut errors = Self::new();
        errors.extend_from_report(None, &report);
        errors
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

fn trim(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_string())
}

/// Trimmed, with blank collapsing to `None`.
fn trim_to_none(value: Option<String>) -> Option<String> {
    trim(value).filter(|value| !value.is_empty())
}

#[derive(Debug, Deserialize, Validate)]
pub struct StoreGameRequest {
    #[garde(required, length(chars, min = 1, max = 255))]
    pub name: Option<String>,
    #[garde(skip)]
    pub description: Option<String>,
}

impl StoreGameRequest {
    pub fn validated(self) -> Result<NewGame, ValidationErrors> {
        let request = Self {
            name: trim_to_none(self.name),
            description: trim_to_none(self.description),
        };
        request.validate()?;

        match request.name {
            Some(name) => Ok(NewGame {
                name,
                description: request.description,
            }),
            None => Err(ValidationErrors::from_field("name", "not set")),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGameRequest {
    #[serde(default)]
    #[garde(length(chars, min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[garde(skip)]
    pub description: Option<Option<String>>,
}

impl UpdateGameRequest {
    pub fn validated(self) -> Result<GameChanges, ValidationErrors> {
        let request = Self {
            name: trim(self.name),
            description: self.description.map(trim_to_none),
        };
        request.validate()?;

        Ok(GameChanges {
            name: request.name,
            description: request.description,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct StoreGenreRequest {
    #[garde(required, length(chars, min = 1, max = 255))]
    pub title: Option<String>,
}

impl StoreGenreRequest {
    pub fn validated(self) -> Result<NewGenre, ValidationErrors> {
        let request = Self {
            title: trim_to_none(self.title),
        };
        request.validate()?;

        match request.title {
            Some(title) => Ok(NewGenre { title }),
            None => Err(ValidationErrors::from_field("title", "not set")),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGenreRequest {
    #[serde(default)]
    #[garde(length(chars, min = 1, max = 255))]
    pub title: Option<String>,
}

impl UpdateGenreRequest {
    pub fn validated(self) -> Result<GenreChanges, ValidationErrors> {
        let request = Self {
            title: trim(self.title),
        };
        request.validate()?;

        Ok(GenreChanges {
            title: request.title,
        })
    }
}

/// One `{ "id": ... }` entry of an association sync payload.
#[derive(Debug, Deserialize, Validate)]
pub struct AssociationItem {
    #[garde(required, range(min = 1))]
    pub id: Option<i64>,
}

/// Body of `add-genres` / `add-games`: a JSON array of `{ "id": ... }`.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct SyncRequest(pub Vec<AssociationItem>);

impl SyncRequest {
    /// Sorted, de-duplicated target ids. Errors are keyed `"{index}.id"`.
    pub fn validated(self) -> Result<Vec<i64>, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut ids = BTreeSet::new();

        for (index, item) in self.0.iter().enumerate() {
            match item.validate() {
                Ok(()) => {
                    if let Some(id) = item.id {
                        ids.insert(id);
                    }
                }
                Err(report) => errors.extend_from_report(Some(&index.to_string()), &report),
            }
        }

        if errors.is_empty() {
            Ok(ids.into_iter().collect())
        } else {
            Err(errors)
        }
    }
}

/// `?include=genres` / `?include=games`, comma separated.
#[derive(Debug, Default, Deserialize)]
pub struct IncludeQuery {
    pub include: Option<String>,
}

impl IncludeQuery {
    pub fn includes(&self, relation: &str) -> bool {
        self.include
            .as_deref()
            .is_some_and(|include| include.split(',').any(|part| part.trim() == relation))
    }
}
