//! Parameter metadata and its flat persisted form.
//!
//! The persisted form is a JSON array, one entry per built-in parameter:
//!
//! ```json
//! [{"builtInCode": -1001, "name": "Mark", "isInstance": true, "categories": [-2000011]}]
//! ```
//!
//! There is no version field. A format change must move the file to a new
//! location rather than try to read an older layout.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sifter_convert::ElementId;

use crate::error::{ParamError, Result};
use crate::identifier::ParameterId;

/// What is known about one parameter across categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMetadata {
    /// The parameter.
    pub id: ParameterId,
    /// `true` if seen on instance records, `false` if only on type records.
    pub is_instance: bool,
    /// Categories whose records carry this parameter.
    pub categories: BTreeSet<ElementId>,
}

impl ParameterMetadata {
    /// Creates metadata with no categories yet.
    pub fn new(id: ParameterId, is_instance: bool) -> Self {
        ParameterMetadata {
            id,
            is_instance,
            categories: BTreeSet::new(),
        }
    }

    /// Records that `category` carries this parameter.
    ///
    /// Returns `true` if the category was not known before.
    pub fn add_category(&mut self, category: ElementId) -> bool {
        self.categories.insert(category)
    }

    /// Returns `true` if `category` carries this parameter.
    pub fn applies_to(&self, category: ElementId) -> bool {
        self.categories.contains(&category)
    }
}

/// One persisted entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    pub built_in_code: i64,
    pub name: String,
    pub is_instance: bool,
    pub categories: Vec<i64>,
}

impl TryFrom<&ParameterMetadata> for MetadataRecord {
    type Error = ParamError;

    fn try_from(meta: &ParameterMetadata) -> Result<Self> {
        let code = match meta.id.builtin_code() {
            Some(code) if meta.id.is_builtin() => code,
            _ => return Err(ParamError::NotPersistable(meta.id.to_string())),
        };
        Ok(MetadataRecord {
            built_in_code: code,
            name: meta.id.display_name().unwrap_or_default().to_string(),
            is_instance: meta.is_instance,
            categories: meta.categories.iter().map(|c| c.value()).collect(),
        })
    }
}

impl TryFrom<MetadataRecord> for ParameterMetadata {
    type Error = ParamError;

    fn try_from(record: MetadataRecord) -> Result<Self> {
        let id = ParameterId::builtin_named(record.built_in_code, &record.name)?;
        Ok(ParameterMetadata {
            id,
            is_instance: record.is_instance,
            categories: record.categories.into_iter().map(ElementId).collect(),
        })
    }
}

/// Serializes metadata entries to the persisted JSON form.
///
/// Entries that are not built-in parameters are rejected.
pub fn to_json<'a, I>(entries: I) -> Result<String>
where
    I: IntoIterator<Item = &'a ParameterMetadata>,
{
    let records = entries
        .into_iter()
        .map(MetadataRecord::try_from)
        .collect::<Result<Vec<_>>>()?;
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Parses the persisted JSON form.
pub fn from_json(json: &str) -> Result<Vec<ParameterMetadata>> {
    let records: Vec<MetadataRecord> = serde_json::from_str(json)?;
    records.into_iter().map(ParameterMetadata::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark() -> ParameterMetadata {
        let mut meta =
            ParameterMetadata::new(ParameterId::builtin_named(-1001, "Mark").unwrap(), true);
        meta.add_category(ElementId(-2000011));
        meta.add_category(ElementId(-2000014));
        meta
    }

    #[test]
    fn add_category_reports_novelty() {
        let mut meta = mark();
        assert!(!meta.add_category(ElementId(-2000011)));
        assert!(meta.add_category(ElementId(-2000023)));
        assert!(meta.applies_to(ElementId(-2000023)));
        assert!(!meta.applies_to(ElementId(5)));
    }

    #[test]
    fn field_names_are_camel_case() {
        let json = to_json([&mark()]).unwrap();
        assert!(json.contains("\"builtInCode\": -1001"));
        assert!(json.contains("\"isInstance\": true"));
        assert!(json.contains("\"name\": \"Mark\""));
    }

    #[test]
    fn json_round_trip() {
        let original = vec![mark()];
        let json = to_json(&original).unwrap();
        let back = from_json(&json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn unnamed_builtin_round_trips() {
        let meta = ParameterMetadata::new(ParameterId::builtin(-7).unwrap(), false);
        let back = from_json(&to_json([&meta]).unwrap()).unwrap();
        assert_eq!(back, vec![meta]);
    }

    #[test]
    fn non_builtin_is_not_persistable() {
        let meta = ParameterMetadata::new(ParameterId::name("Custom").unwrap(), true);
        assert!(matches!(
            to_json([&meta]),
            Err(ParamError::NotPersistable(_))
        ));
    }

    #[test]
    fn corrupt_json_is_an_error() {
        assert!(matches!(from_json("[{"), Err(ParamError::Json(_))));
        assert!(matches!(
            from_json(r#"[{"builtInCode": 5, "name": "x", "isInstance": true, "categories": []}]"#),
            Err(ParamError::NotBuiltin(5))
        ));
    }
}
