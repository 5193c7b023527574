//! Resolved mapping types.

use serde::{Serialize, Serializer};

use csvdb_model::{DataType, KeyRole};

use crate::transforms::Transform;

/// Suffix appended to foreign-key columns in the fact table.
pub const FOREIGN_KEY_SUFFIX: &str = "_id";

/// Name of the synthetic primary key added to tables without one.
pub const SURROGATE_KEY: &str = "id";

/// A mapping after defaults, name resolution and deduplication.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnMapping {
    /// Position of the source value in each raw row.
    pub source_index: usize,
    /// Unique output identifier.
    pub column_name: String,
    pub data_type: DataType,
    pub key_role: KeyRole,
    #[serde(serialize_with = "serialize_transform")]
    pub transform: Transform,
}

fn serialize_transform<S: Serializer>(transform: &Transform, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(transform.name())
}

impl ColumnMapping {
    pub fn is_foreign_key(&self) -> bool {
        self.key_role == KeyRole::Foreign
    }

    pub fn is_primary_key(&self) -> bool {
        self.key_role == KeyRole::Primary
    }

    /// Name of the column in the stored table.
    ///
    /// Foreign keys are stored as `<column_name>_id`.
    pub fn stored_name(&self) -> String {
        if self.is_foreign_key() {
            format!("{}{FOREIGN_KEY_SUFFIX}", self.column_name)
        } else {
            self.column_name.clone()
        }
    }

    /// Satellite table holding this foreign key's value domain.
    pub fn satellite_table(&self) -> Option<&str> {
        self.is_foreign_key().then_some(self.column_name.as_str())
    }

    /// Storage type of the stored column. Foreign keys hold surrogate ids.
    pub fn stored_type(&self) -> DataType {
        if self.is_foreign_key() {
            DataType::Integer
        } else {
            self.data_type
        }
    }
}

/// The complete, ordered set of resolved mappings for one table.
///
/// Mapping order is the column order used for both table creation and
/// bulk insertion.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ResolvedMappings {
    columns: Vec<ColumnMapping>,
}

impl ResolvedMappings {
    pub fn new(columns: Vec<ColumnMapping>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnMapping] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnMapping> {
        self.columns.iter()
    }

    pub fn primary_key(&self) -> Option<&ColumnMapping> {
        self.columns.iter().find(|mapping| mapping.is_primary_key())
    }

    /// Whether the stored table gets the synthetic `id` key.
    pub fn needs_surrogate_key(&self) -> bool {
        self.primary_key().is_none()
    }

    /// Foreign-key mappings with their position in the mapping order.
    pub fn foreign_keys(&self) -> impl Iterator<Item = (usize, &ColumnMapping)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, mapping)| mapping.is_foreign_key())
    }

    /// Stored column names in mapping order.
    pub fn stored_names(&self) -> Vec<String> {
        self.columns.iter().map(ColumnMapping::stored_name).collect()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|mapping| mapping.column_name.as_str())
    }
}

impl<'a> IntoIterator for &'a ResolvedMappings {
    type Item = &'a ColumnMapping;
    type IntoIter = std::slice::Iter<'a, ColumnMapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
