// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Typed records of the package tables used by the analysis, decoded from fetched rows.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use super::action::ActionFlags;
use super::name::{decode_default_dir, decode_name};
use super::row::{FetchError, Row, RowError, RowFetcher};

/// Result type for table decoding.
pub type TableResult<T> = std::result::Result<T, TableError>;

/// Errors that can occur when decoding package tables.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Required table {table} is missing from the package")]
    RequiredTableAbsent { table: &'static str },
    #[error("Required property {property} is missing from the Property table")]
    MissingProperty { property: &'static str },
    #[error("Failed to fetch table {table}")]
    Fetch {
        table: &'static str,
        #[source]
        source: FetchError,
    },
    #[error("Malformed row in table {table}")]
    MalformedRow {
        table: &'static str,
        #[source]
        source: RowError,
    },
}

/// A table schema: its name, projected columns and whether the package must contain it.
trait TableRecord: Sized {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    const REQUIRED: bool;

    fn from_row(row: &Row) -> Result<Self, RowError>;
}

/// Fetch and decode all records of one table.
///
/// An absent optional table decodes to an empty list; an absent required table is an error.
fn query<T: TableRecord>(fetcher: &impl RowFetcher) -> TableResult<Vec<T>> {
    let rows = fetcher
        .fetch(T::TABLE, T::COLUMNS)
        .map_err(|e| TableError::Fetch {
            table: T::TABLE,
            source: e,
        })?;
    let Some(rows) = rows else {
        if T::REQUIRED {
            return Err(TableError::RequiredTableAbsent { table: T::TABLE });
        }
        debug!(table = T::TABLE, "Optional table absent");
        return Ok(Vec::new());
    };
    let records = rows
        .iter()
        .map(T::from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TableError::MalformedRow {
            table: T::TABLE,
            source: e,
        })?;
    debug!(table = T::TABLE, rows = records.len(), "Decoded table");
    Ok(records)
}

/// Component table entry.
///
/// See <https://learn.microsoft.com/en-us/windows/win32/msi/component-table>.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentRecord {
    pub component: String,
    /// Component GUID; empty for components that are never registered.
    pub component_id: String,
    pub directory: String,
    /// 0x100 = 64-bit, 0x004 = registry key path, ...
    pub attributes: i32,
}

impl ComponentRecord {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.component
    }
}

impl TableRecord for ComponentRecord {
    const TABLE: &'static str = "Component";
    const COLUMNS: &'static [&'static str] =
        &["Component", "ComponentId", "Directory_", "Attributes"];
    const REQUIRED: bool = true;

    fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            component: row.text(0)?,
            component_id: row.text(1)?,
            directory: row.text(2)?,
            attributes: row.integer(3)?,
        })
    }
}

/// File table entry.
///
/// See <https://learn.microsoft.com/en-us/windows/win32/msi/file-table>.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub file: String,
    pub component: String,
    /// Stored as `short|long` when the long name does not fit 8.3.
    pub file_name: String,
}

impl FileRecord {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.file
    }

    /// The long file name.
    #[must_use]
    pub fn long_name(&self) -> &str {
        decode_name(&self.file_name)
    }
}

impl TableRecord for FileRecord {
    const TABLE: &'static str = "File";
    const COLUMNS: &'static [&'static str] = &["File", "Component_", "FileName"];
    const REQUIRED: bool = true;

    fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            file: row.text(0)?,
            component: row.text(1)?,
            file_name: row.text(2)?,
        })
    }
}

/// Directory table entry.
///
/// See <https://learn.microsoft.com/en-us/windows/win32/msi/directory-table>.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryRecord {
    pub directory: String,
    /// Empty, or equal to `directory`, for root directories.
    pub parent: String,
    /// Stored as `target[:source]`, each half in `short|long` form.
    pub default_dir: String,
}

impl DirectoryRecord {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.directory
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_empty() || self.parent == self.directory
    }

    /// Long name of the target directory, `None` if it adds no path segment below its parent.
    #[must_use]
    pub fn target_name(&self) -> Option<&str> {
        decode_default_dir(&self.default_dir)
    }
}

impl TableRecord for DirectoryRecord {
    const TABLE: &'static str = "Directory";
    const COLUMNS: &'static [&'static str] = &["Directory", "Directory_Parent", "DefaultDir"];
    const REQUIRED: bool = true;

    fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            directory: row.text(0)?,
            parent: row.text(1)?,
            default_dir: row.text(2)?,
        })
    }
}

/// CustomAction table entry.
///
/// See <https://learn.microsoft.com/en-us/windows/win32/msi/customaction-table>.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomActionRecord {
    pub action: String,
    pub flags: ActionFlags,
    /// File, Binary, Directory or Property key depending on the action type. Not guaranteed to
    /// resolve to a File table entry.
    pub source: String,
    pub target: String,
    pub extended_type: Option<i32>,
}

impl TableRecord for CustomActionRecord {
    const TABLE: &'static str = "CustomAction";
    const COLUMNS: &'static [&'static str] =
        &["Action", "Type", "Source", "Target", "ExtendedType"];
    const REQUIRED: bool = false;

    fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            action: row.text(0)?,
            flags: ActionFlags::from_column(row.integer(1)?),
            source: row.text(2)?,
            target: row.text(3)?,
            extended_type: row.optional_integer(4)?,
        })
    }
}

/// Feature table entry.
///
/// See <https://learn.microsoft.com/en-us/windows/win32/msi/feature-table>.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureRecord {
    pub feature: String,
    pub title: String,
    pub description: String,
    /// UI order; `None` hides the feature.
    pub display: Option<i32>,
    /// 0 disables installation.
    pub level: i32,
    pub attributes: i32,
}

impl fmt::Display for FeatureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Title={}, Description={}, Feature={}",
            self.title, self.description, self.feature
        )
    }
}

impl TableRecord for FeatureRecord {
    const TABLE: &'static str = "Feature";
    const COLUMNS: &'static [&'static str] = &[
        "Feature",
        "Title",
        "Description",
        "Display",
        "Level",
        "Attributes",
    ];
    const REQUIRED: bool = true;

    fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            feature: row.text(0)?,
            title: row.text(1)?,
            description: row.text(2)?,
            display: row.optional_integer(3)?,
            level: row.integer(4)?,
            attributes: row.integer(5)?,
        })
    }
}

/// Predefined registry root of a Registry table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RegistryRoot {
    /// `HKEY_CURRENT_USER` or `HKEY_LOCAL_MACHINE` depending on the install scope.
    Dynamic,
    ClassesRoot,
    CurrentUser,
    LocalMachine,
    Users,
}

impl RegistryRoot {
    #[must_use]
    pub fn from_column(value: i32) -> Option<Self> {
        match value {
            -1 => Some(Self::Dynamic),
            0 => Some(Self::ClassesRoot),
            1 => Some(Self::CurrentUser),
            2 => Some(Self::LocalMachine),
            3 => Some(Self::Users),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dynamic => "Dynamic",
            Self::ClassesRoot => "ClassesRoot",
            Self::CurrentUser => "CurrentUser",
            Self::LocalMachine => "LocalMachine",
            Self::Users => "Users",
        }
    }
}

/// Registry table entry.
///
/// See <https://learn.microsoft.com/en-us/windows/win32/msi/registry-table>.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryRecord {
    pub registry: String,
    pub root: RegistryRoot,
    pub key: String,
    pub name: String,
    pub value: String,
    pub component: String,
}

impl fmt::Display for RegistryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\\{}\\{}={}",
            self.root.as_str(),
            self.key,
            self.name,
            self.value
        )
    }
}

impl TableRecord for RegistryRecord {
    const TABLE: &'static str = "Registry";
    const COLUMNS: &'static [&'static str] =
        &["Registry", "Root", "Key", "Name", "Value", "Component_"];
    const REQUIRED: bool = false;

    fn from_row(row: &Row) -> Result<Self, RowError> {
        let root = row.integer(1)?;
        Ok(Self {
            registry: row.text(0)?,
            root: RegistryRoot::from_column(root).ok_or_else(|| row.invalid_value(1, root))?,
            key: row.text(2)?,
            name: row.text(3)?,
            value: row.text(4)?,
            component: row.text(5)?,
        })
    }
}

/// Property table entry.
struct PropertyRecord {
    property: String,
    value: String,
}

impl TableRecord for PropertyRecord {
    const TABLE: &'static str = "Property";
    const COLUMNS: &'static [&'static str] = &["Property", "Value"];
    const REQUIRED: bool = true;

    fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            property: row.text(0)?,
            value: row.text(1)?,
        })
    }
}

/// Identifying product properties of the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductProperties {
    pub product_code: String,
    pub upgrade_code: Option<String>,
    pub product_name: String,
    pub product_version: String,
    pub manufacturer: String,
}

impl ProductProperties {
    fn from_records(records: Vec<PropertyRecord>) -> TableResult<Self> {
        let mut product_code = None;
        let mut upgrade_code = None;
        let mut product_name = None;
        let mut product_version = None;
        let mut manufacturer = None;
        for record in records {
            let slot = match record.property.as_str() {
                "ProductCode" => &mut product_code,
                "UpgradeCode" => &mut upgrade_code,
                "ProductName" => &mut product_name,
                "ProductVersion" => &mut product_version,
                "Manufacturer" => &mut manufacturer,
                _ => continue,
            };
            slot.get_or_insert(record.value);
        }
        let required = |value: Option<String>, property| {
            value.ok_or(TableError::MissingProperty { property })
        };
        Ok(Self {
            product_code: required(product_code, "ProductCode")?,
            upgrade_code,
            product_name: required(product_name, "ProductName")?,
            product_version: required(product_version, "ProductVersion")?,
            manufacturer: required(manufacturer, "Manufacturer")?,
        })
    }
}

/// All tables of one package used by the analysis, decoded once and never modified.
#[derive(Debug, Clone)]
pub struct PackageTables {
    properties: ProductProperties,
    features: Vec<FeatureRecord>,
    components: Vec<ComponentRecord>,
    files: Vec<FileRecord>,
    directories: Vec<DirectoryRecord>,
    custom_actions: Vec<CustomActionRecord>,
    registry: Vec<RegistryRecord>,
}

impl PackageTables {
    /// Fetch and decode every table used by the analysis.
    ///
    /// # Errors
    /// Returns an error if a required table or property is missing, or a row is malformed.
    pub fn load(fetcher: &impl RowFetcher) -> TableResult<Self> {
        Ok(Self {
            properties: ProductProperties::from_records(query(fetcher)?)?,
            features: query(fetcher)?,
            components: query(fetcher)?,
            files: query(fetcher)?,
            directories: query(fetcher)?,
            custom_actions: query(fetcher)?,
            registry: query(fetcher)?,
        })
    }

    #[must_use]
    pub fn properties(&self) -> &ProductProperties {
        &self.properties
    }

    #[must_use]
    pub fn features(&self) -> &[FeatureRecord] {
        &self.features
    }

    #[must_use]
    pub fn components(&self) -> &[ComponentRecord] {
        &self.components
    }

    #[must_use]
    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    #[must_use]
    pub fn directories(&self) -> &[DirectoryRecord] {
        &self.directories
    }

    #[must_use]
    pub fn custom_actions(&self) -> &[CustomActionRecord] {
        &self.custom_actions
    }

    #[must_use]
    pub fn registry(&self) -> &[RegistryRecord] {
        &self.registry
    }
}
