// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Reads installer database tables exported as IDT text archives.
//!
//! An archive holds one table:
//! 1. tab-separated column names,
//! 2. column definitions (`s72`, `S255`, `l0`, `i2`, `I4`, `v0`, ...; upper case is nullable),
//! 3. the table name followed by its primary key columns, optionally preceded by a code page,
//! 4. one tab-separated line per row.
//!
//! Control characters inside values are escaped: 0x11 for CR, 0x19 for LF and 0x15 for TAB.
//!
//! Archives are UTF-8 (as exported by `msidump`) or encoded in the code page declared on the third
//! line (as exported by `MsiDatabaseExport`).
//!
//! See <https://learn.microsoft.com/en-us/windows/win32/msi/archive-file-format>.

use std::collections::HashMap;
use std::fs;
use std::io;
use encoding_rs::Encoding;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use super::row::{FetchError, Row, RowError, RowFetcher, Value};

/// File extension of exported table archives.
pub(crate) const IDT_EXTENSION: &str = "idt";

type Result<T> = std::result::Result<T, IdtError>;

/// Errors that can occur when reading IDT archives.
#[derive(Debug, Error)]
pub enum IdtError {
    #[error("Failed to read table archive: {path:?}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to walk table archive directory: {path:?}")]
    WalkDirFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Table archive {path:?} is not UTF-8 and declares no code page")]
    UndeclaredEncoding { path: PathBuf },
    #[error("Table archive {path:?} uses unsupported code page {codepage}")]
    UnsupportedCodepage { path: PathBuf, codepage: u32 },
    #[error("Table archive {path:?} is not valid {encoding} text")]
    InvalidEncoding {
        path: PathBuf,
        encoding: &'static str,
    },
    #[error("Table archive is missing its {line} header line")]
    MissingHeader { line: &'static str },
    #[error("Invalid column definition {definition:?} for column {table}.{column}")]
    InvalidColumnType {
        table: String,
        column: String,
        definition: String,
    },
    #[error("Table {table} declares {names} column names but {definitions} column definitions")]
    ColumnMismatch {
        table: String,
        names: usize,
        definitions: usize,
    },
    #[error("Table {table} line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        table: String,
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    String,
    Localizable,
    Integer,
    Stream,
}

/// Column definition from the archive's second header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    nullable: bool,
}

impl Column {
    fn parse(table: &str, name: &str, definition: &str) -> Result<Self> {
        let invalid = || IdtError::InvalidColumnType {
            table: table.to_string(),
            column: name.to_string(),
            definition: definition.to_string(),
        };
        let mut chars = definition.chars();
        let letter = chars.next().ok_or_else(invalid)?;
        let kind = match letter.to_ascii_lowercase() {
            's' => ColumnKind::String,
            'l' => ColumnKind::Localizable,
            'i' => ColumnKind::Integer,
            'v' => ColumnKind::Stream,
            _ => return Err(invalid()),
        };
        // Width only bounds the value length, which the package already enforced.
        chars.as_str().parse::<u16>().map_err(|_| invalid())?;
        Ok(Self {
            name: name.to_string(),
            kind,
            nullable: letter.is_ascii_uppercase(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    #[must_use]
    pub fn nullable(&self) -> bool {
        self.nullable
    }
}

/// One exported table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdtTable {
    name: String,
    codepage: Option<u32>,
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl IdtTable {
    /// Parse the text of an archive.
    ///
    /// # Errors
    /// Returns an error if a header line is missing or malformed, or a row has the wrong number of
    /// fields.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let names = lines
            .next()
            .ok_or(IdtError::MissingHeader { line: "column name" })?;
        let definitions = lines.next().ok_or(IdtError::MissingHeader {
            line: "column definition",
        })?;
        let table_line = lines
            .next()
            .ok_or(IdtError::MissingHeader { line: "table name" })?;

        let (codepage, name) = Self::parse_table_line(table_line)?;
        let names = header_fields(names);
        let definitions = header_fields(definitions);
        if names.len() != definitions.len() {
            return Err(IdtError::ColumnMismatch {
                table: name,
                names: names.len(),
                definitions: definitions.len(),
            });
        }
        let columns = names
            .iter()
            .zip(&definitions)
            .map(|(column, definition)| Column::parse(&name, column, definition))
            .collect::<Result<Vec<_>>>()?;

        let mut rows = Vec::new();
        // Header occupies lines 1-3.
        for (idx, line) in lines.enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            let fields: Vec<String> = line.split('\t').map(unescape).collect();
            if fields.len() != columns.len() {
                return Err(IdtError::FieldCount {
                    table: name,
                    line: idx + 4,
                    expected: columns.len(),
                    found: fields.len(),
                });
            }
            rows.push(fields);
        }

        Ok(Self {
            name,
            codepage,
            columns,
            rows,
        })
    }

    /// Split the table line into its code page and table name. Key column names are not needed.
    fn parse_table_line(line: &str) -> Result<(Option<u32>, String)> {
        let mut fields: Vec<&str> = split_fields(line).collect();
        let codepage = match fields.first().map(|f| f.parse::<u32>()) {
            Some(Ok(codepage)) if fields.len() > 1 => {
                fields.remove(0);
                Some(codepage)
            }
            _ => None,
        };
        let name = fields
            .first()
            .filter(|name| !name.is_empty())
            .ok_or(IdtError::MissingHeader { line: "table name" })?;
        Ok((codepage, (*name).to_string()))
    }

    /// Read and parse an archive file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| IdtError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&decode(path, &bytes)?)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn codepage(&self) -> Option<u32> {
        self.codepage
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Project the rows onto `columns`, converting integer columns.
    fn project(&self, columns: &[&str]) -> std::result::Result<Vec<Row>, FetchError> {
        let indices = columns
            .iter()
            .map(|requested| {
                self.columns
                    .iter()
                    .position(|column| column.name == *requested)
                    .ok_or_else(|| FetchError::UnknownColumn {
                        table: self.name.clone(),
                        column: (*requested).to_string(),
                    })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        self.rows
            .iter()
            .map(|fields| {
                let values = indices
                    .iter()
                    .map(|&idx| self.value(&self.columns[idx], &fields[idx]))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(Row::new(&self.name, columns, values))
            })
            .collect()
    }

    fn value(&self, column: &Column, field: &str) -> std::result::Result<Value, RowError> {
        if field.is_empty() && !column.nullable {
            return Err(RowError::NullValue {
                table: self.name.clone(),
                column: column.name.clone(),
            });
        }
        match column.kind {
            ColumnKind::Integer if field.is_empty() => Ok(Value::Null),
            ColumnKind::Integer => field.trim().parse::<i32>().map(Value::Integer).map_err(|_| {
                RowError::InvalidInteger {
                    table: self.name.clone(),
                    column: column.name.clone(),
                    value: field.to_string(),
                }
            }),
            ColumnKind::String | ColumnKind::Localizable | ColumnKind::Stream => {
                Ok(Value::Text(field.to_string()))
            }
        }
    }
}

/// Decode archive bytes. UTF-8 is accepted as is, anything else must match the declared code page.
fn decode(path: &Path, bytes: &[u8]) -> Result<String> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }
    let codepage = declared_codepage(bytes).ok_or_else(|| IdtError::UndeclaredEncoding {
        path: path.to_path_buf(),
    })?;
    let encoding = codepage_encoding(codepage).ok_or_else(|| IdtError::UnsupportedCodepage {
        path: path.to_path_buf(),
        codepage,
    })?;
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| IdtError::InvalidEncoding {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        })
}

/// Code page from the table line, which is ASCII in every supported encoding.
fn declared_codepage(bytes: &[u8]) -> Option<u32> {
    let line = bytes.split(|&b| b == b'\n').nth(2)?;
    let line = std::str::from_utf8(line).ok()?;
    let (codepage, _) = line.split_once('\t')?;
    codepage.parse().ok()
}

fn codepage_encoding(codepage: u32) -> Option<&'static Encoding> {
    match codepage {
        65001 => Some(encoding_rs::UTF_8),
        874 => Some(encoding_rs::WINDOWS_874),
        932 => Some(encoding_rs::SHIFT_JIS),
        936 => Some(encoding_rs::GBK),
        949 => Some(encoding_rs::EUC_KR),
        950 => Some(encoding_rs::BIG5),
        1250..=1258 => Encoding::for_label(format!("windows-{codepage}").as_bytes()),
        _ => None,
    }
}

/// Split a header line into its fields, tolerating a trailing CR.
fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.strip_suffix('\r').unwrap_or(line).split('\t')
}

/// Column header fields; blank lines (e.g. in `_ForceCodepage` archives) declare no columns.
fn header_fields(line: &str) -> Vec<&str> {
    if line.trim().is_empty() {
        Vec::new()
    } else {
        split_fields(line).collect()
    }
}

fn unescape(field: &str) -> String {
    field
        .chars()
        .map(|c| match c {
            '\u{11}' => '\r',
            '\u{19}' => '\n',
            '\u{15}' => '\t',
            other => other,
        })
        .collect()
}

/// Set of exported tables, keyed by table name.
#[derive(Debug, Clone, Default)]
pub struct IdtDatabase {
    tables: HashMap<String, IdtTable>,
}

impl IdtDatabase {
    /// Create a database from already parsed tables.
    #[must_use]
    pub fn from_tables(tables: impl IntoIterator<Item = IdtTable>) -> Self {
        Self {
            tables: tables
                .into_iter()
                .map(|table| (table.name.clone(), table))
                .collect(),
        }
    }

    /// Load every `*.idt` archive found directly inside `dir`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be walked or an archive cannot be parsed.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut tables = Vec::new();
        for entry in WalkDir::new(dir).max_depth(1) {
            let entry = entry.map_err(|e| IdtError::WalkDirFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let is_archive = entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(IDT_EXTENSION));
            if is_archive {
                let table = IdtTable::from_path(entry.path())?;
                debug!(table = table.name(), rows = table.len(), "Loaded table archive");
                tables.push(table);
            }
        }
        Ok(Self::from_tables(tables))
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&IdtTable> {
        self.tables.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl RowFetcher for IdtDatabase {
    fn fetch(
        &self,
        table: &str,
        columns: &[&str],
    ) -> std::result::Result<Option<Vec<Row>>, FetchError> {
        self.tables
            .get(table)
            .map(|idt| idt.project(columns))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const COMPONENT_IDT: &str = "Component\tComponentId\tDirectory_\tAttributes\tCondition\tKeyPath\r\n\
        s72\tS38\ts72\ti2\tS255\tS72\r\n\
        Component\tComponent\r\n\
        MainExe\t{11111111-2222-3333-4444-555555555555}\tINSTALLDIR\t256\t\tapp.exe\r\n\
        Helper\t\tINSTALLDIR\t0\tVersionNT64\thelper.dll\r\n";

    #[test]
    fn test_parse_header() {
        let table = IdtTable::parse(COMPONENT_IDT).unwrap();
        assert_eq!(table.name(), "Component");
        assert_eq!(table.codepage(), None);
        assert_eq!(table.columns().len(), 6);
        assert_eq!(table.len(), 2);

        let id = &table.columns()[1];
        assert_eq!(id.name(), "ComponentId");
        assert_eq!(id.kind(), ColumnKind::String);
        assert!(id.nullable());

        let attributes = &table.columns()[3];
        assert_eq!(attributes.kind(), ColumnKind::Integer);
        assert!(!attributes.nullable());
    }

    #[test]
    fn test_parse_codepage_line() {
        let text = "Property\tValue\ns72\tl0\n1252\tProperty\tProperty\nProductName\tDemo\n";
        let table = IdtTable::parse(text).unwrap();
        assert_eq!(table.name(), "Property");
        assert_eq!(table.codepage(), Some(1252));
        assert_eq!(table.columns()[1].kind(), ColumnKind::Localizable);
    }

    #[test]
    fn test_parse_force_codepage() {
        let table = IdtTable::parse("\r\n\r\n65001\t_ForceCodepage\r\n").unwrap();
        assert_eq!(table.name(), "_ForceCodepage");
        assert_eq!(table.codepage(), Some(65001));
        assert!(table.columns().is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_unescape_control_characters() {
        let text = "Property\tValue\ns72\tl0\nProperty\tProperty\nText\tline1\u{11}\u{19}line2\u{15}tab\n";
        let db = IdtDatabase::from_tables([IdtTable::parse(text).unwrap()]);
        let rows = db.fetch("Property", &["Value"]).unwrap().unwrap();
        assert_eq!(rows[0].text(0).unwrap(), "line1\r\nline2\ttab");
    }

    #[test]
    fn test_missing_header() {
        let err = IdtTable::parse("Component\tComponentId\n").unwrap_err();
        assert!(matches!(
            err,
            IdtError::MissingHeader {
                line: "column definition"
            }
        ));
    }

    #[test]
    fn test_invalid_column_definition() {
        let text = "A\tB\ns72\tx4\nT\tA\n";
        let err = IdtTable::parse(text).unwrap_err();
        match err {
            IdtError::InvalidColumnType {
                table,
                column,
                definition,
            } => {
                assert_eq!(table, "T");
                assert_eq!(column, "B");
                assert_eq!(definition, "x4");
            }
            other => panic!("Expected InvalidColumnType, got {other:?}"),
        }
    }

    #[test]
    fn test_field_count_mismatch() {
        let text = "A\tB\ns72\ti2\nT\tA\nkey\t1\nonly-one-field\n";
        let err = IdtTable::parse(text).unwrap_err();
        assert!(matches!(
            err,
            IdtError::FieldCount {
                line: 5,
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_fetch_projection_order() {
        let db = IdtDatabase::from_tables([IdtTable::parse(COMPONENT_IDT).unwrap()]);
        let rows = db
            .fetch("Component", &["Attributes", "Component", "Directory_"])
            .unwrap()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].integer(0).unwrap(), 256);
        assert_eq!(rows[0].text(1).unwrap(), "MainExe");
        assert_eq!(rows[0].text(2).unwrap(), "INSTALLDIR");
        assert_eq!(rows[1].integer(0).unwrap(), 0);
    }

    #[test]
    fn test_fetch_absent_table() {
        let db = IdtDatabase::from_tables([IdtTable::parse(COMPONENT_IDT).unwrap()]);
        assert!(db.fetch("Registry", &["Registry"]).unwrap().is_none());
    }

    #[test]
    fn test_fetch_unknown_column() {
        let db = IdtDatabase::from_tables([IdtTable::parse(COMPONENT_IDT).unwrap()]);
        let err = db.fetch("Component", &["Missing"]).unwrap_err();
        assert!(matches!(err, FetchError::UnknownColumn { .. }));
    }

    #[test]
    fn test_empty_integer_is_null() {
        let text = "Feature\tDisplay\ns38\tI2\nFeature\tFeature\nMain\t\n";
        let db = IdtDatabase::from_tables([IdtTable::parse(text).unwrap()]);
        let rows = db.fetch("Feature", &["Display"]).unwrap().unwrap();
        assert_eq!(rows[0].optional_integer(0).unwrap(), None);
    }

    #[test]
    fn test_invalid_integer() {
        let text = "Feature\tLevel\ns38\ti2\nFeature\tFeature\nMain\tabc\n";
        let db = IdtDatabase::from_tables([IdtTable::parse(text).unwrap()]);
        let err = db.fetch("Feature", &["Level"]).unwrap_err();
        assert!(matches!(
            err,
            FetchError::Row(RowError::InvalidInteger { .. })
        ));
    }

    #[test]
    fn test_load_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Component.idt"), COMPONENT_IDT).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a table").unwrap();
        let db = IdtDatabase::load_dir(dir.path()).unwrap();
        assert_eq!(db.len(), 1);
        assert_eq!(db.table("Component").unwrap().len(), 2);
    }

    #[test]
    fn test_empty_mandatory_string() {
        let text = "Directory\tDefaultDir\ns72\tl255\nDirectory\tDirectory\nTARGETDIR\t\n";
        let db = IdtDatabase::from_tables([IdtTable::parse(text).unwrap()]);
        let err = db.fetch("Directory", &["DefaultDir"]).unwrap_err();
        match err {
            FetchError::Row(RowError::NullValue { table, column }) => {
                assert_eq!(table, "Directory");
                assert_eq!(column, "DefaultDir");
            }
            other => panic!("Expected NullValue, got {other:?}"),
        }
        // Columns that are not projected are not checked.
        assert!(db.fetch("Directory", &["Directory"]).is_ok());
    }

    const PROPERTY_1252: &[u8] =
        b"Property\tValue\r\ns72\tl0\r\n1252\tProperty\tProperty\r\nManufacturer\tCaf\xE9 GmbH\r\n";

    #[test]
    fn test_from_path_declared_codepage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Property.idt");
        fs::write(&path, PROPERTY_1252).unwrap();

        let db = IdtDatabase::from_tables([IdtTable::from_path(&path).unwrap()]);
        let rows = db.fetch("Property", &["Value"]).unwrap().unwrap();
        assert_eq!(rows[0].text(0).unwrap(), "Caf\u{e9} GmbH");
    }

    #[test]
    fn test_from_path_utf8_with_codepage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Property.idt");
        fs::write(
            &path,
            "Property\tValue\ns72\tl0\n1252\tProperty\tProperty\nManufacturer\tCaf\u{e9} GmbH\n",
        )
        .unwrap();

        let table = IdtTable::from_path(&path).unwrap();
        let db = IdtDatabase::from_tables([table]);
        let rows = db.fetch("Property", &["Value"]).unwrap().unwrap();
        assert_eq!(rows[0].text(0).unwrap(), "Caf\u{e9} GmbH");
    }

    #[test]
    fn test_from_path_unsupported_codepage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Property.idt");
        fs::write(
            &path,
            b"Property\tValue\ns72\tl0\n437\tProperty\tProperty\nName\t\x82\n",
        )
        .unwrap();

        assert!(matches!(
            IdtTable::from_path(&path),
            Err(IdtError::UnsupportedCodepage { codepage: 437, .. })
        ));
    }

    #[test]
    fn test_from_path_undeclared_encoding() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Property.idt");
        fs::write(
            &path,
            b"Property\tValue\ns72\tl0\nProperty\tProperty\nName\tCaf\xE9\n",
        )
        .unwrap();

        assert!(matches!(
            IdtTable::from_path(&path),
            Err(IdtError::UndeclaredEncoding { .. })
        ));
    }

    #[test]
    fn test_declared_codepage() {
        assert_eq!(declared_codepage(PROPERTY_1252), Some(1252));
        assert_eq!(declared_codepage(COMPONENT_IDT.as_bytes()), None);
        assert_eq!(declared_codepage(b"\r\n\r\n65001\t_ForceCodepage\r\n"), Some(65001));
    }
}
