// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Formats and prints report summaries to the console.

use comfy_table::{Cell, Table};

use super::cross_reference::{FileKind, ResolvedFile};
use super::utils::{find_common_directory, strip_directory};
use super::Report;

/// Summarize the report to the console.
///
/// Prints the product properties, features, file and custom action statistics, the audited
/// custom actions, the packaged binaries and the registry entries.
pub fn summarize_report(report: &Report<'_>) {
    println!("Package: {}", report.package);
    println!("{}\n", properties_table(report));

    if !report.features.is_empty() {
        println!("{}\n", features_table(report));
    }

    println!("{}\n", files_table(report));
    println!("{}\n", custom_actions_table(report));
    println!("{}\n", contents_table(report));

    if !report.custom_actions.is_empty() {
        println!("{}\n", audited_actions_table(report));
    }

    let binaries = binaries(report);
    if !binaries.is_empty() {
        println!("{}\n", binaries_table(&binaries));
    }

    if report.registry.is_empty() {
        println!("Registry: <none> (might still be created through custom actions)");
    } else {
        println!("{}", registry_table(report));
    }
}

/// Create a table with the default preset styling.
fn default_table_preset() -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL_CONDENSED)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    table
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|name| Cell::new(name).add_attribute(comfy_table::Attribute::Bold))
        .collect()
}

fn properties_table(report: &Report) -> Table {
    let properties = report.properties;
    let mut table = default_table_preset();
    table
        .set_header(header(&["Property", "Value"]))
        .add_row(vec!["ProductName", properties.product_name.as_str()])
        .add_row(vec!["ProductVersion", properties.product_version.as_str()])
        .add_row(vec!["Manufacturer", properties.manufacturer.as_str()])
        .add_row(vec!["ProductCode", properties.product_code.as_str()]);
    if let Some(upgrade_code) = &properties.upgrade_code {
        table.add_row(vec!["UpgradeCode", upgrade_code.as_str()]);
    }
    table
}

fn features_table(report: &Report) -> Table {
    let mut table = default_table_preset();
    table.set_header(header(&["Feature", "Title", "Description"]));
    for feature in report.features {
        table.add_row(vec![
            feature.feature.as_str(),
            feature.title.as_str(),
            feature.description.as_str(),
        ]);
    }
    table
}

/// Create a table showing file kind statistics.
fn files_table(report: &Report) -> Table {
    let totals = &report.totals.files;
    let mut table = default_table_preset();
    table
        .set_header(header(&["File Kind", "Count"]))
        .add_row(vec![Cell::new("Executables"), Cell::new(totals.executables)])
        .add_row(vec![Cell::new("Libraries"), Cell::new(totals.libraries)])
        .add_row(vec![Cell::new("Other"), Cell::new(totals.other)])
        .add_row(vec![Cell::new("Installed"), Cell::new(totals.installed)])
        .add_row(vec![
            Cell::new("Total").add_attribute(comfy_table::Attribute::Bold),
            Cell::new(totals.total).add_attribute(comfy_table::Attribute::Bold),
        ]);
    table
}

/// Create a table showing custom action statistics.
fn custom_actions_table(report: &Report) -> Table {
    let totals = &report.totals.custom_actions;
    let mut table = default_table_preset();
    table
        .set_header(header(&["Custom Actions", "Count"]))
        .add_row(vec![Cell::new("Deferred"), Cell::new(totals.deferred)])
        .add_row(vec![Cell::new("Elevated"), Cell::new(totals.elevated)])
        .add_row(vec![Cell::new("Audited"), Cell::new(totals.audited)])
        .add_row(vec![
            Cell::new("Total").add_attribute(comfy_table::Attribute::Bold),
            Cell::new(totals.total).add_attribute(comfy_table::Attribute::Bold),
        ]);
    table
}

/// Create a table counting the remaining package contents.
fn contents_table(report: &Report) -> Table {
    let mut table = default_table_preset();
    table
        .set_header(header(&["Contents", "Count"]))
        .add_row(vec![Cell::new("Features"), Cell::new(report.totals.features)])
        .add_row(vec![
            Cell::new("Registry entries"),
            Cell::new(report.totals.registry),
        ]);
    table
}

fn audited_actions_table(report: &Report) -> Table {
    let mut table = default_table_preset();
    table.set_header(header(&["Action", "Kind", "Flags", "Source", "Target"]));
    for action in &report.custom_actions {
        let source = match &action.source_file {
            Some(file) => format!("{} ({file})", action.source),
            None => action.source.clone(),
        };
        table.add_row(vec![
            Cell::new(&action.action),
            Cell::new(format!("{:?}", action.kind)),
            Cell::new(action.flags),
            Cell::new(source),
            Cell::new(&action.target),
        ]);
    }
    table
}

/// Collect executables and libraries; the report already orders executables first.
fn binaries<'a>(report: &'a Report<'_>) -> Vec<&'a ResolvedFile> {
    report
        .files
        .iter()
        .filter(|file| matches!(file.kind, FileKind::Executable | FileKind::Library))
        .collect()
}

/// Create a table listing the binaries with their common directory stripped.
fn binaries_table(binaries: &[&ResolvedFile]) -> Table {
    let paths: Vec<&str> = binaries.iter().map(|file| file.path.as_str()).collect();
    let common_directory = find_common_directory(&paths);

    let mut table = default_table_preset();
    let title = match &common_directory {
        Some(directory) => format!("Binary (in {directory})"),
        None => "Binary".to_string(),
    };
    table.set_header(header(&["Kind", title.as_str(), "Component"]));
    for file in binaries {
        table.add_row(vec![
            Cell::new(format!("{:?}", file.kind)),
            Cell::new(strip_directory(&file.path, common_directory.as_deref())),
            Cell::new(&file.component),
        ]);
    }
    table
}

fn registry_table(report: &Report) -> Table {
    let mut table = default_table_preset();
    table.set_header(header(&["Registry", "Entry"]));
    for entry in report.registry {
        table.add_row(vec![Cell::new(&entry.registry), Cell::new(entry)]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Package;
    use crate::report::InstalledPaths;
    use std::path::Path;

    fn sample() -> Package {
        Package::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample")).unwrap()
    }

    #[test]
    fn test_custom_actions_table_counts_only_actions() {
        let package = sample();
        let installed = InstalledPaths::empty();
        let report = Report::new(&package, &installed).unwrap();

        let rendered = custom_actions_table(&report).to_string();
        assert!(rendered.contains("Deferred"));
        assert!(!rendered.contains("Features"));
        assert!(!rendered.contains("Registry entries"));

        let rendered = contents_table(&report).to_string();
        assert!(rendered.contains("Features"));
        assert!(rendered.contains("Registry entries"));
        assert!(!rendered.contains("Total"));
    }

    #[test]
    fn test_binaries_table_strips_common_directory() {
        let package = sample();
        let installed = InstalledPaths::empty();
        let report = Report::new(&package, &installed).unwrap();

        let binaries = binaries(&report);
        assert_eq!(binaries.len(), 4);
        let rendered = binaries_table(&binaries).to_string();
        assert!(rendered.contains("Example Agent"));
        assert!(rendered.contains("agent.exe"));
        assert!(!rendered.contains("README.TXT"));
    }
}

