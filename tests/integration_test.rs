// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use std::collections::HashMap;
use std::path::PathBuf;

use msi_inspector::package::{Package, PackageError};
use msi_inspector::report::{FileKind, InstalledPaths, PathSource, Report};

const INSTALL_DIR: &str = "SourceDir\\Example Corp\\Example Agent";

fn get_fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_sample() -> Package {
    Package::new(get_fixtures_dir().join("sample")).expect("Should load sample tables")
}

#[test]
fn test_sample_tables() {
    let package = load_sample();
    let tables = package.tables();

    let properties = tables.properties();
    assert_eq!(properties.product_name, "Example Agent");
    assert_eq!(properties.product_version, "2.3.0");
    assert_eq!(properties.manufacturer, "Example Corp");
    assert_eq!(
        properties.upgrade_code.as_deref(),
        Some("{7D3A1B22-5C44-4E1F-8A0B-9E8F7C6D5B4A}")
    );

    assert_eq!(tables.features().len(), 2);
    assert_eq!(tables.components().len(), 4);
    assert_eq!(tables.files().len(), 5);
    assert_eq!(tables.directories().len(), 6);
    assert_eq!(tables.custom_actions().len(), 4);
    assert_eq!(tables.registry().len(), 2);
    assert_eq!(
        tables.registry()[0].to_string(),
        "LocalMachine\\SOFTWARE\\Example\\Agent\\InstallDir=[INSTALLDIR]"
    );
}

#[test]
fn test_sample_report() {
    let package = load_sample();
    let installed = InstalledPaths::empty();
    let report = Report::new(&package, &installed).expect("Should generate report");

    let files: Vec<(String, FileKind)> = report
        .files()
        .iter()
        .map(|file| (file.path.clone(), file.kind))
        .collect();
    let expected = [
        ("bin\\agent.exe", FileKind::Executable),
        ("bin\\ctl.exe", FileKind::Executable),
        ("bin\\core.dll", FileKind::Library),
        ("plugins\\_socket.pyd", FileKind::Library),
        ("README.TXT", FileKind::Other),
    ]
    .map(|(name, kind)| (format!("{INSTALL_DIR}\\{name}"), kind));
    assert_eq!(files, expected);
    assert!(report
        .files()
        .iter()
        .all(|file| file.source == PathSource::Package));

    let actions: Vec<(&str, Option<&str>)> = report
        .custom_actions()
        .iter()
        .map(|action| (action.action.as_str(), action.source_file.as_deref()))
        .collect();
    assert_eq!(
        actions,
        [
            ("InstallService", None),
            ("RunCtl", Some("ctl.exe")),
            ("CleanupScript", None),
        ]
    );
}

#[test]
fn test_sample_report_json() {
    let package = load_sample();
    let installed = InstalledPaths::empty();
    let report = Report::new(&package, &installed).expect("Should generate report");

    let json_str = serde_json::to_string(&report).expect("Should serialize report to JSON");
    let json: serde_json::Value = serde_json::from_str(&json_str).expect("Should parse JSON");

    assert!(json["package"].is_string());
    assert_eq!(json["properties"]["product_name"], "Example Agent");
    assert_eq!(json["totals"]["files"]["total"], 5);
    assert_eq!(json["totals"]["files"]["executables"], 2);
    assert_eq!(json["totals"]["files"]["libraries"], 2);
    assert_eq!(json["totals"]["custom_actions"]["total"], 4);
    assert_eq!(json["totals"]["custom_actions"]["audited"], 3);
    assert_eq!(json["totals"]["registry"], 2);
    assert_eq!(
        json["custom_actions"][0]["flags"],
        serde_json::json!(["Exe", "Directory", "Deferred", "NoImpersonate"])
    );
    assert_eq!(json["custom_actions"][0]["kind"], "Exe");
    assert_eq!(json["custom_actions"][2]["kind"], "JScript");
    assert_eq!(json["registry"][1]["root"], "Dynamic");
}

#[test]
fn test_sample_report_installed() {
    let package = load_sample();
    let installed = InstalledPaths::from_map(HashMap::from([(
        "{a1b2c3d4-0001-4000-8000-000000000001}".to_string(),
        "C:\\Program Files\\Example Corp\\Example Agent\\bin\\agent.exe".to_string(),
    )]));
    let report = Report::new(&package, &installed).expect("Should generate report");

    let installed_files: Vec<&str> = report
        .files()
        .iter()
        .filter(|file| file.source == PathSource::Installed)
        .map(|file| file.file.as_str())
        .collect();
    // Every file of an installed component is reported at the component key path.
    assert_eq!(installed_files, ["agent.exe", "ctl.exe"]);
    assert_eq!(
        report.files()[0].path,
        "C:\\Program Files\\Example Corp\\Example Agent\\bin\\agent.exe"
    );
}

#[test]
fn test_msi_package() {
    let package_path = get_fixtures_dir().join("sample.msi");
    if !package_path.exists() {
        eprintln!("Skipping test: {} not found", package_path.display());
        return;
    }
    let package = match Package::new(package_path) {
        Err(PackageError::CommandNotFound { command, .. }) => {
            eprintln!("Skipping test: {command} not installed");
            return;
        }
        result => result.expect("Should open package"),
    };
    let installed = InstalledPaths::empty();
    let report = Report::new(&package, &installed).expect("Should generate report");
    assert!(!report.properties().product_code.is_empty());
}
