// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "msi_inspector")]
#[command(version)]
#[command(about = "Reports files, custom actions and registry entries of Windows Installer packages")]
pub(crate) struct Args {
    /// Path to the installer package (.msi) or a directory of exported .idt tables.
    pub package: PathBuf,

    /// Path to the file to write the report in JSON format.
    pub report: PathBuf,

    #[arg(
        long,
        long_help = "Path to a JSON file mapping component GUIDs to installed paths.\n\
                Files of listed components are reported at their installed location\n\
                instead of their location inside the package."
    )]
    pub installed_paths: Option<PathBuf>,

    /// Seconds to wait for the table export before giving up.
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}
