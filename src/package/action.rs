// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Decodes the CustomAction `Type` bitmask into named capabilities.
//!
//! Bit values follow `msidbCustomActionType` from `msidefs.h`. Common combinations:
//!
//! | Type | Bits | Typical use |
//! |------|------|-------------|
//! | 65   | `Continue + Dll` | UI helper actions (path validation, EULA printing) |
//! | 3106 | `NoImpersonate + Deferred + Directory + Exe` | elevated executable run from an install directory |
//! | 3170 | as 3106 `+ Continue` | same, failure ignored |
//! | 7189 | `Script64Bit + NoImpersonate + Deferred + SourceFile + JScript` | elevated 64-bit JScript |

use serde::{Serialize, Serializer};
use std::fmt;

const DLL: u32 = 0x0001;
const EXE: u32 = 0x0002;
const SCRIPT: u32 = 0x0004;
const SOURCE_FILE: u32 = 0x0010;
const DIRECTORY: u32 = 0x0020;
const CONTINUE: u32 = 0x0040;
const ASYNC: u32 = 0x0080;
const ROLLBACK: u32 = 0x0100;
const COMMIT: u32 = 0x0200;
const DEFERRED: u32 = 0x0400;
const NO_IMPERSONATE: u32 = 0x0800;
const SCRIPT_64BIT: u32 = 0x1000;
const HIDE_TARGET: u32 = 0x2000;
const TS_AWARE: u32 = 0x4000;
const PATCH_UNINSTALL: u32 = 0x8000;

/// Mask selecting the action body type (Dll, Exe, Script combinations).
const KIND_MASK: u32 = DLL | EXE | SCRIPT;

/// Flag names in bit order, used for display and serialization.
const FLAG_NAMES: [(u32, &str); 15] = [
    (DLL, "Dll"),
    (EXE, "Exe"),
    (SCRIPT, "Script"),
    (SOURCE_FILE, "SourceFile"),
    (DIRECTORY, "Directory"),
    (CONTINUE, "Continue"),
    (ASYNC, "Async"),
    (ROLLBACK, "Rollback"),
    (COMMIT, "Commit"),
    (DEFERRED, "Deferred"),
    (NO_IMPERSONATE, "NoImpersonate"),
    (SCRIPT_64BIT, "Script64Bit"),
    (HIDE_TARGET, "HideTarget"),
    (TS_AWARE, "TSAware"),
    (PATCH_UNINSTALL, "PatchUninstall"),
];

/// Body type of a custom action, derived from the low three type bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    Dll,
    Exe,
    TextData,
    JScript,
    VBScript,
    NestedInstall,
    Unknown,
}

/// Decoded CustomAction type bitmask.
///
/// Decoding never fails; reserved bits are kept in the raw value but have no accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionFlags(u32);

impl ActionFlags {
    /// Decode a raw `Type` column value.
    #[must_use]
    pub const fn decode(bits: u32) -> Self {
        Self(bits)
    }

    /// Decode the signed integer as stored in the CustomAction table.
    #[must_use]
    pub const fn from_column(value: i32) -> Self {
        Self(u32::from_ne_bytes(value.to_ne_bytes()))
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    const fn has(self, flag: u32) -> bool {
        self.0 & flag != 0
    }

    /// Runs a function exported from a DLL.
    #[must_use]
    pub const fn dll(self) -> bool {
        self.has(DLL)
    }

    /// Runs an executable.
    #[must_use]
    pub const fn exe(self) -> bool {
        self.has(EXE)
    }

    /// Runs a script body; combined with `dll`/`exe` it selects JScript or VBScript.
    #[must_use]
    pub const fn script(self) -> bool {
        self.has(SCRIPT)
    }

    /// The body comes from an installed file rather than the Binary table.
    #[must_use]
    pub const fn source_file(self) -> bool {
        self.has(SOURCE_FILE)
    }

    /// The target is interpreted relative to an install directory.
    #[must_use]
    pub const fn directory(self) -> bool {
        self.has(DIRECTORY)
    }

    /// Installation continues when the action fails.
    #[must_use]
    pub const fn continue_on_error(self) -> bool {
        self.has(CONTINUE)
    }

    #[must_use]
    pub const fn asynchronous(self) -> bool {
        self.has(ASYNC)
    }

    /// Rollback action, or "first sequence" for non-deferred actions.
    #[must_use]
    pub const fn rollback(self) -> bool {
        self.has(ROLLBACK)
    }

    /// Commit action, or "once per process" for non-deferred actions.
    #[must_use]
    pub const fn commit(self) -> bool {
        self.has(COMMIT)
    }

    /// Runs in the deferred (in-script) execution phase.
    #[must_use]
    pub const fn deferred(self) -> bool {
        self.has(DEFERRED)
    }

    /// Runs with elevated privileges, ignoring the calling user's impersonation context.
    #[must_use]
    pub const fn elevated(self) -> bool {
        self.has(NO_IMPERSONATE)
    }

    #[must_use]
    pub const fn script_64bit(self) -> bool {
        self.has(SCRIPT_64BIT)
    }

    /// The target is hidden from the install log.
    #[must_use]
    pub const fn hide_target(self) -> bool {
        self.has(HIDE_TARGET)
    }

    #[must_use]
    pub const fn terminal_server_aware(self) -> bool {
        self.has(TS_AWARE)
    }

    /// Runs only while uninstalling a patch.
    #[must_use]
    pub const fn patch_uninstall(self) -> bool {
        self.has(PATCH_UNINSTALL)
    }

    /// Whether the action can change protected system state outside the invoking user's context.
    ///
    /// See <https://learn.microsoft.com/en-us/windows/win32/msi/changing-the-system-state-using-a-custom-action>.
    #[must_use]
    pub const fn affects_system_state(self) -> bool {
        self.elevated() || self.deferred()
    }

    /// Classify the action body type.
    #[must_use]
    pub const fn kind(self) -> ActionKind {
        match self.0 & KIND_MASK {
            0x1 => ActionKind::Dll,
            0x2 => ActionKind::Exe,
            0x3 => ActionKind::TextData,
            0x5 => ActionKind::JScript,
            0x6 => ActionKind::VBScript,
            0x7 => ActionKind::NestedInstall,
            _ => ActionKind::Unknown,
        }
    }

    /// Names of all set flags in bit order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        FLAG_NAMES
            .into_iter()
            .filter(move |(flag, _)| self.has(*flag))
            .map(|(_, name)| name)
    }
}

impl fmt::Display for ActionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.names().collect::<Vec<_>>().join(","))
    }
}

// Serialized as the list of flag names; the raw value is not meaningful to report readers.
impl Serialize for ActionFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_predicates(flags: ActionFlags) -> [(&'static str, bool); 15] {
        [
            ("dll", flags.dll()),
            ("exe", flags.exe()),
            ("script", flags.script()),
            ("source_file", flags.source_file()),
            ("directory", flags.directory()),
            ("continue_on_error", flags.continue_on_error()),
            ("asynchronous", flags.asynchronous()),
            ("rollback", flags.rollback()),
            ("commit", flags.commit()),
            ("deferred", flags.deferred()),
            ("elevated", flags.elevated()),
            ("script_64bit", flags.script_64bit()),
            ("hide_target", flags.hide_target()),
            ("terminal_server_aware", flags.terminal_server_aware()),
            ("patch_uninstall", flags.patch_uninstall()),
        ]
    }

    fn set_predicates(flags: ActionFlags) -> Vec<&'static str> {
        all_predicates(flags)
            .into_iter()
            .filter(|(_, set)| *set)
            .map(|(name, _)| name)
            .collect()
    }

    #[test]
    fn test_decode_elevated_deferred_exe() {
        let flags = ActionFlags::decode(3106);
        assert_eq!(
            set_predicates(flags),
            vec!["exe", "directory", "deferred", "elevated"]
        );
        assert!(flags.affects_system_state());
        assert_eq!(flags.kind(), ActionKind::Exe);
    }

    #[test]
    fn test_decode_continue_dll() {
        let flags = ActionFlags::decode(65);
        assert_eq!(set_predicates(flags), vec!["dll", "continue_on_error"]);
        assert!(!flags.affects_system_state());
        assert_eq!(flags.kind(), ActionKind::Dll);
    }

    #[test]
    fn test_decode_64bit_jscript() {
        let flags = ActionFlags::decode(7189);
        assert_eq!(
            set_predicates(flags),
            vec![
                "dll",
                "script",
                "source_file",
                "deferred",
                "elevated",
                "script_64bit"
            ]
        );
        assert_eq!(flags.kind(), ActionKind::JScript);
    }

    #[test]
    fn test_affects_system_state_either_flag() {
        assert!(ActionFlags::decode(DEFERRED).affects_system_state());
        assert!(ActionFlags::decode(NO_IMPERSONATE).affects_system_state());
        assert!(!ActionFlags::decode(ASYNC | COMMIT | ROLLBACK).affects_system_state());
        assert!(!ActionFlags::decode(0).affects_system_state());
    }

    #[test]
    fn test_reserved_bits_ignored() {
        let flags = ActionFlags::decode(0x0008 | 0xFFFF_0000);
        assert!(set_predicates(flags).is_empty());
        assert!(!flags.affects_system_state());
        assert_eq!(flags.to_string(), "[]");
    }

    #[test]
    fn test_from_negative_column_value() {
        let flags = ActionFlags::from_column(-1);
        assert_eq!(flags.bits(), u32::MAX);
        assert_eq!(set_predicates(flags).len(), 15);
    }

    #[test]
    fn test_kind_combinations() {
        assert_eq!(ActionFlags::decode(0x03).kind(), ActionKind::TextData);
        assert_eq!(ActionFlags::decode(0x05).kind(), ActionKind::JScript);
        assert_eq!(ActionFlags::decode(0x06).kind(), ActionKind::VBScript);
        assert_eq!(ActionFlags::decode(0x07).kind(), ActionKind::NestedInstall);
        assert_eq!(ActionFlags::decode(0x04).kind(), ActionKind::Unknown);
        assert_eq!(ActionFlags::decode(0x30).kind(), ActionKind::Unknown);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ActionFlags::decode(3106).to_string(),
            "[Exe,Directory,Deferred,NoImpersonate]"
        );
        assert_eq!(ActionFlags::decode(65).to_string(), "[Dll,Continue]");
    }

    #[test]
    fn test_serialize_as_names() {
        let json = serde_json::to_string(&ActionFlags::decode(3170)).unwrap();
        assert_eq!(
            json,
            r#"["Exe","Directory","Continue","Deferred","NoImpersonate"]"#
        );
    }
}
