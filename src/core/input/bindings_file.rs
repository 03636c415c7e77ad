//=========================================================================
// Bindings File
//=========================================================================
//
// Line-oriented text format for persisted key bindings.
//
// Format:
// ```text
//   # comment
//   <code> <phase> <modifierMask> <callbackId>
//
//   87 hold -1 move_forward
//   256 press 1 stop
// ```
// - `code`: raw device code (keys ≥ 32, mouse buttons 0..=7)
// - `phase`: press | release | hold
// - `modifierMask`: bitmask, `-1` or `0` for "no modifier required"
// - `callbackId`: named callback id, rest of the line
//
// Only bindings that reference a named callback can be written.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

//=== Internal Dependencies ===============================================

use super::binding::{KeyBinding, Trigger};
use super::error::BindingsError;
use super::event::{InputCode, Modifiers};

//=== BindingRecord =======================================================

/// One parsed line of the bindings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BindingRecord {
    pub code: InputCode,
    pub trigger: Trigger,
    pub modifiers: Modifiers,
    pub name: String,
}

impl BindingRecord {
    /// Record for a named binding, `None` for closure-only bindings.
    pub fn from_binding(binding: &KeyBinding) -> Option<Self> {
        binding.name().map(|name| Self {
            code: binding.code(),
            trigger: binding.trigger(),
            modifiers: binding.modifiers(),
            name: name.to_string(),
        })
    }

    fn to_line(&self) -> String {
        let mask = if self.modifiers.is_none() { -1 } else { self.modifiers.mask() };
        format!("{} {} {} {}", self.code.raw(), self.trigger.token(), mask, self.name)
    }
}

//=== Parsing =============================================================

/// Parses one line (1-based `line_no`). Blank and comment lines yield
/// `Ok(None)`.
pub(crate) fn parse_line(line: &str, line_no: usize) -> Result<Option<BindingRecord>, BindingsError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let parse_err = |reason: String| BindingsError::Parse { line: line_no, reason };

    let (code, rest) = split_field(line);
    let (phase, rest) = split_field(rest);
    let (mask, rest) = split_field(rest);
    if mask.is_empty() {
        return Err(parse_err("expected '<code> <phase> <modifiers> <callback>'".into()));
    }
    let name = rest.trim();
    if name.is_empty() {
        return Err(parse_err("missing callback id".into()));
    }

    let raw: i32 = code
        .parse()
        .map_err(|_| parse_err(format!("invalid code '{}'", code)))?;
    let code = InputCode::from_raw(raw).ok_or_else(|| parse_err(format!("unknown code {}", raw)))?;
    let trigger: Trigger = phase.parse().map_err(parse_err)?;
    let mask: i32 = mask
        .parse()
        .map_err(|_| parse_err(format!("invalid modifier mask '{}'", mask)))?;

    Ok(Some(BindingRecord {
        code,
        trigger,
        modifiers: Modifiers::from_mask(mask),
        name: name.to_string(),
    }))
}

fn split_field(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(end) => s.split_at(end),
        None => (s, ""),
    }
}

/// Parses a whole file, collecting good records and per-line errors.
pub(crate) fn parse(text: &str) -> (Vec<BindingRecord>, Vec<BindingsError>) {
    let mut records = Vec::new();
    let mut errors = Vec::new();

    for (index, line) in text.lines().enumerate() {
        match parse_line(line, index + 1) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }

    (records, errors)
}

//=== Writing =============================================================

pub(crate) fn render<'a>(records: impl IntoIterator<Item = &'a BindingRecord>) -> String {
    let mut out = String::from("# code phase modifiers callback\n");
    for record in records {
        out.push_str(&record.to_line());
        out.push('\n');
    }
    out
}

/// Writes `text` to `path` through a sibling temp file and a rename,
/// creating parent directories as needed.
pub(crate) fn write_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, text)?;

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("bindings");
    path.with_file_name(format!("{}.tmp", file_name))
}

//=========================================================================
// Unit Tests
//=========================================================================
