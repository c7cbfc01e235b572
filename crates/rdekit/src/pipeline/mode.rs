use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::RdeError;

/// The five processing modes. Each maps to one fixed processor sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessingMode {
    RdeFormat,
    MultiDataTile,
    ExcelInvoice,
    Invoice,
    SmartTableInvoice,
}

impl ProcessingMode {
    pub const ALL: [ProcessingMode; 5] = [
        ProcessingMode::RdeFormat,
        ProcessingMode::MultiDataTile,
        ProcessingMode::ExcelInvoice,
        ProcessingMode::Invoice,
        ProcessingMode::SmartTableInvoice,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessingMode::RdeFormat => "rdeformat",
            ProcessingMode::MultiDataTile => "MultiDataTile",
            ProcessingMode::ExcelInvoice => "Excelinvoice",
            ProcessingMode::Invoice => "invoice",
            ProcessingMode::SmartTableInvoice => "SmartTableInvoice",
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingMode {
    type Err = RdeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RdeError::UnknownMode(s.to_string()))
    }
}

/// Picks the mode for one unit of work.
///
/// Explicit SmartTable and Excel-invoice inputs win over the configured
/// extended mode; an unrecognised extended mode falls back to `invoice`.
pub fn resolve_mode(
    smarttable_file: Option<&Path>,
    excel_file: Option<&Path>,
    extended_mode: Option<&str>,
) -> ProcessingMode {
    if smarttable_file.is_some() {
        return ProcessingMode::SmartTableInvoice;
    }
    if excel_file.is_some() {
        return ProcessingMode::ExcelInvoice;
    }
    match extended_mode.map(|m| m.trim().to_ascii_lowercase()).as_deref() {
        Some("rdeformat") => ProcessingMode::RdeFormat,
        Some("multidatatile") => ProcessingMode::MultiDataTile,
        _ => ProcessingMode::Invoice,
    }
}
