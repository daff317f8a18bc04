//! Channel key matching
//!
//! Analyzer firmware revisions disagree on how a channel's key is
//! rendered. For a channel configured as label `T`, unit `DegC` all of
//! these have been seen on the wire:
//!
//! ```text
//! T        T DegC     DegC T     TDegC     DegCT
//! ```
//!
//! A channel without a label (unit only) is keyed by its unit. Matching is
//! exact and case-sensitive; the first rendering in [`KeyForm::PRIORITY`]
//! that matches wins.

/// One accepted rendering of a (label, unit) key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyForm {
    /// `label`
    Label,
    /// `unit`, only for channels without a label
    Unit,
    /// `label unit`
    LabelSpaceUnit,
    /// `unit label`
    UnitSpaceLabel,
    /// `labelunit`
    LabelUnit,
    /// `unitlabel`
    UnitLabel,
}

impl KeyForm {
    /// Order in which renderings are tried
    pub const PRIORITY: [KeyForm; 6] = [
        KeyForm::Label,
        KeyForm::Unit,
        KeyForm::LabelSpaceUnit,
        KeyForm::UnitSpaceLabel,
        KeyForm::LabelUnit,
        KeyForm::UnitLabel,
    ];

    /// Check whether `raw` is this rendering of (label, unit)
    pub fn accepts(self, raw: &str, label: &str, unit: &str) -> bool {
        match self {
            KeyForm::Label => !label.is_empty() && raw == label,
            KeyForm::Unit => label.is_empty() && !unit.is_empty() && raw == unit,
            KeyForm::LabelSpaceUnit => joined(raw, label, " ", unit),
            KeyForm::UnitSpaceLabel => joined(raw, unit, " ", label),
            KeyForm::LabelUnit => joined(raw, label, "", unit),
            KeyForm::UnitLabel => joined(raw, unit, "", label),
        }
    }
}

/// `raw == first + sep + second`, both parts non-empty
fn joined(raw: &str, first: &str, sep: &str, second: &str) -> bool {
    if first.is_empty() || second.is_empty() {
        return false;
    }
    raw.strip_prefix(first)
        .and_then(|rest| rest.strip_prefix(sep))
        .is_some_and(|rest| rest == second)
}

/// Find the first rendering of (label, unit) that equals `raw`
pub fn match_key(raw: &str, label: &str, unit: &str) -> Option<KeyForm> {
    KeyForm::PRIORITY
        .into_iter()
        .find(|form| form.accepts(raw, label, unit))
}

/// Check whether `raw` is any accepted rendering of (label, unit)
pub fn matches(raw: &str, label: &str, unit: &str) -> bool {
    match_key(raw, label, unit).is_some()
}
