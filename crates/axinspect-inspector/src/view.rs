//! Displayed list and position helpers.

use axinspect_core::NodeSnapshot;

use crate::error::PositionError;

/// The list as currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    /// `"Objects in <app> window"`.
    pub title: String,
    /// Count label, e.g. `"12 items [filter active]"` or
    /// `"3 children of button, OK"`.
    pub label: String,
    pub entries: Vec<NodeSnapshot>,
    /// Whether the filter controls accept input.
    pub filters_enabled: bool,
}

impl ListView {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&NodeSnapshot> {
        self.entries.get(position)
    }

    /// Position announcement for a selected entry.
    pub fn position_message(&self, selection: Option<usize>) -> String {
        position_message(selection, self.entries.len())
    }

    /// Entry for a 1-based position typed by the user.
    pub fn jump_to(&self, input: &str) -> Result<&NodeSnapshot, PositionError> {
        let position = parse_position(input, self.entries.len())?;
        self.entries.get(position).ok_or(PositionError::Empty)
    }
}

/// `"Result X of Y"`, or `"No results."` for an empty list.
///
/// `selection` is zero-based; no selection reads as position 0.
pub fn position_message(selection: Option<usize>, total: usize) -> String {
    if total == 0 {
        return "No results.".to_string();
    }
    let position = selection.map_or(0, |index| index + 1);
    format!("Result {position} of {total}")
}

/// Parse a 1-based position in `1..=total` into a zero-based index.
pub fn parse_position(input: &str, total: usize) -> Result<usize, PositionError> {
    if total == 0 {
        return Err(PositionError::Empty);
    }
    let invalid = || PositionError::Invalid {
        input: input.to_string(),
        total,
    };
    let position: usize = input.trim().parse().map_err(|_| invalid())?;
    if !(1..=total).contains(&position) {
        return Err(invalid());
    }
    Ok(position - 1)
}
