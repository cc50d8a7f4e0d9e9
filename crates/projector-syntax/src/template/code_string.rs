//! Parseable text with a table locating each embedded parameter.
//!
//! A [`CodeString`] is what the builder hands to Tree-sitter. Every
//! parameter is written as a marker that parses as ordinary code, and the
//! table records the byte range of each marker so the builder can recognise
//! the resulting syntax node.

use std::ops::Range;

use crate::error::ProjectorError;
use crate::template::parameter::Parameter;

/// A parameter marker's location inside a code string.
#[derive(Debug, Clone)]
pub struct ParameterEntry {
    range: Range<usize>,
    parameter: Parameter,
}

impl ParameterEntry {
    /// Returns the marker's byte range.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Returns the parameter the marker stands for.
    #[must_use]
    pub const fn parameter(&self) -> &Parameter {
        &self.parameter
    }
}

/// Code text plus the ordered, non-overlapping table of parameter markers
/// inside it.
#[derive(Debug, Clone, Default)]
pub struct CodeString {
    raw: String,
    entries: Vec<ParameterEntry>,
}

impl CodeString {
    /// Creates a code string holding plain text only.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            raw: text.into(),
            entries: Vec::new(),
        }
    }

    /// Returns the code text.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the parameter table in ascending offset order.
    #[must_use]
    pub fn entries(&self) -> &[ParameterEntry] {
        &self.entries
    }

    /// Appends literal text.
    pub fn push_text(&mut self, text: &str) {
        self.raw.push_str(text);
    }

    /// Appends a parameter's marker and records its range.
    pub fn push_marker(&mut self, marker: &str, parameter: Parameter) {
        let start = self.raw.len();
        self.raw.push_str(marker);
        self.entries.push(ParameterEntry {
            range: start..self.raw.len(),
            parameter,
        });
    }

    /// Returns the parameter whose marker spans exactly `range`.
    #[must_use]
    pub fn parameter_at(&self, range: Range<usize>) -> Option<&Parameter> {
        self.entries
            .binary_search_by(|entry| entry.range.start.cmp(&range.start))
            .ok()
            .and_then(|index| self.entries.get(index))
            .filter(|entry| entry.range.end == range.end)
            .map(|entry| &entry.parameter)
    }

    /// Returns a copy in which the single occurrence of `placeholder` is
    /// replaced by `replacement`.
    ///
    /// Table entries after the placeholder are shifted, the replacement's own
    /// entries are re-based into place, and any entry overlapping the
    /// replaced text is dropped because its marker no longer exists.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectorError::PlaceholderNotFound`] or
    /// [`ProjectorError::PlaceholderAmbiguous`] unless `placeholder` occurs
    /// exactly once.
    pub fn replace(&self, placeholder: &str, replacement: &Self) -> Result<Self, ProjectorError> {
        let at = self.unique_offset(placeholder)?;
        let end = at + placeholder.len();

        let mut raw = String::with_capacity(self.raw.len() + replacement.raw.len());
        raw.push_str(self.raw.get(..at).unwrap_or_default());
        raw.push_str(&replacement.raw);
        raw.push_str(self.raw.get(end..).unwrap_or_default());

        let grown = replacement.raw.len();
        let mut entries = Vec::with_capacity(self.entries.len() + replacement.entries.len());
        entries.extend(
            self.entries
                .iter()
                .filter(|entry| entry.range.end <= at)
                .cloned(),
        );
        entries.extend(replacement.entries.iter().map(|entry| ParameterEntry {
            range: (entry.range.start + at)..(entry.range.end + at),
            parameter: entry.parameter.clone(),
        }));
        entries.extend(
            self.entries
                .iter()
                .filter(|entry| entry.range.start >= end)
                .map(|entry| ParameterEntry {
                    range: (entry.range.start - placeholder.len() + grown)
                        ..(entry.range.end - placeholder.len() + grown),
                    parameter: entry.parameter.clone(),
                }),
        );
        Ok(Self { raw, entries })
    }

    /// Returns `target` with its single `placeholder` replaced by this code
    /// string.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::replace`] when `placeholder` does not occur in
    /// `target` exactly once.
    pub fn insert_into(&self, target: &str, placeholder: &str) -> Result<Self, ProjectorError> {
        Self::plain(target).replace(placeholder, self)
    }

    fn unique_offset(&self, placeholder: &str) -> Result<usize, ProjectorError> {
        let mut found = self.raw.match_indices(placeholder).map(|(offset, _)| offset);
        let first = found.next().ok_or_else(|| ProjectorError::PlaceholderNotFound {
            placeholder: placeholder.to_owned(),
        })?;
        let extra = found.count();
        if extra > 0 {
            return Err(ProjectorError::PlaceholderAmbiguous {
                placeholder: placeholder.to_owned(),
                count: extra + 1,
            });
        }
        Ok(first)
    }
}
