use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::section::{Section, SettingsSection};

/// The whole settings document: one JSON object per section
///
/// Sections are kept as stored JSON rather than typed structs so a section
/// saved by an older build keeps exactly the fields it had. Typed access goes
/// through [`SettingsDocument::section`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsDocument(Map<String, Value>);

impl Default for SettingsDocument {
    fn default() -> Self {
        let sections = Section::ALL
            .into_iter()
            .map(|section| (section.as_str().to_string(), section.default_value()))
            .collect();
        Self(sections)
    }
}

impl SettingsDocument {
    /// Builds a document from an object as-is, without consulting defaults.
    pub fn from_map(sections: Map<String, Value>) -> Self {
        Self(sections)
    }

    /// Overlays the stored top-level sections on the default document.
    ///
    /// A section present in `stored` replaces the default section wholesale;
    /// its missing fields are not filled in.
    pub fn merged_over_defaults(stored: Map<String, Value>) -> Self {
        let mut document = Self::default();
        document.0.extend(stored);
        document
    }

    /// Raw stored value of a section, if present
    pub fn get(&self, section: Section) -> Option<&Value> {
        self.0.get(section.as_str())
    }

    /// Typed view of a section.
    ///
    /// Missing fields read as their defaults, and so does any stored field
    /// whose value does not fit its type. A missing or non-object section
    /// reads as the default section.
    pub fn section<S: SettingsSection>(&self) -> S {
        let stored = match self.get(S::SECTION) {
            Some(Value::Object(fields)) => fields,
            Some(other) => {
                log::warn!("settings section '{}' is not an object: {}", S::SECTION, other);
                return S::default();
            }
            None => return S::default(),
        };

        let mut fields = match serde_json::to_value(S::default()) {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        };
        for (key, value) in stored {
            let previous = fields.insert(key.clone(), value.clone());
            if let Err(e) = S::deserialize(&Value::Object(fields.clone())) {
                log::warn!(
                    "ignoring settings field '{}.{}' ({}), using default",
                    S::SECTION,
                    key,
                    e
                );
                match previous {
                    Some(previous) => fields.insert(key.clone(), previous),
                    None => fields.remove(key),
                };
            }
        }

        S::deserialize(Value::Object(fields)).unwrap_or_default()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Shallow-merges `partial` into a section, creating it if needed.
    pub(crate) fn merge_section(&mut self, section: Section, partial: Map<String, Value>) {
        let slot = self
            .0
            .entry(section.as_str())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        if let Value::Object(fields) = slot {
            fields.extend(partial);
        }
    }

    pub(crate) fn replace_section(&mut self, section: Section, value: Value) {
        self.0.insert(section.as_str().to_string(), value);
    }

    /// Compact JSON, as written to storage
    pub fn to_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    /// Two-space indented JSON, as exported to the user
    pub fn to_pretty_json(&self) -> String {
        format!("{:#}", Value::Object(self.0.clone()))
    }
}
