use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// Characters of the preview source shown in the record list
pub const PREVIEW_CHARS: usize = 50;

pub const NEW_RECORD_INSTRUCTION: &str = "New instruction";

/// The three text fields the editor knows how to edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Instruction,
    Input,
    Output,
}

impl FieldKey {
    pub const ALL: [FieldKey; 3] = [FieldKey::Instruction, FieldKey::Input, FieldKey::Output];

    /// JSON key used on disk.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Instruction => "instruction",
            FieldKey::Input => "input",
            FieldKey::Output => "output",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldKey::Instruction => "Instruction",
            FieldKey::Input => "Input",
            FieldKey::Output => "Output",
        }
    }

    fn from_key(key: &str) -> Option<FieldKey> {
        FieldKey::ALL.into_iter().find(|k| k.as_str() == key)
    }

    pub fn index(self) -> usize {
        match self {
            FieldKey::Instruction => 0,
            FieldKey::Input => 1,
            FieldKey::Output => 2,
        }
    }
}

/// One JSONL line. Keys other than the three recognized ones are carried
/// through load and save untouched in `extra`, and so is a recognized key
/// whose value is not a string (`null`, numbers, objects) until the user
/// edits it.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Record {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        let mut record = Record::default();
        for (key, value) in object {
            match (FieldKey::from_key(&key), value) {
                (Some(field), Value::String(text)) => *record.slot_mut(field) = Some(text),
                (_, value) => {
                    record.extra.insert(key, value);
                }
            }
        }
        Ok(record)
    }
}

impl Record {
    pub fn new(
        instruction: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Record {
            instruction: Some(instruction.into()),
            input: Some(input.into()),
            output: Some(output.into()),
            extra: Map::new(),
        }
    }

    /// Template inserted by "Add Item".
    pub fn template() -> Self {
        Record::new(NEW_RECORD_INSTRUCTION, "", "")
    }

    fn slot(&self, key: FieldKey) -> &Option<String> {
        match key {
            FieldKey::Instruction => &self.instruction,
            FieldKey::Input => &self.input,
            FieldKey::Output => &self.output,
        }
    }

    fn slot_mut(&mut self, key: FieldKey) -> &mut Option<String> {
        match key {
            FieldKey::Instruction => &mut self.instruction,
            FieldKey::Input => &mut self.input,
            FieldKey::Output => &mut self.output,
        }
    }

    /// Field value as the panes show it. An absent key or `null` reads as
    /// the empty string; other non-string values read as their JSON text.
    pub fn field(&self, key: FieldKey) -> Cow<'_, str> {
        if let Some(text) = self.slot(key) {
            return Cow::Borrowed(text);
        }
        match self.extra.get(key.as_str()) {
            None | Some(Value::Null) => Cow::Borrowed(""),
            Some(raw) => Cow::Owned(raw.to_string()),
        }
    }

    pub fn has_field(&self, key: FieldKey) -> bool {
        self.slot(key).is_some() || self.extra.contains_key(key.as_str())
    }

    /// Overwrites `key` when `value` differs from what is shown. Returns
    /// whether the record changed. A raw non-string value is replaced by
    /// the string.
    pub fn set_field(&mut self, key: FieldKey, value: &str) -> bool {
        if self.field(key) == value {
            return false;
        }
        self.extra.retain(|k, _| k != key.as_str());
        *self.slot_mut(key) = Some(value.to_string());
        true
    }

    pub fn fields(&self) -> [String; 3] {
        FieldKey::ALL.map(|key| self.field(key).to_string())
    }

    /// Single-line preview: the first present field among instruction,
    /// input and output, cut to `PREVIEW_CHARS` and suffixed with "...".
    pub fn preview(&self) -> String {
        let source = FieldKey::ALL
            .into_iter()
            .find(|key| self.has_field(*key))
            .map(|key| self.field(key))
            .unwrap_or(Cow::Borrowed("No preview"));
        let head: String = source
            .chars()
            .take(PREVIEW_CHARS)
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        format!("{head}...")
    }
}
