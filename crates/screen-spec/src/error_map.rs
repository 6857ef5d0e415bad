use serde::ser::{Serialize, SerializeMap, Serializer};

/// Field errors for one screen, kept in the order they were first recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMap {
    entries: Vec<(String, String)>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error, replacing any earlier one for the field in place.
    pub fn insert(&mut self, field_id: impl Into<String>, message: impl Into<String>) {
        let field_id = field_id.into();
        let message = message.into();
        match self.entries.iter_mut().find(|(id, _)| *id == field_id) {
            Some(entry) => entry.1 = message,
            None => self.entries.push((field_id, message)),
        }
    }

    /// Records `message` when present, otherwise clears the field.
    pub fn set(&mut self, field_id: &str, message: Option<String>) {
        match message {
            Some(message) => self.insert(field_id, message),
            None => {
                self.remove(field_id);
            }
        }
    }

    pub fn remove(&mut self, field_id: &str) -> Option<String> {
        let index = self.entries.iter().position(|(id, _)| id == field_id)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, field_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(id, _)| id == field_id)
            .map(|(_, message)| message.as_str())
    }

    pub fn contains(&self, field_id: &str) -> bool {
        self.get(field_id).is_some()
    }

    /// The first error in field order, the one a screen focuses.
    pub fn first(&self) -> Option<(&str, &str)> {
        self.entries
            .first()
            .map(|(id, message)| (id.as_str(), message.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(id, message)| (id.as_str(), message.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ErrorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, message) in &self.entries {
            map.serialize_entry(id, message)?;
        }
        map.end()
    }
}
