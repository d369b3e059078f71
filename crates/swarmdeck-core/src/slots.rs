// ABOUTME: Bounded, ordered set of category identifiers.
// ABOUTME: Enforces the MAX_SLOTS capacity and uniqueness on every insert.

use crate::error::{PanelError, Result};
use serde::Serialize;

/// Maximum number of categories a single panel can run at once.
pub const MAX_SLOTS: usize = 10;

/// Ordered collection of unique category ids, insertion order preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SlotSet {
    ids: Vec<String>,
}

impl SlotSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ids.len() >= MAX_SLOTS
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids.clone()
    }

    /// Add `id` to the end of the set.
    ///
    /// Capacity is checked before membership so a full set always reports
    /// `CapacityExceeded`, even for an id that is already present.
    pub fn insert(&mut self, id: &str) -> Result<()> {
        let id = normalize(id)?;
        if self.is_full() {
            return Err(PanelError::CapacityExceeded { max: MAX_SLOTS });
        }
        if self.contains(&id) {
            return Err(PanelError::AlreadyActive(id));
        }
        self.ids.push(id);
        Ok(())
    }

    /// Remove `id`, returning whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let id = id.trim();
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        self.ids.len() != before
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Trim a raw id and reject empty ones.
pub fn normalize(id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(PanelError::InvalidRequest("category is required".into()));
    }
    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_order() {
        let mut slots = SlotSet::new();
        slots.insert("b").unwrap();
        slots.insert("a").unwrap();
        assert_eq!(slots.as_slice(), &["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut slots = SlotSet::new();
        slots.insert("abc123").unwrap();
        let err = slots.insert(" abc123 ").unwrap_err();
        assert!(matches!(err, PanelError::AlreadyActive(id) if id == "abc123"));
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn insert_rejects_empty() {
        let mut slots = SlotSet::new();
        assert!(matches!(
            slots.insert("   "),
            Err(PanelError::InvalidRequest(_))
        ));
        assert!(slots.is_empty());
    }

    #[test]
    fn capacity_is_enforced() {
        let mut slots = SlotSet::new();
        for i in 0..MAX_SLOTS {
            slots.insert(&format!("cat-{i}")).unwrap();
        }
        assert!(slots.is_full());
        let err = slots.insert("one-more").unwrap_err();
        assert!(matches!(err, PanelError::CapacityExceeded { max: MAX_SLOTS }));
        assert_eq!(slots.len(), MAX_SLOTS);
    }

    #[test]
    fn full_set_reports_capacity_before_duplicate() {
        let mut slots = SlotSet::new();
        for i in 0..MAX_SLOTS {
            slots.insert(&format!("cat-{i}")).unwrap();
        }
        assert!(matches!(
            slots.insert("cat-0"),
            Err(PanelError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn remove_reports_presence() {
        let mut slots = SlotSet::new();
        slots.insert("x").unwrap();
        assert!(!slots.remove("y"));
        assert!(slots.remove(" x"));
        assert!(slots.is_empty());
    }

    #[test]
    fn serializes_as_plain_list() {
        let mut slots = SlotSet::new();
        slots.insert("a").unwrap();
        assert_eq!(serde_json::to_string(&slots).unwrap(), r#"["a"]"#);
    }
}
