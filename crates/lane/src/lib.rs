//! Lane context.
//!
//! Actions publish their outputs here under well-known keys so later steps in the same lane can
//! read them. Values are heterogeneous; readers ask for the concrete type they expect.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Slot = Arc<dyn Any + Send + Sync>;

#[derive(Default, Clone)]
pub struct LaneContext {
    values: HashMap<&'static str, Slot>,
}

impl LaneContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing whatever was there.
    pub fn set<T: Any + Send + Sync>(&mut self, key: &'static str, value: T) {
        tracing::trace!(key, "lane context set");
        self.values.insert(key, Arc::new(value));
    }

    /// Typed read. Returns `None` if the key is unset or holds a different type.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }
}

impl fmt::Debug for LaneContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("LaneContext").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::LaneContext;

    #[test]
    fn typed_roundtrip_and_type_mismatch() {
        let mut lane = LaneContext::new();
        lane.set("STATUS", 201_u16);

        assert_eq!(lane.get::<u16>("STATUS"), Some(&201));
        assert_eq!(lane.get::<u32>("STATUS"), None);
        assert_eq!(lane.get::<u16>("MISSING"), None);
    }

    #[test]
    fn set_overwrites_previous_value() {
        let mut lane = LaneContext::new();
        lane.set("KEY", "first".to_string());
        lane.set("KEY", "second".to_string());

        assert_eq!(lane.len(), 1);
        assert_eq!(lane.get::<String>("KEY").map(String::as_str), Some("second"));
        assert!(!lane.is_empty());
    }

    #[test]
    fn debug_lists_sorted_keys() {
        let mut lane = LaneContext::new();
        lane.set("B", 1_u8);
        lane.set("A", 2_u8);
        assert_eq!(format!("{lane:?}"), r#"LaneContext { keys: ["A", "B"] }"#);
    }
}
