//! Slot collection keyed by generated identifiers

use std::{fmt, str::FromStr, time::Duration};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Opaque slot identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(Uuid);

impl SlotId {
    fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SlotId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A single slot record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    #[serde(rename = "elapsed_ms", with = "duration_ms")]
    pub elapsed: Duration,
    pub relative: bool,
}

impl Slot {
    fn new(id: SlotId) -> Self {
        Self {
            id,
            elapsed: Duration::ZERO,
            relative: true,
        }
    }
}

mod duration_ms {
    use std::time::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Ordered slot collection
#[derive(Debug, Clone, Default)]
pub struct SlotRegistry {
    slots: Vec<Slot>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a slot with a fresh identifier
    pub fn add(&mut self) -> Slot {
        let mut id = SlotId::random();
        while self.get(id).is_some() {
            id = SlotId::random();
        }

        let slot = Slot::new(id);
        self.slots.push(slot.clone());
        info!("Added slot {} ({} total)", id, self.slots.len());
        slot
    }

    /// Remove the slot with `id`, if present
    pub fn remove(&mut self, id: SlotId) -> Option<Slot> {
        match self.slots.iter().position(|slot| slot.id == id) {
            Some(index) => {
                let slot = self.slots.remove(index);
                info!("Removed slot {} ({} left)", id, self.slots.len());
                Some(slot)
            }
            None => {
                debug!("Remove ignored, no slot {}", id);
                None
            }
        }
    }

    pub fn list(&self) -> &[Slot] {
        &self.slots
    }

    pub fn get(&self, id: SlotId) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use proptest::prelude::*;

    #[test]
    fn add_then_remove_leaves_empty() {
        let mut registry = SlotRegistry::new();
        let slot = registry.add();
        assert_eq!(registry.len(), 1);
        assert_eq!(slot.elapsed, Duration::ZERO);
        assert!(slot.relative);

        assert_eq!(registry.remove(slot.id), Some(slot));
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_missing_id_is_noop() {
        let mut registry = SlotRegistry::new();
        registry.add();
        registry.add();
        let before = registry.list().to_vec();

        let stranger = SlotId::random();
        assert_eq!(registry.remove(stranger), None);
        assert_eq!(registry.list(), before.as_slice());
    }

    #[test]
    fn remove_keeps_order_of_the_rest() {
        let mut registry = SlotRegistry::new();
        let a = registry.add();
        let b = registry.add();
        let c = registry.add();

        registry.remove(b.id);
        let ids: Vec<SlotId> = registry.list().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }

    #[test]
    fn removing_twice_only_removes_once() {
        let mut registry = SlotRegistry::new();
        let slot = registry.add();
        assert!(registry.remove(slot.id).is_some());
        assert!(registry.remove(slot.id).is_none());
    }

    #[test]
    fn slot_serializes_elapsed_as_millis() {
        let mut slot = Slot::new(SlotId::random());
        slot.elapsed = Duration::from_millis(1250);
        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["elapsed_ms"], 1250);
        assert_eq!(json["relative"], true);
        assert_eq!(json["id"], slot.id.to_string());
    }

    #[test]
    fn slot_id_parses_its_display_form() {
        let id = SlotId::random();
        assert_eq!(id.to_string().parse::<SlotId>().unwrap(), id);
        assert!("not-an-id".parse::<SlotId>().is_err());
    }

    proptest! {
        #[test]
        fn consecutive_adds_never_collide(count in 1usize..500) {
            let mut registry = SlotRegistry::new();
            let mut seen = HashSet::new();
            for _ in 0..count {
                prop_assert!(seen.insert(registry.add().id));
            }
            prop_assert_eq!(registry.len(), count);
        }

        #[test]
        fn interleaved_removes_preserve_order(ops in prop::collection::vec(any::<bool>(), 1..64)) {
            let mut registry = SlotRegistry::new();
            let mut model: Vec<SlotId> = Vec::new();
            for (step, add) in ops.into_iter().enumerate() {
                if add || model.is_empty() {
                    model.push(registry.add().id);
                } else {
                    let victim = model.remove(step % model.len());
                    prop_assert!(registry.remove(victim).is_some());
                }
                let ids: Vec<SlotId> = registry.list().iter().map(|s| s.id).collect();
                prop_assert_eq!(&ids, &model);
            }
        }
    }
}
