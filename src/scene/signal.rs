//! Signal table: named, typed publish points owned by one node.
//!
//! Each signal is registered with a payload type. Subscribers and emitters
//! must use that same type; a mismatch fails at `connect`/`emit` instead of
//! inside a callback.

use std::any::{Any, TypeId, type_name};

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// A subscriber callback for payload `P`.
pub type Callback<P> = Box<dyn FnMut(&P) -> Result<()>>;

struct Slot {
    payload: TypeId,
    payload_name: &'static str,
    /// Each entry is a `Callback<P>` for the registered `P`.
    subscribers: Vec<Box<dyn Any>>,
}

/// The signals of one node.
#[derive(Default)]
pub(crate) struct Signals {
    slots: IndexMap<String, Slot>,
}

impl Signals {
    pub(crate) fn register<P: 'static>(&mut self, node: &str, signal: &str) -> Result<()> {
        if self.slots.contains_key(signal) {
            return Err(Error::DuplicateSignal {
                node: node.to_owned(),
                signal: signal.to_owned(),
            });
        }
        self.slots.insert(
            signal.to_owned(),
            Slot {
                payload: TypeId::of::<P>(),
                payload_name: type_name::<P>(),
                subscribers: Vec::new(),
            },
        );
        Ok(())
    }

    pub(crate) fn connect<P: 'static>(
        &mut self,
        node: &str,
        signal: &str,
        callback: Callback<P>,
    ) -> Result<()> {
        let slot = self.slot_mut::<P>(node, signal)?;
        slot.subscribers.push(Box::new(callback));
        Ok(())
    }

    /// Call every subscriber in connection order. The first failure stops
    /// the emission and is returned.
    pub(crate) fn emit<P: 'static>(&mut self, node: &str, signal: &str, payload: &P) -> Result<()> {
        let slot = self.slot_mut::<P>(node, signal)?;
        for subscriber in &mut slot.subscribers {
            if let Some(callback) = subscriber.downcast_mut::<Callback<P>>() {
                callback(payload)?;
            }
        }
        Ok(())
    }

    pub(crate) fn is_registered(&self, signal: &str) -> bool {
        self.slots.contains_key(signal)
    }

    pub(crate) fn subscriber_count(&self, signal: &str) -> usize {
        self.slots.get(signal).map_or(0, |slot| slot.subscribers.len())
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    fn slot_mut<P: 'static>(&mut self, node: &str, signal: &str) -> Result<&mut Slot> {
        let slot = self
            .slots
            .get_mut(signal)
            .ok_or_else(|| Error::UnregisteredSignal {
                node: node.to_owned(),
                signal: signal.to_owned(),
            })?;

        if slot.payload != TypeId::of::<P>() {
            return Err(Error::SignalPayload {
                node: node.to_owned(),
                signal: signal.to_owned(),
                expected: slot.payload_name,
                found: type_name::<P>(),
            });
        }
        Ok(slot)
    }
}
