//! Slot lifecycle manager.
//!
//! Owns every revocable reference for published results. Each logical slot
//! (e.g. `podcast-audio-result`) holds at most one live handle. Publishing
//! into an occupied slot creates the new reference first and only then
//! revokes the old one, so a player bound to the slot never sees a gap.

use std::collections::{BTreeMap, HashMap};
use std::time::SystemTime;

use crate::error::Result;
use crate::types::{Blob, PlayableAudioHandle, RequestToken};

use super::registry::ObjectUrlRegistry;

/// Counters describing what the manager has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleStats {
    /// References created by `publish`.
    pub created: u64,
    /// References revoked by `publish`, `clear` or teardown.
    pub revoked: u64,
    /// Responses dropped because their request token was superseded.
    pub stale_discarded: u64,
    /// Slots with a request still awaiting its response.
    pub pending_requests: usize,
}

/// Enforces the create/replace/revoke discipline for result slots.
///
/// All live handles are revoked when the manager is dropped.
pub struct ResourceManager<R: ObjectUrlRegistry> {
    registry: R,
    /// Live handle per slot.
    slots: BTreeMap<String, PlayableAudioHandle>,
    /// Generation of the outstanding request per slot. An entry exists
    /// only while a request is in flight.
    pending: HashMap<String, u64>,
    /// Last generation handed out; shared by all slots and never reused.
    last_generation: u64,
    stats: LifecycleStats,
}

impl<R: ObjectUrlRegistry> ResourceManager<R> {
    /// Creates a manager backed by `registry`.
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            slots: BTreeMap::new(),
            pending: HashMap::new(),
            last_generation: 0,
            stats: LifecycleStats::default(),
        }
    }

    /// Publishes `blob` into `slot` and returns the new handle.
    ///
    /// The new reference is created before the slot's previous handle (if
    /// any) is revoked. If creation fails the previous handle stays live and
    /// bound to the slot. Any request started for the slot before this call
    /// becomes stale.
    pub fn publish(&mut self, slot: &str, blob: Blob) -> Result<PlayableAudioHandle> {
        let url = self.registry.create(&blob)?;
        self.stats.created += 1;

        let handle = PlayableAudioHandle {
            url,
            slot: slot.to_string(),
            mime_type: blob.mime_type().to_string(),
            byte_len: blob.len(),
            file_name: blob.file_name().to_string(),
            digest: blob.digest().to_string(),
            created_at: SystemTime::now(),
        };

        self.pending.remove(slot);
        let previous = self.slots.insert(slot.to_string(), handle.clone());

        tracing::info!(slot, url = %handle.url, bytes = handle.byte_len, "published result");

        if let Some(previous) = previous {
            self.release(&previous);
        }

        Ok(handle)
    }

    /// Revokes and forgets the handle bound to `slot`.
    ///
    /// Returns `false` if the slot was empty. Requests still in flight for
    /// the slot become stale.
    pub fn clear(&mut self, slot: &str) -> bool {
        self.pending.remove(slot);
        match self.slots.remove(slot) {
            Some(handle) => {
                self.release(&handle);
                true
            }
            None => false,
        }
    }

    /// Revokes every live handle. Called on teardown.
    pub fn clear_all(&mut self) {
        self.pending.clear();
        let slots = std::mem::take(&mut self.slots);
        for handle in slots.values() {
            self.release(handle);
        }
    }

    /// Revokes a specific handle if it is the live handle of some slot.
    ///
    /// Unknown or already revoked URLs are a no-op returning `false`.
    pub fn revoke(&mut self, url: &str) -> bool {
        let slot = self
            .slots
            .iter()
            .find(|(_, h)| h.url == url)
            .map(|(slot, _)| slot.clone());

        match slot {
            Some(slot) => self.clear(&slot),
            None => false,
        }
    }

    /// Returns the live handle bound to `slot`.
    pub fn current(&self, slot: &str) -> Option<&PlayableAudioHandle> {
        self.slots.get(slot)
    }

    /// Returns every live handle, ordered by slot name.
    pub fn handles(&self) -> impl Iterator<Item = &PlayableAudioHandle> {
        self.slots.values()
    }

    /// Returns the blob behind a live handle URL.
    pub fn resolve(&self, url: &str) -> Option<Blob> {
        self.registry.resolve(url)
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no slot holds a handle.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Starts a new request for `slot`, superseding earlier ones.
    pub fn begin_request(&mut self, slot: &str) -> RequestToken {
        self.last_generation += 1;
        let generation = self.last_generation;
        self.pending.insert(slot.to_string(), generation);
        tracing::debug!(slot, generation, "request started");
        RequestToken {
            slot: slot.to_string(),
            generation,
        }
    }

    /// Returns true if no request, publish or clear has superseded `token`.
    pub fn is_current(&self, token: &RequestToken) -> bool {
        self.pending.get(&token.slot) == Some(&token.generation)
    }

    /// Publishes `blob` only if `token` is still the latest request for its
    /// slot.
    ///
    /// A stale response returns `Ok(None)` and leaves the slot untouched.
    pub fn publish_if_current(
        &mut self,
        token: &RequestToken,
        blob: Blob,
    ) -> Result<Option<PlayableAudioHandle>> {
        if self.discard_if_stale(token) {
            return Ok(None);
        }

        self.publish(&token.slot, blob).map(Some)
    }

    /// Records and returns `true` if `token` has been superseded.
    ///
    /// Lets callers skip expensive work for a response that will be dropped.
    pub fn discard_if_stale(&mut self, token: &RequestToken) -> bool {
        if self.is_current(token) {
            return false;
        }

        self.stats.stale_discarded += 1;
        tracing::warn!(
            slot = %token.slot,
            generation = token.generation,
            "discarding stale response"
        );
        true
    }

    /// Returns lifecycle counters.
    pub fn stats(&self) -> LifecycleStats {
        LifecycleStats {
            pending_requests: self.pending.len(),
            ..self.stats
        }
    }

    /// Returns the underlying registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    fn release(&mut self, handle: &PlayableAudioHandle) {
        if self.registry.revoke(&handle.url) {
            self.stats.revoked += 1;
            tracing::debug!(slot = %handle.slot, url = %handle.url, "revoked handle");
        }
    }
}

impl<R: ObjectUrlRegistry> Drop for ResourceManager<R> {
    fn drop(&mut self) {
        self.clear_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DaemonError, ErrorCode};
    use crate::lifecycle::MemoryRegistry;
    use crate::types::WAV_MIME_TYPE;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn blob(byte: u8) -> Blob {
        Blob::new(vec![byte; 8], WAV_MIME_TYPE, "speech.wav")
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Create(String),
        Revoke(String),
    }

    /// Registry double recording call order; can be told to fail creates.
    #[derive(Clone, Default)]
    struct Recording {
        inner: Rc<RefCell<MemoryRegistry>>,
        events: Rc<RefCell<Vec<Event>>>,
        fail_create: Rc<RefCell<bool>>,
    }

    impl ObjectUrlRegistry for Recording {
        fn create(&mut self, blob: &Blob) -> Result<String> {
            if *self.fail_create.borrow() {
                return Err(DaemonError::io(
                    "create",
                    std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                ));
            }
            let url = self.inner.borrow_mut().create(blob)?;
            self.events.borrow_mut().push(Event::Create(url.clone()));
            Ok(url)
        }

        fn revoke(&mut self, url: &str) -> bool {
            self.events.borrow_mut().push(Event::Revoke(url.to_string()));
            self.inner.borrow_mut().revoke(url)
        }

        fn resolve(&self, url: &str) -> Option<Blob> {
            self.inner.borrow().resolve(url)
        }

        fn live_count(&self) -> usize {
            self.inner.borrow().live_count()
        }
    }

    #[test]
    fn publish_into_empty_slot() {
        let mut manager = ResourceManager::new(MemoryRegistry::new());
        let handle = manager.publish("speech", blob(1)).unwrap();

        assert_eq!(handle.slot, "speech");
        assert_eq!(handle.byte_len, 8);
        assert_eq!(handle.mime_type, WAV_MIME_TYPE);
        assert_eq!(manager.current("speech"), Some(&handle));
        assert_eq!(manager.stats().revoked, 0);
    }

    #[test]
    fn n_publishes_revoke_n_minus_one() {
        let mut manager = ResourceManager::new(MemoryRegistry::new());
        let mut handles = Vec::new();
        for i in 0..5 {
            handles.push(manager.publish("podcast", blob(i)).unwrap());
        }

        assert_eq!(manager.stats().created, 5);
        assert_eq!(manager.stats().revoked, 4);
        assert_eq!(manager.registry().live_count(), 1);

        for old in &handles[..4] {
            assert!(manager.resolve(&old.url).is_none());
        }
        let last = &handles[4];
        assert!(manager.resolve(&last.url).is_some());
        assert_eq!(manager.current("podcast"), Some(last));
    }

    #[test]
    fn publish_creates_before_revoking() {
        let registry = Recording::default();
        let events = Rc::clone(&registry.events);
        let mut manager = ResourceManager::new(registry);

        let first = manager.publish("speech", blob(1)).unwrap();
        let second = manager.publish("speech", blob(2)).unwrap();

        assert_eq!(
            *events.borrow(),
            vec![
                Event::Create(first.url.clone()),
                Event::Create(second.url.clone()),
                Event::Revoke(first.url.clone()),
            ]
        );
    }

    #[test]
    fn failed_publish_keeps_previous_handle() {
        let registry = Recording::default();
        let fail = Rc::clone(&registry.fail_create);
        let mut manager = ResourceManager::new(registry);

        let first = manager.publish("speech", blob(1)).unwrap();
        *fail.borrow_mut() = true;

        let err = manager.publish("speech", blob(2)).unwrap_err();
        assert_eq!(err.code, ErrorCode::Io);
        assert_eq!(manager.current("speech"), Some(&first));
        assert!(manager.resolve(&first.url).is_some());
        assert_eq!(manager.stats().revoked, 0);
    }

    #[test]
    fn slots_are_independent() {
        let mut manager = ResourceManager::new(MemoryRegistry::new());
        let a = manager.publish("audiobook", blob(1)).unwrap();
        let b = manager.publish("speech", blob(2)).unwrap();

        assert_eq!(manager.len(), 2);
        assert!(manager.resolve(&a.url).is_some());
        assert!(manager.resolve(&b.url).is_some());
        assert_eq!(manager.stats().revoked, 0);
    }

    #[test]
    fn clear_revokes_once() {
        let registry = Recording::default();
        let events = Rc::clone(&registry.events);
        let mut manager = ResourceManager::new(registry);

        let handle = manager.publish("speech", blob(1)).unwrap();
        assert!(manager.clear("speech"));
        assert!(!manager.clear("speech"));

        let revokes = events
            .borrow()
            .iter()
            .filter(|e| **e == Event::Revoke(handle.url.clone()))
            .count();
        assert_eq!(revokes, 1);
        assert!(manager.current("speech").is_none());
        assert!(manager.is_empty());
    }

    #[test]
    fn revoke_unknown_url_is_noop() {
        let mut manager = ResourceManager::new(MemoryRegistry::new());
        let handle = manager.publish("speech", blob(1)).unwrap();

        assert!(!manager.revoke("blob:wavslot/never-issued"));
        assert!(manager.revoke(&handle.url));
        assert!(!manager.revoke(&handle.url));
        assert_eq!(manager.stats().revoked, 1);
    }

    #[test]
    fn revoke_superseded_url_is_noop() {
        let mut manager = ResourceManager::new(MemoryRegistry::new());
        let old = manager.publish("speech", blob(1)).unwrap();
        let new = manager.publish("speech", blob(2)).unwrap();

        assert!(!manager.revoke(&old.url));
        assert_eq!(manager.current("speech"), Some(&new));
        assert_eq!(manager.stats().revoked, 1);
    }

    #[test]
    fn drop_revokes_everything() {
        let registry = Recording::default();
        let inner = Rc::clone(&registry.inner);
        {
            let mut manager = ResourceManager::new(registry);
            manager.publish("a", blob(1)).unwrap();
            manager.publish("b", blob(2)).unwrap();
            assert_eq!(inner.borrow().live_count(), 2);
        }
        assert_eq!(inner.borrow().live_count(), 0);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut manager = ResourceManager::new(MemoryRegistry::new());

        let first = manager.begin_request("speech");
        let second = manager.begin_request("speech");
        assert!(!manager.is_current(&first));
        assert!(manager.is_current(&second));

        let handle = manager.publish_if_current(&second, blob(2)).unwrap();
        assert!(handle.is_some());

        // The older response arrives late and must not overwrite the slot
        let late = manager.publish_if_current(&first, blob(1)).unwrap();
        assert!(late.is_none());
        assert_eq!(manager.current("speech"), handle.as_ref());
        assert_eq!(manager.stats().stale_discarded, 1);
        assert_eq!(manager.registry().live_count(), 1);
    }

    #[test]
    fn direct_publish_supersedes_in_flight_request() {
        let mut manager = ResourceManager::new(MemoryRegistry::new());
        let token = manager.begin_request("speech");
        manager.publish("speech", blob(1)).unwrap();

        assert!(!manager.is_current(&token));
        assert!(manager.publish_if_current(&token, blob(2)).unwrap().is_none());
    }

    #[test]
    fn clear_supersedes_in_flight_request() {
        let mut manager = ResourceManager::new(MemoryRegistry::new());
        let token = manager.begin_request("speech");
        manager.clear("speech");

        assert!(manager.publish_if_current(&token, blob(1)).unwrap().is_none());
        assert!(manager.current("speech").is_none());
    }

    #[test]
    fn tokens_are_per_slot() {
        let mut manager = ResourceManager::new(MemoryRegistry::new());
        let a = manager.begin_request("a");
        let b = manager.begin_request("b");
        assert!(manager.is_current(&a));
        assert_ne!(a.generation, b.generation);
    }

    #[test]
    fn cleared_slots_leave_no_request_state() {
        let mut manager = ResourceManager::new(MemoryRegistry::new());
        for i in 0..10_000 {
            let slot = format!("slot-{}", i);
            manager.begin_request(&slot);
            manager.clear(&slot);
        }

        assert!(manager.is_empty());
        assert_eq!(manager.stats().pending_requests, 0);
    }

    #[test]
    fn token_stays_stale_after_slot_is_reused() {
        let mut manager = ResourceManager::new(MemoryRegistry::new());
        let old = manager.begin_request("speech");
        manager.clear("speech");

        let new = manager.begin_request("speech");
        assert!(new.generation > old.generation);
        assert!(!manager.is_current(&old));
        assert!(manager.is_current(&new));
    }

    #[test]
    fn publish_settles_pending_request() {
        let mut manager = ResourceManager::new(MemoryRegistry::new());
        let token = manager.begin_request("speech");
        assert_eq!(manager.stats().pending_requests, 1);

        manager.publish_if_current(&token, blob(1)).unwrap();
        assert_eq!(manager.stats().pending_requests, 0);
        assert!(!manager.is_current(&token));
    }

    #[test]
    fn teardown_drops_pending_requests() {
        let mut manager = ResourceManager::new(MemoryRegistry::new());
        let token = manager.begin_request("speech");
        manager.publish("audiobook", blob(1)).unwrap();

        manager.clear_all();
        assert!(!manager.is_current(&token));
        assert_eq!(manager.stats().pending_requests, 0);
    }
}
