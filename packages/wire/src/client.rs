//! The wire client: persisted connection configuration plus path-addressed
//! requests against the configured storage.

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use remotestorage_diagnostics::{Diagnostics, Logger};
use remotestorage_events::EventEmitter;
use remotestorage_future::{Future, Runtime};
use remotestorage_kv_store::KeyValueStore;

use crate::chain::set_chain;
use crate::error::Error;
use crate::transport::Transport;
use crate::types::{ConnectionState, Document, Timestamp, WireConfig, WireEvent};

const STORAGE_TYPE: &str = "storageType";
const STORAGE_HREF: &str = "storageHref";
const BEARER_TOKEN: &str = "bearerToken";

/// Stores the user's storage information and issues requests through a
/// [`Transport`] accordingly.
///
/// The three connection fields (storage type, storage address, bearer token)
/// live in a [`KeyValueStore`] under `key_prefix + field`, JSON-encoded. The
/// [`ConnectionState`] is recomputed from them on every query.
///
/// Emits [`WireEvent::Connected`] when a write completes the configuration.
/// Handlers run with no lock held, so they may use the client, including
/// registering further handlers. Those first run on the next event.
pub struct WireClient<S, T> {
    config: WireConfig,
    store: Mutex<S>,
    transport: T,
    events: Mutex<EventEmitter<WireEvent>>,
    logger: Logger,
}

impl<S, T> WireClient<S, T>
where
    S: KeyValueStore,
    T: Transport,
{
    pub fn new(store: S, transport: T, diagnostics: &Arc<Diagnostics>) -> Self {
        Self::with_config(WireConfig::default(), store, transport, diagnostics)
    }

    pub fn with_config(
        config: WireConfig,
        store: S,
        transport: T,
        diagnostics: &Arc<Diagnostics>,
    ) -> Self {
        Self {
            config,
            store: Mutex::new(store),
            transport,
            events: Mutex::new(EventEmitter::new(WireEvent::ALL)),
            logger: diagnostics.logger("wireClient"),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn lock_store(&self) -> MutexGuard<'_, S> {
        self.store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_events(&self) -> MutexGuard<'_, EventEmitter<WireEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn key(&self, field: &str) -> String {
        format!("{}{}", self.config.key_prefix, field)
    }

    /// Read a persisted field. Values that do not parse are dropped.
    fn field(&self, store: &mut S, field: &str) -> Option<String> {
        let key = self.key(field);
        let raw = store.get(&key)?;
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::String(text)) if text.is_empty() => None,
            Ok(Value::String(text)) => Some(text),
            Ok(Value::Null) => None,
            Ok(other) => Some(other.to_string()),
            Err(error) => {
                self.logger
                    .error(format_args!("dropping unreadable {}: {}", key, error));
                if let Err(error) = store.remove(&key) {
                    self.logger
                        .error(format_args!("failed to remove {}: {}", key, error));
                }
                None
            }
        }
    }

    fn write_field(&self, store: &mut S, field: &str, value: &str) -> Result<(), Error> {
        let encoded = Value::String(value.to_string()).to_string();
        store.set(&self.key(field), &encoded)?;
        Ok(())
    }

    fn derive_state(&self, store: &mut S) -> ConnectionState {
        let storage_type = self.field(store, STORAGE_TYPE);
        let href = self.field(store, STORAGE_HREF);
        match (storage_type, href) {
            (Some(_), Some(_)) => match self.field(store, BEARER_TOKEN) {
                Some(_) => ConnectionState::Connected,
                None => ConnectionState::Authing,
            },
            _ => ConnectionState::Anonymous,
        }
    }

    /// Apply a configuration change and emit `Connected` if it completed the
    /// configuration.
    fn update(&self, change: impl FnOnce(&mut S) -> Result<(), Error>) -> Result<(), Error> {
        let (before, after) = {
            let mut store = self.lock_store();
            let before = self.derive_state(&mut store);
            change(&mut *store)?;
            (before, self.derive_state(&mut store))
        };

        if after == ConnectionState::Connected && before != ConnectionState::Connected {
            self.logger.info("connected");
            let mut dispatch = self.lock_events().take_for_emit(WireEvent::Connected)?;
            dispatch.run(&());
            self.lock_events().restore(dispatch);
        }
        Ok(())
    }

    /// Current connection state, derived from the persisted fields.
    pub fn state(&self) -> ConnectionState {
        let mut store = self.lock_store();
        self.derive_state(&mut store)
    }

    /// Persist the storage type and the base address of the storage server.
    ///
    /// Both fields are written or neither: if the address cannot be stored,
    /// the previous storage type is put back.
    pub fn set_storage_info(&self, storage_type: &str, href: &str) -> Result<(), Error> {
        self.update(|store| {
            let type_key = self.key(STORAGE_TYPE);
            let previous = store.get(&type_key);
            self.write_field(store, STORAGE_TYPE, storage_type)?;

            if let Err(error) = self.write_field(store, STORAGE_HREF, href) {
                let reverted = match previous {
                    Some(value) => store.set(&type_key, &value),
                    None => store.remove(&type_key),
                };
                if let Err(revert_error) = reverted {
                    self.logger
                        .error(format_args!("failed to revert {}: {}", type_key, revert_error));
                }
                return Err(error);
            }
            Ok(())
        })
    }

    /// Persist the bearer token used to authorize requests.
    pub fn set_bearer_token(&self, token: &str) -> Result<(), Error> {
        self.update(|store| self.write_field(store, BEARER_TOKEN, token))
    }

    /// Forget only the bearer token, e.g. after it was rejected.
    pub fn clear_bearer_token(&self) -> Result<(), Error> {
        self.lock_store().remove(&self.key(BEARER_TOKEN))?;
        Ok(())
    }

    /// Forget the whole configuration. No event is emitted.
    pub fn disconnect(&self) -> Result<(), Error> {
        let mut store = self.lock_store();
        for field in [STORAGE_TYPE, STORAGE_HREF, BEARER_TOKEN] {
            store.remove(&self.key(field))?;
        }
        self.logger.info("disconnected");
        Ok(())
    }

    pub fn storage_type(&self) -> Option<String> {
        let mut store = self.lock_store();
        self.field(&mut store, STORAGE_TYPE)
    }

    /// Base address of the user's storage.
    pub fn storage_href(&self) -> Option<String> {
        let mut store = self.lock_store();
        self.field(&mut store, STORAGE_HREF)
    }

    pub fn bearer_token(&self) -> Option<String> {
        let mut store = self.lock_store();
        self.field(&mut store, BEARER_TOKEN)
    }

    /// Install an event handler.
    pub fn on(
        &self,
        event: WireEvent,
        handler: impl FnMut(&()) + Send + 'static,
    ) -> Result<(), Error> {
        self.lock_events().on(event, handler)?;
        Ok(())
    }

    /// Install an event handler that runs at most once.
    pub fn once(
        &self,
        event: WireEvent,
        handler: impl FnOnce(&()) + Send + 'static,
    ) -> Result<(), Error> {
        self.lock_events().once(event, handler)?;
        Ok(())
    }

    /// Resolve `path` against the storage address. Returns the full address
    /// and the bearer token.
    fn resolve(&self, path: &str) -> Result<(String, Option<String>), Error> {
        if path.is_empty() {
            return Err(Error::InvalidPath {
                path: path.to_string(),
            });
        }
        let mut store = self.lock_store();
        let href = self
            .field(&mut store, STORAGE_HREF)
            .ok_or(Error::NotConfigured)?;
        let token = self.field(&mut store, BEARER_TOKEN);
        Ok((format!("{}{}", href, path), token))
    }

    /// Get the document at `path`, relative to the storage root.
    ///
    /// `callback` receives the transport's answer; `Ok(None)` means there is
    /// no document. An invalid path fails without touching the transport, and
    /// so does a client with no stored address ([`Error::NotConfigured`]).
    pub fn get(&self, path: &str, callback: impl FnOnce(Result<Option<Document>, Error>)) {
        let result = self.resolve(path).and_then(|(url, token)| {
            self.logger.debug(format_args!("GET {}", url));
            Ok(self.transport.get(&url, token.as_deref())?)
        });
        callback(result)
    }

    /// Write `body` to `path` with the given content type.
    ///
    /// `callback` receives the modification timestamp. Like [`get`](Self::get),
    /// fails before reaching the transport on an empty path or when no
    /// address is stored.
    pub fn set(
        &self,
        path: &str,
        body: &str,
        content_type: &str,
        callback: impl FnOnce(Result<Timestamp, Error>),
    ) {
        let result = self.resolve(path).and_then(|(url, token)| {
            self.logger.debug(format_args!("PUT {}", url));
            Ok(self
                .transport
                .set(&url, body, content_type, token.as_deref())?)
        });
        callback(result)
    }

    /// Delete the document at `path`.
    pub fn remove(&self, path: &str, callback: impl FnOnce(Result<Timestamp, Error>)) {
        let result = self.resolve(path).and_then(|(url, token)| {
            self.logger.debug(format_args!("DELETE {}", url));
            Ok(self.transport.delete(&url, token.as_deref())?)
        });
        callback(result)
    }

    /// Write several documents one after another, all with the same content
    /// type. Stops at the first failure.
    ///
    /// `callback` receives the timestamp of the last write. Every path is
    /// validated before anything is written.
    pub fn set_all<I>(
        &self,
        entries: I,
        content_type: &str,
        callback: impl FnOnce(Result<Option<Timestamp>, Error>),
    ) where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut token = None;
        let resolved: Result<Vec<(String, String)>, Error> = entries
            .into_iter()
            .map(|(path, body)| {
                let (url, bearer) = self.resolve(&path)?;
                token = bearer;
                Ok((url, body))
            })
            .collect();

        match resolved {
            Ok(resolved) => {
                self.logger
                    .debug(format_args!("writing {} documents", resolved.len()));
                set_chain(
                    &self.transport,
                    resolved,
                    content_type,
                    token.as_deref(),
                    callback,
                )
            }
            Err(error) => callback(Err(error)),
        }
    }

    /// Like [`get`](Self::get), settling the returned future on a later tick.
    pub fn fetch(&self, runtime: &Runtime, path: &str) -> Future<Option<Document>, Error> {
        let future = runtime.future();
        self.get(path, |result| match result {
            Ok(document) => {
                future.fulfill_later(document);
            }
            Err(error) => {
                future.fail_later(error);
            }
        });
        future
    }

    /// Like [`set`](Self::set), settling the returned future on a later tick.
    pub fn store(
        &self,
        runtime: &Runtime,
        path: &str,
        body: &str,
        content_type: &str,
    ) -> Future<Timestamp, Error> {
        let future = runtime.future();
        self.set(path, body, content_type, |result| match result {
            Ok(timestamp) => {
                future.fulfill_later(timestamp);
            }
            Err(error) => {
                future.fail_later(error);
            }
        });
        future
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::transport::mock::MockTransport;
    use remotestorage_diagnostics::{Level, RecordingSink};
    use remotestorage_future::Outcome;
    use remotestorage_kv_store::InMemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const HREF: &str = "https://storage.example/alice";

    type Client = WireClient<InMemoryStore, MockTransport>;

    fn client() -> Client {
        WireClient::new(InMemoryStore::new(), MockTransport::new(), &Diagnostics::new())
    }

    fn connected() -> Client {
        let client = client();
        client.set_storage_info("remotestorage-00", HREF).unwrap();
        client.set_bearer_token("secret").unwrap();
        client
    }

    fn connect_counter(client: &Client) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        client
            .on(WireEvent::Connected, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        count
    }

    #[test]
    fn state_follows_persisted_fields() {
        let client = client();
        assert_eq!(client.state(), ConnectionState::Anonymous);

        client.set_storage_info("remotestorage-00", HREF).unwrap();
        assert_eq!(client.state(), ConnectionState::Authing);

        client.set_bearer_token("secret").unwrap();
        assert_eq!(client.state(), ConnectionState::Connected);

        client.clear_bearer_token().unwrap();
        assert_eq!(client.state(), ConnectionState::Authing);
    }

    #[test]
    fn token_alone_is_anonymous() {
        let client = client();
        client.set_bearer_token("secret").unwrap();
        assert_eq!(client.state(), ConnectionState::Anonymous);
    }

    #[test]
    fn connected_fires_once_on_transition() {
        let client = client();
        let count = connect_counter(&client);

        client.set_storage_info("remotestorage-00", HREF).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        client.set_bearer_token("secret").unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        client.set_bearer_token("secret").unwrap();
        client.set_storage_info("remotestorage-00", HREF).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reconnecting_after_disconnect_fires_again() {
        let client = client();
        let count = connect_counter(&client);

        client.set_bearer_token("secret").unwrap();
        client.set_storage_info("remotestorage-00", HREF).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        client.disconnect().unwrap();
        assert_eq!(client.state(), ConnectionState::Anonymous);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        client.set_storage_info("remotestorage-00", HREF).unwrap();
        client.set_bearer_token("other").unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn handlers_may_use_the_client() {
        let client = Arc::new(client());
        let fired = Arc::new(AtomicUsize::new(0));
        let seen_state = Arc::new(Mutex::new(None));

        let weak = Arc::downgrade(&client);
        let counter = Arc::clone(&fired);
        let state = Arc::clone(&seen_state);
        client
            .on(WireEvent::Connected, move |_| {
                let Some(client) = weak.upgrade() else {
                    return;
                };
                *state.lock().unwrap() = Some(client.state());
                let counter = Arc::clone(&counter);
                client
                    .once(WireEvent::Connected, move |_| {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                    .unwrap();
            })
            .unwrap();

        client.set_storage_info("remotestorage-00", HREF).unwrap();
        client.set_bearer_token("secret").unwrap();
        assert_eq!(*seen_state.lock().unwrap(), Some(ConnectionState::Connected));
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        client.clear_bearer_token().unwrap();
        client.set_bearer_token("secret").unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    /// Fails every write to keys ending in `failing_suffix`.
    struct FlakyStore {
        inner: InMemoryStore,
        failing_suffix: &'static str,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), remotestorage_kv_store::Error> {
            if key.ends_with(self.failing_suffix) {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into());
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), remotestorage_kv_store::Error> {
            self.inner.remove(key)
        }

        fn keys(&self) -> Vec<String> {
            self.inner.keys()
        }
    }

    #[test]
    fn storage_info_is_written_whole_or_not_at_all() {
        let store = FlakyStore {
            inner: [("remote_storage_wire_storageType", "\"old\"")]
                .into_iter()
                .collect(),
            failing_suffix: STORAGE_HREF,
        };
        let client = WireClient::new(store, MockTransport::new(), &Diagnostics::new());

        let result = client.set_storage_info("remotestorage-00", HREF);
        assert!(matches!(result, Err(Error::Store { .. })));
        assert_eq!(client.storage_type().as_deref(), Some("old"));
        assert_eq!(client.storage_href(), None);

        let client = WireClient::new(
            FlakyStore {
                inner: InMemoryStore::new(),
                failing_suffix: STORAGE_HREF,
            },
            MockTransport::new(),
            &Diagnostics::new(),
        );
        assert!(client.set_storage_info("remotestorage-00", HREF).is_err());
        assert_eq!(client.storage_type(), None);
        assert!(client.lock_store().keys().is_empty());
    }

    #[test]
    fn once_handler_fires_a_single_time() {
        let client = client();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        client
            .once(WireEvent::Connected, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        client.set_storage_info("remotestorage-00", HREF).unwrap();
        client.set_bearer_token("a").unwrap();
        client.disconnect().unwrap();
        client.set_storage_info("remotestorage-00", HREF).unwrap();
        client.set_bearer_token("b").unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fields_are_json_encoded_under_prefix() {
        let client = connected();
        let store = client.lock_store();
        assert_eq!(
            store.get("remote_storage_wire_storageHref").as_deref(),
            Some("\"https://storage.example/alice\"")
        );
        assert_eq!(
            store.get("remote_storage_wire_bearerToken").as_deref(),
            Some("\"secret\"")
        );
    }

    #[test]
    fn custom_key_prefix() {
        let client = WireClient::with_config(
            WireConfig {
                key_prefix: "acct1/".to_string(),
            },
            InMemoryStore::new(),
            MockTransport::new(),
            &Diagnostics::new(),
        );
        client.set_storage_info("t", HREF).unwrap();
        assert!(client.lock_store().get("acct1/storageHref").is_some());
        assert_eq!(client.storage_href().as_deref(), Some(HREF));
        assert_eq!(client.storage_type().as_deref(), Some("t"));
    }

    #[test]
    fn unreadable_field_is_dropped() {
        let diagnostics = Diagnostics::new();
        let sink = RecordingSink::new();
        diagnostics.set_sink(sink.clone());

        let store: InMemoryStore = [
            ("remote_storage_wire_storageType", "\"remotestorage-00\""),
            ("remote_storage_wire_storageHref", "not json"),
        ]
        .into_iter()
        .collect();
        let client = WireClient::new(store, MockTransport::new(), &diagnostics);

        assert_eq!(client.state(), ConnectionState::Anonymous);
        assert!(client
            .lock_store()
            .get("remote_storage_wire_storageHref")
            .is_none());
        assert_eq!(sink.at_level(Level::Error).len(), 1);
    }

    #[test]
    fn empty_values_count_as_absent() {
        let client = client();
        client.set_storage_info("remotestorage-00", "").unwrap();
        assert_eq!(client.state(), ConnectionState::Anonymous);
        assert_eq!(client.storage_href(), None);
    }

    #[test]
    fn get_resolves_path_and_passes_token() {
        let client = connected();
        let url = format!("{}/notes/today", HREF);
        let transport = client
            .transport()
            .clone()
            .with_document(url.clone(), Document::new("buy milk", Some("text/plain")));

        let mut result = None;
        client.get("/notes/today", |r| result = Some(r));

        let document = result.unwrap().unwrap().unwrap();
        assert_eq!(document.body, "buy milk");
        let recorded = transport.recorded_requests();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].url, url);
        assert_eq!(recorded[0].token.as_deref(), Some("secret"));
    }

    #[test]
    fn paths_are_concatenated_without_normalization() {
        let client = client();
        client
            .set_storage_info("remotestorage-00", "https://storage.example/alice/")
            .unwrap();

        client.get("/notes", |_| {});
        assert_eq!(
            client.transport().recorded_requests()[0].url,
            "https://storage.example/alice//notes"
        );
    }

    #[test]
    fn empty_path_fails_without_transport() {
        let client = connected();

        let mut result = None;
        client.get("", |r| result = Some(r));
        assert_eq!(
            result,
            Some(Err(Error::InvalidPath {
                path: String::new()
            }))
        );

        let mut result = None;
        client.set("", "x", "text/plain", |r| result = Some(r));
        assert!(matches!(result, Some(Err(Error::InvalidPath { .. }))));
        assert!(client.transport().recorded_requests().is_empty());
    }

    #[test]
    fn unconfigured_client_does_not_call_transport() {
        let client = client();
        let mut result = None;
        client.get("/notes", |r| result = Some(r));

        assert_eq!(result, Some(Err(Error::NotConfigured)));
        assert!(client.transport().recorded_requests().is_empty());
    }

    #[test]
    fn set_then_remove() {
        let client = connected();

        let mut stamp = None;
        client.set("/notes/a", "hello", "text/plain", |r| stamp = Some(r));
        assert_eq!(stamp, Some(Ok(1)));

        let url = format!("{}/notes/a", HREF);
        assert_eq!(
            client.transport().document(&url),
            Some(Document::new("hello", Some("text/plain")))
        );

        let mut removed = None;
        client.remove("/notes/a", |r| removed = Some(r));
        assert_eq!(removed, Some(Ok(2)));
        assert!(client.transport().document(&url).is_none());
    }

    #[test]
    fn transport_errors_pass_through() {
        let client = WireClient::new(
            InMemoryStore::new(),
            MockTransport::new().fail_with("connection reset"),
            &Diagnostics::new(),
        );
        client.set_storage_info("remotestorage-00", HREF).unwrap();

        let mut result = None;
        client.get("/x", |r| result = Some(r));
        assert_eq!(
            result,
            Some(Err(Error::Transport(TransportError::new("connection reset"))))
        );
    }

    #[test]
    fn set_all_writes_every_entry() {
        let client = connected();
        let mut result = None;

        client.set_all(
            vec![
                ("/a".to_string(), "1".to_string()),
                ("/b".to_string(), "2".to_string()),
            ],
            "text/plain",
            |r| result = Some(r),
        );

        assert_eq!(result, Some(Ok(Some(2))));
        let recorded = client.transport().recorded_requests();
        assert_eq!(recorded.len(), 2);
        assert!(recorded
            .iter()
            .all(|request| request.token.as_deref() == Some("secret")));
    }

    #[test]
    fn set_all_validates_before_writing() {
        let client = connected();
        let mut result = None;

        client.set_all(
            vec![
                ("/a".to_string(), "1".to_string()),
                (String::new(), "2".to_string()),
            ],
            "text/plain",
            |r| result = Some(r),
        );

        assert!(matches!(result, Some(Err(Error::InvalidPath { .. }))));
        assert!(client.transport().recorded_requests().is_empty());
    }

    #[test]
    fn fetch_settles_on_later_tick() {
        let diagnostics = Diagnostics::new();
        let runtime = Runtime::new(&diagnostics);
        let transport = MockTransport::new().with_document(
            format!("{}/profile", HREF),
            Document::new(r#"{"name":"Alice"}"#, Some("application/json")),
        );
        let client = WireClient::new(InMemoryStore::new(), transport, &diagnostics);
        client.set_storage_info("remotestorage-00", HREF).unwrap();
        client.set_bearer_token("secret").unwrap();

        let name = client
            .fetch(&runtime, "/profile")
            .and_then(|document| {
                let value: Value = document
                    .and_then(|d| d.json().ok())
                    .unwrap_or(Value::Null);
                Ok(Outcome::Value(value))
            })
            .get(&["name"]);

        assert!(!name.is_settled());
        runtime.run_until_idle();
        assert_eq!(name.outcome(), Some(Ok(vec![Value::from("Alice")])));
    }

    #[test]
    fn store_failure_reaches_handler() {
        let diagnostics = Diagnostics::new();
        let runtime = Runtime::new(&diagnostics);
        let client = WireClient::new(InMemoryStore::new(), MockTransport::new(), &diagnostics);

        let seen = std::rc::Rc::new(std::cell::RefCell::new(None));
        let sink = std::rc::Rc::clone(&seen);
        client
            .store(&runtime, "/a", "x", "text/plain")
            .on_settled(move |outcome| *sink.borrow_mut() = Some(outcome));

        assert!(seen.borrow().is_none());
        runtime.run_until_idle();
        assert_eq!(*seen.borrow(), Some(Err(Error::NotConfigured)));
    }
}
