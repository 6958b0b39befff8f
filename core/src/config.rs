//! Configuration and the instance store.
//!
//! # Design
//! `InstanceStore` holds at most one `Instance` for its whole lifetime. It is
//! an ordinary owned value: the application constructs one (usually inside
//! `Plumifly`) and shares it, instead of reaching for a hidden global.
//!
//! Snapshots are handed out as `Arc<Instance>`. `update_config` swaps in a new
//! `Arc` rather than mutating in place, so a fetch that already took a
//! snapshot keeps a consistent view. Callers must still not race
//! initialization or updates against request issuance: a request issued
//! concurrently with an update may observe either configuration.
//!
//! A second `initialize` is rejected with `AlreadyInitialized` and leaves the
//! stored instance untouched.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use url::Url;

use crate::error::{ErrorCode, PlumiflyError, Result};
use crate::types::Theme;

/// Production endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.plumifly.com/api/v1";

/// Environment variable read by `PlumiflyConfig::from_env` for the API key.
pub const API_KEY_ENV: &str = "PLUMIFLY_API_KEY";

/// Environment variable read by `PlumiflyConfig::from_env` for the base URL.
pub const BASE_URL_ENV: &str = "PLUMIFLY_BASE_URL";

/// Hook notified of every request failure before it is returned.
pub type ErrorHook = Arc<dyn Fn(&PlumiflyError) + Send + Sync>;

/// Hook notified with a path when the user asks to open a post.
pub type NavigateHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Optional notification hooks. Hooks are side channels only; they never
/// change what an operation returns.
#[derive(Clone, Default)]
pub struct Callbacks {
    pub on_error: Option<ErrorHook>,
    pub on_navigate: Option<NavigateHook>,
}

impl Callbacks {
    pub fn on_error(mut self, hook: impl Fn(&PlumiflyError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }

    pub fn on_navigate(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_navigate = Some(Arc::new(hook));
        self
    }

    /// Overlay `other` key by key: hooks set in `other` replace ours, hooks
    /// it leaves unset are kept.
    pub fn merge(&mut self, other: Callbacks) {
        if let Some(hook) = other.on_error {
            self.on_error = Some(hook);
        }
        if let Some(hook) = other.on_navigate {
            self.on_navigate = Some(hook);
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_error", &self.on_error.is_some())
            .field("on_navigate", &self.on_navigate.is_some())
            .finish()
    }
}

/// Input to `InstanceStore::initialize`.
#[derive(Clone, Default)]
pub struct PlumiflyConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub callbacks: Callbacks,
}

impl PlumiflyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Read `PLUMIFLY_API_KEY` and, if set, `PLUMIFLY_BASE_URL`.
    ///
    /// A missing key yields an empty one, which `initialize` rejects with
    /// `MissingApiKey`.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(API_KEY_ENV).unwrap_or_default(),
            base_url: std::env::var(BASE_URL_ENV).ok().filter(|u| !u.is_empty()),
            callbacks: Callbacks::default(),
        }
    }
}

impl fmt::Debug for PlumiflyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlumiflyConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

/// Partial update applied by `InstanceStore::update_config`. Fields left as
/// `None` keep their current value; callbacks are merged key by key.
#[derive(Clone, Default, Debug)]
pub struct ConfigUpdate {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub theme: Option<Theme>,
    pub callbacks: Option<Callbacks>,
}

/// The active runtime configuration.
#[derive(Clone)]
pub struct Instance {
    api_key: String,
    base_url: Url,
    is_initialized: bool,
    theme: Option<Theme>,
    callbacks: Callbacks,
}

impl Instance {
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    pub fn theme(&self) -> Option<&Theme> {
        self.theme.as_ref()
    }

    pub fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("is_initialized", &self.is_initialized)
            .field("theme", &self.theme)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

/// Holder of the single active `Instance`.
#[derive(Default)]
pub struct InstanceStore {
    slot: RwLock<Option<Arc<Instance>>>,
}

impl InstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `config` and store it as the active instance.
    pub fn initialize(&self, config: PlumiflyConfig) -> Result<Arc<Instance>> {
        let mut slot = self.slot.write();
        if slot.is_some() {
            return Err(PlumiflyError::already_initialized());
        }

        let api_key = validate_api_key(config.api_key)?;
        let base_url = parse_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

        let instance = Arc::new(Instance {
            api_key,
            base_url,
            is_initialized: true,
            theme: None,
            callbacks: config.callbacks,
        });
        tracing::debug!(base_url = %instance.base_url, "plumifly initialized");
        *slot = Some(Arc::clone(&instance));
        Ok(instance)
    }

    /// The active instance.
    pub fn instance(&self) -> Result<Arc<Instance>> {
        self.slot.read().clone().ok_or_else(|| {
            PlumiflyError::not_initialized("Plumifly has not been initialized. Call initialize first")
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Merge `update` into the active instance and return the new snapshot.
    pub fn update_config(&self, update: ConfigUpdate) -> Result<Arc<Instance>> {
        let mut slot = self.slot.write();
        let current = slot.as_ref().ok_or_else(|| {
            PlumiflyError::not_initialized("Cannot update config before initialization")
        })?;

        let mut next = Instance::clone(current);
        if let Some(api_key) = update.api_key {
            next.api_key = validate_api_key(api_key)?;
        }
        if let Some(base_url) = update.base_url {
            next.base_url = parse_base_url(&base_url)?;
        }
        if let Some(theme) = update.theme {
            next.theme = Some(theme);
        }
        if let Some(callbacks) = update.callbacks {
            next.callbacks.merge(callbacks);
        }

        let next = Arc::new(next);
        tracing::debug!(base_url = %next.base_url, "plumifly config updated");
        *slot = Some(Arc::clone(&next));
        Ok(next)
    }
}

impl fmt::Debug for InstanceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceStore")
            .field("instance", &*self.slot.read())
            .finish()
    }
}

fn validate_api_key(api_key: String) -> Result<String> {
    if api_key.trim().is_empty() {
        return Err(PlumiflyError::missing_api_key());
    }
    Ok(api_key)
}

/// Parse an absolute http(s) base URL, dropping a trailing slash so path
/// joining stays uniform.
fn parse_base_url(raw: &str) -> Result<Url> {
    let invalid = |reason: String| {
        PlumiflyError::new(ErrorCode::InvalidBaseUrl, format!("Invalid base URL {raw:?}: {reason}"))
    };
    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("not a base URL".to_string()));
    }
    let trimmed = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn instance_before_initialize_is_not_initialized() {
        let store = InstanceStore::new();
        let err = store.instance().unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotInitialized);
        assert!(!store.is_initialized());
    }

    #[test]
    fn initialize_applies_default_base_url() {
        let store = InstanceStore::new();
        let instance = store.initialize(PlumiflyConfig::new("key-1")).unwrap();
        assert_eq!(instance.api_key(), "key-1");
        assert_eq!(instance.base_url().as_str(), DEFAULT_BASE_URL);
        assert!(instance.is_initialized());
        assert!(instance.theme().is_none());
        assert!(store.is_initialized());
    }

    #[test]
    fn initialize_rejects_missing_api_key() {
        let store = InstanceStore::new();
        let err = store.initialize(PlumiflyConfig::new("")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingApiKey);
        let err = store.initialize(PlumiflyConfig::new("   ")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingApiKey);
        assert!(!store.is_initialized());
    }

    #[test]
    fn second_initialize_is_rejected_and_keeps_original() {
        let store = InstanceStore::new();
        store
            .initialize(PlumiflyConfig::new("first").with_base_url("http://localhost:3000"))
            .unwrap();
        let err = store
            .initialize(PlumiflyConfig::new("second").with_base_url("http://other:4000"))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyInitialized);

        let instance = store.instance().unwrap();
        assert_eq!(instance.api_key(), "first");
        assert_eq!(instance.base_url().as_str(), "http://localhost:3000/");
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let store = InstanceStore::new();
        let instance = store
            .initialize(PlumiflyConfig::new("k").with_base_url("https://api.example.com/v2/"))
            .unwrap();
        assert_eq!(instance.base_url().as_str(), "https://api.example.com/v2");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let store = InstanceStore::new();
        let err = store
            .initialize(PlumiflyConfig::new("k").with_base_url("not a url"))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidBaseUrl);

        let err = store
            .initialize(PlumiflyConfig::new("k").with_base_url("ftp://files.example.com"))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidBaseUrl);
        assert!(!store.is_initialized());
    }

    #[test]
    fn update_before_initialize_is_not_initialized() {
        let store = InstanceStore::new();
        let err = store.update_config(ConfigUpdate::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotInitialized);
    }

    #[test]
    fn update_merges_callbacks_key_by_key() {
        let errors = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&errors);
        let store = InstanceStore::new();
        store
            .initialize(
                PlumiflyConfig::new("key")
                    .with_base_url("http://localhost:3000")
                    .with_callbacks(Callbacks::default().on_error(move |_| {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })),
            )
            .unwrap();

        let updated = store
            .update_config(ConfigUpdate {
                callbacks: Some(Callbacks::default().on_navigate(|_| {})),
                ..ConfigUpdate::default()
            })
            .unwrap();

        assert_eq!(updated.api_key(), "key");
        assert_eq!(updated.base_url().as_str(), "http://localhost:3000/");
        assert!(updated.callbacks().on_navigate.is_some());
        let on_error = updated.callbacks().on_error.as_ref().expect("on_error kept");
        on_error(&PlumiflyError::missing_api_key());
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn update_replaces_present_fields_only() {
        let store = InstanceStore::new();
        let before = store.initialize(PlumiflyConfig::new("old")).unwrap();
        let after = store
            .update_config(ConfigUpdate {
                api_key: Some("new".into()),
                theme: Some(Theme::default()),
                ..ConfigUpdate::default()
            })
            .unwrap();
        assert_eq!(after.api_key(), "new");
        assert_eq!(after.base_url().as_str(), DEFAULT_BASE_URL);
        assert!(after.theme().is_some());
        // Snapshots taken earlier are unaffected.
        assert_eq!(before.api_key(), "old");
        assert_eq!(store.instance().unwrap().api_key(), "new");
    }

    #[test]
    fn update_rejects_empty_api_key() {
        let store = InstanceStore::new();
        store.initialize(PlumiflyConfig::new("key")).unwrap();
        let err = store
            .update_config(ConfigUpdate {
                api_key: Some(String::new()),
                ..ConfigUpdate::default()
            })
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingApiKey);
        assert_eq!(store.instance().unwrap().api_key(), "key");
    }

    #[test]
    fn from_env_reads_key_and_base_url() {
        std::env::set_var(API_KEY_ENV, "env-key");
        std::env::set_var(BASE_URL_ENV, "http://env.example.com/api");
        let config = PlumiflyConfig::from_env();
        std::env::remove_var(API_KEY_ENV);
        std::env::remove_var(BASE_URL_ENV);

        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.base_url.as_deref(), Some("http://env.example.com/api"));
        let instance = InstanceStore::new().initialize(config).unwrap();
        assert_eq!(instance.base_url().as_str(), "http://env.example.com/api");
    }

    #[test]
    fn debug_never_prints_api_key() {
        let config = PlumiflyConfig::new("super-secret");
        assert!(!format!("{config:?}").contains("super-secret"));

        let store = InstanceStore::new();
        let instance = store.initialize(config).unwrap();
        assert!(!format!("{instance:?}").contains("super-secret"));
        assert!(!format!("{store:?}").contains("super-secret"));
    }
}
