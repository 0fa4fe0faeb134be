//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedGeocoder;
use crate::journal::JournalService;
use crate::supabase::SupabaseConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Stop workflows over the configured store
    pub journal: Arc<JournalService>,

    /// Cached place search
    pub geocoder: Arc<CachedGeocoder>,

    /// Public project URL and anon key, handed to the sign-in page.
    /// `None` with the memory store, where any token is accepted.
    pub sign_in: Option<Arc<SupabaseConfig>>,
}

impl AppState {
    pub fn new(journal: JournalService, geocoder: CachedGeocoder) -> Self {
        Self {
            journal: Arc::new(journal),
            geocoder: Arc::new(geocoder),
            sign_in: None,
        }
    }

    /// Let the sign-in page authenticate against this project.
    pub fn with_sign_in(mut self, config: SupabaseConfig) -> Self {
        self.sign_in = Some(Arc::new(config));
        self
    }
}
