use std::sync::{Arc, Mutex, MutexGuard};

use gradus_service::ThesisService;
use gradus_store::SqliteStore;

use crate::limit::RateLimit;

// The SQLite connection is single-threaded, so every request takes the
// service lock for the duration of its (synchronous) store calls.
#[derive(Clone)]
pub struct AppState {
    service: Arc<Mutex<ThesisService<SqliteStore>>>,
    limiter: Arc<dyn RateLimit>,
}

impl AppState {
    pub fn new(service: ThesisService<SqliteStore>, limiter: Arc<dyn RateLimit>) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
            limiter,
        }
    }

    pub fn service(&self) -> MutexGuard<'_, ThesisService<SqliteStore>> {
        match self.service.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn limiter(&self) -> &dyn RateLimit {
        self.limiter.as_ref()
    }
}
