//! The client every entity operation runs against: one transport plus
//! one cache store.

use barrel_cache::{CacheStore, NoCache};
use barrel_rpc::Transport;

pub struct Client {
    transport: Box<dyn Transport>,
    cache: Box<dyn CacheStore>,
}

impl Client {
    /// A client without caching; every read hits the backend.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Client {
            transport: Box::new(transport),
            cache: Box::new(NoCache),
        }
    }

    /// A client memoizing cacheable reads in the given store.
    pub fn with_cache(
        transport: impl Transport + 'static,
        cache: impl CacheStore + 'static,
    ) -> Self {
        Client {
            transport: Box::new(transport),
            cache: Box::new(cache),
        }
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn cache(&self) -> &dyn CacheStore {
        self.cache.as_ref()
    }
}
