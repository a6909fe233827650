pub mod freshness;
pub use freshness::FreshnessPolicy;

pub mod generators;
pub use generators::{GenerationError, InsightGenerator};

pub mod keyed_lock;
pub use keyed_lock::KeyedLocks;

pub mod profile_cache;
pub use profile_cache::{CacheError, ProfileCache};

pub mod lookup_service;
pub use lookup_service::{ChatError, LookupError, ProfileLookupService};

pub mod lookup_service_impl;
pub use lookup_service_impl::SeaOrmLookupService;
