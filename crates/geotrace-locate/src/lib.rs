//! Geo-location lookup: provider clients, a persistent cache in front of
//! them, and availability-based delegation between providers.

pub mod cache_codec;
pub mod cache_store;
pub mod caching;
pub mod delegating;
pub mod error;
pub mod locator;
pub mod providers;
pub mod throttle;

pub use cache_store::{CacheStore, FileCacheStore, MemoryCacheStore};
pub use caching::CachingGeoLocator;
pub use delegating::DelegatingGeoLocator;
pub use error::{CacheLoadError, LocateError};
pub use locator::{GeoLocator, Progress};
pub use providers::{FreeGeoIpLocator, IpInfoDbLocator, MaxMindLocator, ProviderSettings};
pub use throttle::RequestThrottle;
