mod geocoding_cache_tests;
mod utils;
