pub mod analytics_service;
pub mod benchmark_service;
pub mod indicators;
pub mod returns;
pub mod risk_service;
pub mod sector_service;
pub mod series_cache;
