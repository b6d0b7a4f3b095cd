pub mod price_provider;

pub use price_provider::{PriceProvider, PriceProviderError, SectorLookup, UNKNOWN_SECTOR};
