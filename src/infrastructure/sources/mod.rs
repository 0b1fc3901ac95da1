//! Price-source adapters for storefront/aggregator APIs

pub mod traits;
pub mod cheapshark;
pub mod itad;
pub mod factory;

pub use traits::SourceAdapter;
pub use cheapshark::CheapSharkAdapter;
pub use itad::ItadAdapter;
pub use factory::AdapterFactory;
