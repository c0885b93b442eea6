//! Provider adapters implementing [`MarketDataClient`](crate::MarketDataClient).

pub mod yahoo;

pub use yahoo::YahooAdapter;
