//! Remote exchange-rate API providers

pub mod exchange_api;
