//! Core of the TradeMe rental dashboard: load listings, filter them and
//! compute the figures and series the dashboard shows.

pub mod config;
pub mod data;
