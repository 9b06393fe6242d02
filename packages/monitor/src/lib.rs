// Restock Monitor - core library
//
// Polls a WooCommerce-style catalog API on a fixed interval, diffs the
// fetched snapshot against the previous one, and announces back-in-stock
// products to a Discord channel.
//
// Components are wired through narrow Base* traits so the fetch loop and
// the diff engine are testable without a network.

pub mod catalog;
pub mod config;
pub mod monitor;
pub mod notify;
pub mod stock;

pub use config::Config;
