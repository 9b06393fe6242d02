//! The fetch-then-diff scheduler.
//!
//! `StockMonitor` owns the retained snapshot and runs one cycle at startup
//! and then one per poll interval. Fetch errors abandon the cycle and keep
//! the previous snapshot untouched; nothing here is fatal to the process.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};

use crate::catalog::{fetch_catalog, BaseCatalogSource};
use crate::notify::BaseNotificationSink;
use crate::stock::{diff, Snapshot};

pub struct StockMonitor {
    source: Arc<dyn BaseCatalogSource>,
    sink: Arc<dyn BaseNotificationSink>,
    per_page: u32,
    poll_interval: Duration,
    previous: Snapshot,
}

impl StockMonitor {
    pub fn new(
        source: Arc<dyn BaseCatalogSource>,
        sink: Arc<dyn BaseNotificationSink>,
        per_page: u32,
        poll_interval: Duration,
    ) -> Self {
        Self {
            source,
            sink,
            per_page,
            poll_interval,
            previous: Snapshot::new(),
        }
    }

    /// Run until the process is killed.
    ///
    /// The startup fetch seeds the retained snapshot and prints the console
    /// stock report; after that, one cycle per tick. A cycle is awaited to
    /// completion before the next tick is polled, so cycles never overlap,
    /// and a delayed cycle pushes the following tick back rather than
    /// letting triggers pile up.
    pub async fn run(mut self) {
        self.run_initial().await;

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the startup fetch already
        // covered it.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    /// Initial fetch: seed tracking state and report current stock on the
    /// console, one line per product.
    async fn run_initial(&mut self) {
        match fetch_catalog(self.source.as_ref(), self.per_page).await {
            Ok(snapshot) if !snapshot.is_empty() => {
                println!("📉 **Initial stock status:**");
                for record in snapshot.values() {
                    let status = if record.in_stock {
                        "In Stock"
                    } else {
                        "Out of Stock"
                    };
                    println!(
                        "Product {} ({}) is {}",
                        record.name,
                        record.categories_joined(),
                        status
                    );
                }
                self.previous = snapshot;
            }
            Ok(_) => {
                println!("No products found or unable to fetch stock status.");
            }
            Err(e) => {
                tracing::error!("Initial catalog fetch failed: {}", e);
                println!("No products found or unable to fetch stock status.");
            }
        }
    }

    /// One fetch-then-diff cycle.
    async fn run_cycle(&mut self) {
        let current = match fetch_catalog(self.source.as_ref(), self.per_page).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // Cycle-local failure: keep the previous snapshot and wait
                // for the next tick. No retry.
                tracing::error!("Catalog fetch failed, skipping this cycle: {}", e);
                return;
            }
        };

        let (events, next) = diff(&self.previous, current);

        tracing::info!(
            "Cycle complete: {} products tracked, {} back in stock",
            next.len(),
            events.len()
        );

        for event in &events {
            if let Err(e) = self.sink.notify_back_in_stock(event).await {
                // A dropped announcement is not worth re-announcing the
                // whole batch next cycle; log it and move on.
                tracing::error!("Failed to notify for {}: {:#}", event.name, e);
            }
        }

        self.previous = next;
    }
}
