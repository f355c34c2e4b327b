//! Counter application wired the way a UI would use the store.
//!
//! Run with `RUST_LOG=tally=trace` to see scope and store events.

use tally::{use_counter_store, Scope, ScopeConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Counter Application ===\n");

    let scope = Scope::with_config(ScopeConfig::labeled("counter-app"))?;
    scope.run(|| -> tally::Result<()> {
        let counter = use_counter_store()?;

        // The "view": re-renders whenever count or double_count changes
        let _view = scope.effect({
            let counter = counter.clone();
            move || {
                println!(
                    "   Count: {:>3} | Double: {:>3}",
                    counter.count(),
                    counter.double_count()
                );
            }
        });

        let _history = counter.subscribe(|count| {
            tracing::info!(count, "counter changed");
        });

        println!("\nIncrementing three times...");
        for _ in 0..3 {
            counter.increment();
        }

        println!("\nDecrementing five times...");
        for _ in 0..5 {
            use_counter_store()?.decrement();
        }

        println!("\nResetting...");
        counter.reset();
        Ok(())
    })?;
    scope.dispose();

    println!("\nDone.");
    Ok(())
}
