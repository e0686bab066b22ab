//! tablestash demo
//!
//! Stores a small table under `./sandbox/pickle_store/`, loads it back and
//! compares a generic copy of it with itself. Takes no arguments.

use chrono::NaiveDate;
use tablestash::{compare, Column, DateColumns, ObjectStore, StoreConfig, Table};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = ObjectStore::new(StoreConfig::default())?;

    let dates = [(2023, 1, 1), (2023, 2, 2), (2023, 3, 3)]
        .into_iter()
        .map(|(y, m, d)| {
            NaiveDate::from_ymd_opt(y, m, d)
                .and_then(|day| day.and_hms_opt(0, 0, 0))
                .ok_or_else(|| anyhow::anyhow!("invalid date {}-{}-{}", y, m, d))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let test = Table::new(vec![
        Column::int64("a", [1, 2, 3]),
        Column::float64("b", [1.0, 2.0, 3.0]),
        Column::string("c", ["a", "b", "c"]),
        Column::datetime("d", dates),
    ])?;

    store.dump_table(&test, "test", DateColumns::explicit(["d"]), None)?;

    let loaded = store.load_table("test", None)?;
    println!("loaded 'test' with dtypes:");
    for (name, dtype) in loaded.dtypes() {
        println!("  {}: {}", name, dtype);
    }

    store.dump_object(&test, "test_object", None)?;
    compare(&store, "test_object", "test_object", None)?;

    Ok(())
}
