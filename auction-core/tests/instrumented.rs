//! Checks on the event stream of instrumented runs.
#![cfg(feature = "instrument")]

use auction_core::instrument::{self, Recorder};
use auction_core::{Allocation, AuctionSetup, Catalog, Category, Item};
use polars::prelude::*;

fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    for i in 0..16u32 {
        let category = Category::all().nth(i as usize % 4).unwrap();
        catalog.insert(
            Item::new(format!("Player {i}"), category, 0.5 + (i % 3) as f64 * 0.5)
                .with_stat("stars", (i % 10 + 1) as f64)
                .with_stat("batting_avg", 20.0 + i as f64 * 2.0)
                .with_stat("economy", 6.0 + (i % 5) as f64),
        );
    }
    // Nobody can afford this one
    catalog.insert(Item::new("Marquee", Category::AllRounder, 50.0));
    catalog
}

fn recorded_run(seed: u64) -> (Allocation, Recorder) {
    let (result, recorder) = instrument::record(|| AuctionSetup::four_teams(seed).run(catalog()));
    (result.unwrap(), recorder)
}

#[test]
fn one_event_per_resolved_item() {
    let (result, rec) = recorded_run(4);

    assert_eq!(
        rec.count("settlement"),
        result.ledger.sold().count(),
        "one settlement event per sale"
    );
    assert_eq!(
        rec.count("unsold"),
        result.ledger.unsold().count(),
        "one unsold event per unsold item"
    );
    assert!(
        rec.table("unsold").unwrap().strs("item").contains(&"Marquee".to_string()),
        "the unaffordable item is reported unsold"
    );
}

#[test]
fn settlement_prices_add_up_to_revenue() {
    let (result, rec) = recorded_run(9);
    let Some(sales) = rec.table("settlement") else {
        assert_eq!(result.ledger.revenue(), 0.0);
        return;
    };
    let total: f64 = sales.f64s("price").iter().sum();
    assert!(
        (total - result.ledger.revenue()).abs() < 1e-9,
        "event prices {total:.2} vs ledger revenue {:.2}",
        result.ledger.revenue()
    );
}

#[test]
fn every_recorded_bid_raises_the_price() {
    let (_, rec) = recorded_run(13);
    let Some(bids) = rec.table("bid") else {
        return;
    };

    let df = bids.to_dataframe().unwrap();
    let from = df.column("from").unwrap().as_materialized_series().f64().unwrap();
    let to = df.column("to").unwrap().as_materialized_series().f64().unwrap();
    for (f, t) in from.into_iter().zip(to.into_iter()) {
        let (f, t) = (f.unwrap(), t.unwrap());
        assert!(t > f, "bid from {f:.2} to {t:.2} does not raise");
    }
}

#[test]
fn bids_per_strategy_summarize_with_polars() {
    let (_, rec) = recorded_run(21);
    let Some(bids) = rec.table("bid") else {
        return;
    };

    let summary = bids
        .to_dataframe()
        .unwrap()
        .lazy()
        .group_by([col("strategy")])
        .agg([col("to").count().alias("bids"), col("to").max().alias("top")])
        .collect()
        .unwrap();

    let counted: u32 = summary
        .column("bids")
        .unwrap()
        .as_materialized_series()
        .u32()
        .unwrap()
        .into_iter()
        .flatten()
        .sum();
    assert_eq!(counted as usize, bids.len(), "grouping must not lose bids");
    assert!(summary.height() <= 4, "at most one group per strategy");
}

#[test]
fn scoped_recording_lands_as_parquet() {
    let parent = tempfile::tempdir().unwrap();

    let (run_dir, targets) = {
        let mut rec = instrument::ScopedRecorder::new(parent.path(), "Four teams, seed 6");
        let result = AuctionSetup::four_teams(6).run(catalog()).unwrap();

        let frames = rec.frames();
        let height = |target: &str| frames.get(target).map_or(0, |df| df.height());
        assert_eq!(height("settlement"), result.ledger.sold().count());
        assert_eq!(height("unsold"), result.ledger.unsold().count());
        let targets: Vec<String> = frames.keys().cloned().collect();

        (rec.run_dir().to_path_buf(), targets)
    };

    assert!(run_dir.starts_with(parent.path()));
    assert!(
        run_dir.to_string_lossy().ends_with("-four-teams--seed-6"),
        "run dir {} should carry the slugged name",
        run_dir.display()
    );
    assert!(targets.contains(&"unsold".to_string()), "Marquee is always unsold");
    for target in &targets {
        let file = run_dir.join(format!("{target}.parquet"));
        assert!(file.is_file(), "{} was not written", file.display());
    }
    assert!(run_dir.join("_ready").is_file(), "marker follows the tables");
}
