//! End-to-end tests: CSV ingestion through the demand pipeline.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Write as _;
use stockcast::config::PlannerConfig;
use stockcast::core::{GapPolicy, SalesFilter};
use stockcast::data::{SalesDataset, TransactionReader};
use stockcast::pipeline::{DemandPipeline, PlanRequest};
use stockcast::ForecastError;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Two years of synthetic orders with a weekend uplift and a December peak.
fn synthetic_csv(seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
    let products = [
        ("Furniture", "Chairs"),
        ("Furniture", "Tables"),
        ("Technology", "Phones"),
        ("Office Supplies", "Paper"),
    ];

    let mut csv = String::from("Row ID,Order Date,Category,Sub-Category,Sales\n");
    let mut id = 0;
    for day in 0..730 {
        let date = start + Duration::days(day);
        // Roughly one day in ten has no orders at all.
        if rng.gen_bool(0.1) {
            continue;
        }
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        let december = date.month() == 12;
        let orders = rng.gen_range(1..5);
        for _ in 0..orders {
            let (category, sub) = products[rng.gen_range(0..products.len())];
            let mut amount = rng.gen_range(20.0..120.0) + day as f64 * 0.05;
            if weekend {
                amount *= 1.4;
            }
            if december {
                amount *= 1.8;
            }
            id += 1;
            writeln!(
                csv,
                "{},{},{},{},{:.2}",
                id,
                date.format("%d/%m/%Y"),
                category,
                sub,
                amount
            )
            .unwrap();
        }
    }
    csv
}

fn dataset(seed: u64) -> SalesDataset {
    let rows = TransactionReader::new()
        .read(synthetic_csv(seed).as_bytes())
        .unwrap();
    SalesDataset::new(rows)
}

#[test]
fn csv_to_inventory_plan() {
    init_tracing();
    let data = dataset(7);
    assert_eq!(
        data.categories(),
        vec!["Furniture", "Office Supplies", "Technology"]
    );
    assert_eq!(
        data.sub_categories(Some("Furniture")),
        vec!["Chairs", "Tables"]
    );

    let pipeline = DemandPipeline::new(PlannerConfig::default()).unwrap();
    let request = PlanRequest::new(SalesFilter::from_selection("all", ["Chairs", "Phones"]), 30, 0.2);
    let report = pipeline.run(&data, &request).unwrap();

    let last = report.series.last_date().unwrap();
    let future = report.forecast.future();
    assert_eq!(future.len(), 30);
    assert_eq!(future[0].date, last + Duration::days(1));
    assert!(future.windows(2).all(|w| (w[1].date - w[0].date).num_days() == 1));

    for row in report.forecast.rows() {
        assert!(row.yhat_lower <= row.yhat && row.yhat <= row.yhat_upper);
    }
    for month in &report.inventory {
        assert!((month.safety_stock - 0.2 * month.estimated_demand).abs() < 1e-9);
        assert_eq!(month.ideal_stock, month.estimated_demand + month.safety_stock);
    }
    assert!(!report.inventory.is_empty() && report.inventory.len() <= 2);

    assert!(report.summary.total_sales > 0.0);
    assert_eq!(report.summary.safety_ratio, 0.2);
    assert!(report.accuracy.rmse.is_finite());
}

#[test]
fn seasonal_profiles_reflect_calendar_effects() {
    init_tracing();
    let data = dataset(11);
    let pipeline = DemandPipeline::default();
    let report = pipeline
        .run(&data, &PlanRequest::new(SalesFilter::all(), 90, 0.1))
        .unwrap();

    let saturday = report.weekly_profile.get(Weekday::Sat).unwrap();
    let wednesday = report.weekly_profile.get(Weekday::Wed).unwrap();
    assert!(saturday > wednesday);

    let december = report.yearly_profile.get(chrono::Month::December).unwrap();
    let june = report.yearly_profile.get(chrono::Month::June).unwrap();
    assert!(december > june);
}

#[test]
fn empty_sub_category_selection_is_no_data() {
    init_tracing();
    let data = dataset(3);
    let filter = SalesFilter::from_selection("Furniture", Vec::<String>::new());
    let err = DemandPipeline::default()
        .run(&data, &PlanRequest::new(filter, 30, 0.2))
        .unwrap_err();
    assert!(err.is_no_data());
    assert!(!err.is_input_validation());
}

#[test]
fn unknown_category_is_no_data() {
    let data = dataset(3);
    let filter = SalesFilter::all().with_category("Garden");
    let err = DemandPipeline::default()
        .run(&data, &PlanRequest::new(filter, 30, 0.2))
        .unwrap_err();
    assert!(matches!(err, ForecastError::InsufficientData { got: 0, .. }));
}

#[test]
fn zero_fill_covers_every_day() {
    let data = dataset(5);
    let config = PlannerConfig::default().with_gap_policy(GapPolicy::ZeroFill);
    let pipeline = DemandPipeline::new(config).unwrap();
    let report = pipeline
        .run(&data, &pipeline.default_request(SalesFilter::all()))
        .unwrap();

    let span = report.series.span_days() as usize + 1;
    assert_eq!(report.series.len(), span);
    assert_eq!(report.series.missing_dates(), 0);
    assert_eq!(report.forecast.future().len(), 90);
}

#[test]
fn new_data_is_never_served_a_stale_fit() {
    let pipeline = DemandPipeline::default();
    let filter = SalesFilter::all().with_category("Technology");

    let (_, first) = pipeline.fit(&dataset(1), &filter).unwrap();
    let (_, again) = pipeline.fit(&dataset(1), &filter).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &again));

    let (_, other) = pipeline.fit(&dataset(2), &filter).unwrap();
    assert!(!std::sync::Arc::ptr_eq(&first, &other));
    assert_eq!(pipeline.cache().len(), 2);
}

#[test]
fn pipeline_is_shareable_across_threads() {
    let data = dataset(9);
    let pipeline = DemandPipeline::default();

    std::thread::scope(|s| {
        for category in ["Furniture", "Technology", "Office Supplies"] {
            let pipeline = pipeline.clone();
            let data = data.clone();
            s.spawn(move || {
                let filter = SalesFilter::all().with_category(category);
                let report = pipeline
                    .run(&data, &PlanRequest::new(filter, 60, 0.3))
                    .unwrap();
                assert_eq!(report.forecast.future().len(), 60);
            });
        }
    });
    assert_eq!(pipeline.cache().len(), 3);
}

#[test]
fn malformed_dates_report_the_row() {
    let csv = "Order Date,Category,Sub-Category,Sales\n01/02/2018,Furniture,Chairs,10\n2018/13/45,Furniture,Chairs,5\n";
    let err = TransactionReader::new().read(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, ForecastError::InvalidDate { row: 2, .. }));
    assert!(err.is_input_validation());
}
