use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fake::faker::address::en::{BuildingNumber, CityName, StateAbbr, StreetName, ZipCode};
use fake::Fake;
use homesense_core::{
    extract_query, generate_report, normalize, select_best, Analysis, CandidateRow, Client,
    ClientProfile, Database,
};
use rand::Rng;
use std::time::Duration;
use tokio::runtime::Runtime;

const LISTING_URL: &str =
    "https://www.zillow.com/homedetails/1616-N-2100-W-Provo-UT-84604/11901038_zpid/";

fn generate_fake_rows(count: usize) -> Vec<CandidateRow> {
    let mut rng = rand::thread_rng();
    let mut rows: Vec<CandidateRow> = (0..count)
        .map(|i| {
            let number: String = BuildingNumber().fake();
            let street: String = StreetName().fake();
            CandidateRow::new()
                .with("street", format!("{} {}", number, street))
                .with("city", CityName().fake::<String>())
                .with("state", StateAbbr().fake::<String>())
                .with("zip_code", ZipCode().fake::<String>())
                .with("list_price", rng.gen_range(50000.0..1000000.0))
                .with("beds", rng.gen_range(1..6) as i64)
                .with("sqft", rng.gen_range(600..5000) as i64)
                .with(
                    "property_url",
                    format!("https://www.zillow.com/homedetails/x/{}_zpid/", 20000000 + i),
                )
        })
        .collect();

    // The listing itself sits near the end so every row gets scored
    if let Some(last) = rows.last_mut() {
        last.insert("street", "1616 N 2100 W");
        last.insert("property_url", "https://www.zillow.com/homedetails/y/11901038_zpid/");
    }
    rows
}

fn bench_matching(c: &mut Criterion) {
    let query = extract_query(LISTING_URL).unwrap();

    let mut group = c.benchmark_group("matching");
    for size in [10, 100, 1000].iter() {
        let rows = generate_fake_rows(*size);
        group.bench_with_input(BenchmarkId::new("select_best", size), &rows, |b, rows| {
            b.iter(|| black_box(select_best(rows, &query).unwrap().index));
        });
        group.bench_with_input(BenchmarkId::new("select_and_normalize", size), &rows, |b, rows| {
            b.iter(|| black_box(normalize(select_best(rows, &query).unwrap().row)));
        });
    }
    group.finish();
}

fn bench_database_operations(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("database");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    let rows = generate_fake_rows(50);
    let listings: Vec<_> = rows.iter().map(normalize).collect();
    let profile = ClientProfile {
        income: 120000.0,
        monthly_debt: 500.0,
        savings: 50000.0,
        credit_score: 720,
    };

    for size in [10, 50].iter() {
        group.bench_with_input(BenchmarkId::new("save_analyses", size), size, |b, &size| {
            b.to_async(&rt).iter(|| async {
                let db = Database::in_memory().await.unwrap();
                let mut client = Client::new("bench", "Bench Client", profile.clone());
                db.create_client(&mut client).await.unwrap();
                let client_id = client.id.unwrap();

                for listing in listings.iter().take(size) {
                    let report = generate_report(&profile, listing, &[]);
                    let mut analysis =
                        Analysis::new("bench", client_id, LISTING_URL, listing.clone(), report);
                    black_box(db.save_analysis(&mut analysis).await.unwrap());
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_matching, bench_database_operations);
criterion_main!(benches);
