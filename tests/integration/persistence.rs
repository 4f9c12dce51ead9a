use homesense_core::{generate_report, Analysis, CandidateRow, Client, ClientProfile, Database};
use homesense_scrapers::{SearchOracle, SnapshotOracle};
use tempfile::tempdir;

#[tokio::test]
async fn test_analysis_saved_and_reloaded_from_file() {
    let temp_dir = tempdir().unwrap();
    let db_path = temp_dir.path().join("data").join("homesense.db");

    let client_id = {
        let db = Database::new(&db_path).await.unwrap();
        let mut client = Client::new(
            "realtor-1",
            "Dana Reyes",
            ClientProfile {
                income: 150000.0,
                monthly_debt: 800.0,
                savings: 90000.0,
                credit_score: 760,
            },
        );
        db.create_client(&mut client).await.unwrap();

        let oracle = SnapshotOracle::new(vec![CandidateRow::new()
            .with("street", "1616 N 2100 W")
            .with("city", "Provo")
            .with("state", "UT")
            .with("zip_code", "84604")
            .with("list_price", 425000.0)]);
        let url = "https://www.zillow.com/homedetails/1616-N-2100-W-Provo-UT-84604/11901038_zpid/";
        let lookup = oracle.lookup_listing(url).await.unwrap();
        let comps = oracle.area_comps("Provo", "UT", 5).await;
        let report = generate_report(&client.profile, &lookup.listing, &comps);

        let mut analysis = Analysis::new("realtor-1", client.id.unwrap(), url, lookup.listing, report);
        db.save_analysis(&mut analysis).await.unwrap();
        client.id.unwrap()
    };

    // Reopening applies no migrations twice and sees the saved rows
    let db = Database::new(&db_path).await.unwrap();
    let clients = db.list_clients("realtor-1").await.unwrap();
    assert_eq!(clients.len(), 1);

    let analyses = db.list_analyses("realtor-1", client_id, Some(10)).await.unwrap();
    assert_eq!(analyses.len(), 1);
    assert_eq!(analyses[0].listing.city, "Provo");
    assert!(analyses[0].listing.tax_estimated);
    assert!(analyses[0].result.report_markdown.contains("1616 N 2100 W"));
}

#[tokio::test]
async fn test_clients_listed_newest_first() {
    let db = Database::in_memory().await.unwrap();

    for name in ["First", "Second", "Third"] {
        let mut client = Client::new("realtor-1", name, ClientProfile::default());
        db.create_client(&mut client).await.unwrap();
    }
    let mut other = Client::new("realtor-2", "Elsewhere", ClientProfile::default());
    db.create_client(&mut other).await.unwrap();

    let names: Vec<String> = db
        .list_clients("realtor-1")
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Third", "Second", "First"]);
}
