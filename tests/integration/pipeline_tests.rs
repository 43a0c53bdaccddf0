//! Integration tests for the extract, transform and load pipeline
//!
//! These tests use wiremock to stand in for the storefront and the
//! spreadsheet API, and run the whole pipeline end-to-end.

use serde_json::json;
use storefront_harvest::config::{DatabaseConfig, OutputConfig, ScraperConfig, SheetsConfig};
use storefront_harvest::crawler::crawl;
use storefront_harvest::output::SinkSet;
use storefront_harvest::transform::build_table;
use storefront_harvest::CrawlOutcome;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/service_account_key.pem");

fn product_card(title: &str, price: &str, rating: &str, colors: u32) -> String {
    format!(
        r#"<div class="collection-card">
            <div class="product-details">
                <h3 class="product-title">{title}</h3>
                <div class="price-container"><span class="price">{price}</span></div>
                <p style="font-size: 14px; color: #777;">Rating: ⭐ {rating} / 5</p>
                <p style="font-size: 14px; color: #777;">{colors} Colors</p>
                <p style="font-size: 14px; color: #777;">Size: M</p>
                <p style="font-size: 14px; color: #777;">Gender: Women</p>
            </div>
        </div>"#
    )
}

fn listing(cards: &[String]) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            r#"<html><body><div id="collectionList">{}</div></body></html>"#,
            cards.join("\n")
        ))
        .insert_header("content-type", "text/html")
}

fn scraper_config(base_url: String, end_page: u32, limit: usize) -> ScraperConfig {
    let mut config = ScraperConfig::new(base_url);
    config.end_page = end_page;
    config.limit = limit;
    config.timeout_secs = 5;
    config
}

async fn mount_storefront(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(listing(&[
            product_card("T-shirt 2", "$102.15", "3.9", 3),
            product_card("Unknown Product", "$100.00", "Invalid Rating", 5),
            product_card("Hoodie 3", "$496.88", "4.8", 3),
        ]))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(listing(&[
            product_card("Pants 4", "Price Unavailable", "4.0", 2),
            product_card("Outerwear 5", "$50.50", "4.5", 1),
        ]))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_pipeline_to_csv_and_sqlite() {
    let storefront = MockServer::start().await;
    mount_storefront(&storefront).await;

    // Page 3 is missing and must be skipped, not abort the crawl
    Mock::given(method("GET"))
        .and(path("/page3"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&storefront)
        .await;

    let report = crawl(scraper_config(storefront.uri(), 3, 1000))
        .await
        .expect("crawl should start");

    assert_eq!(report.outcome, CrawlOutcome::Exhausted);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.records.len(), 5);

    let table = build_table(&report.records);
    let titles: Vec<&str> = table.iter().map(|r| r.title()).collect();
    assert_eq!(titles, vec!["T-shirt 2", "Hoodie 3", "Outerwear 5"]);
    assert_eq!(table[0].price(), 1634400.0);
    assert_eq!(table[2].price(), 808000.0);
    assert_eq!(table[1].rating(), 4.8);
    assert_eq!(table[2].size(), "M");
    assert_eq!(table[2].gender(), "Women");

    let dir = TempDir::new().unwrap();
    let output = OutputConfig {
        csv_path: dir.path().join("products.csv").display().to_string(),
        raw_csv_path: None,
        sheets: None,
        database: Some(DatabaseConfig {
            uri: dir.path().join("products.db").display().to_string(),
            table_name: "fashion_products".to_string(),
        }),
    };

    let sinks = SinkSet::from_config(&output, reqwest::Client::new());
    let results = sinks.persist_all(&table).await;
    assert!(results.iter().all(|r| r.saved));

    let csv = std::fs::read_to_string(dir.path().join("products.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Title,Price,Rating,Colors,Size,Gender,timestamp");
    assert!(lines[1].starts_with("T-shirt 2,1634400.0,3.9,3,M,Women,"));
    assert_eq!(lines.len(), 4);

    let conn = rusqlite::Connection::open(dir.path().join("products.db")).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM fashion_products", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_limit_stops_before_next_page() {
    let storefront = MockServer::start().await;
    mount_storefront(&storefront).await;

    Mock::given(method("GET"))
        .and(path("/page3"))
        .respond_with(listing(&[product_card("Jacket 9", "$10.00", "4.0", 2)]))
        .expect(0)
        .mount(&storefront)
        .await;

    let report = crawl(scraper_config(storefront.uri(), 3, 4))
        .await
        .expect("crawl should start");

    assert_eq!(report.outcome, CrawlOutcome::LimitReached);
    assert_eq!(report.records.len(), 4);
    assert_eq!(report.records[3].title, "Pants 4");
}

#[tokio::test]
async fn test_unreachable_storefront_yields_no_records() {
    let storefront = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&storefront)
        .await;

    let report = crawl(scraper_config(storefront.uri(), 2, 1000))
        .await
        .expect("crawl should start");

    assert!(report.records.is_empty());
    assert_eq!(report.pages_fetched, 0);
    assert_eq!(report.outcome, CrawlOutcome::Exhausted);
    assert!(build_table(&report.records).is_empty());
}

#[tokio::test]
async fn test_empty_pages_stop_crawl() {
    let storefront = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(listing(&[product_card("Shirt 1", "$20.00", "4.1", 2)]))
        .mount(&storefront)
        .await;

    for page in ["/page2", "/page3"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(listing(&[]))
            .mount(&storefront)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/page4"))
        .respond_with(listing(&[product_card("Shirt 4", "$20.00", "4.1", 2)]))
        .expect(0)
        .mount(&storefront)
        .await;

    let mut config = scraper_config(storefront.uri(), 4, 1000);
    config.stop_after_empty_pages = Some(2);

    let report = crawl(config).await.expect("crawl should start");

    assert_eq!(report.outcome, CrawlOutcome::EmptyPageStop { page: 3 });
    assert_eq!(report.records.len(), 1);
}

#[tokio::test]
async fn test_sheets_sink_with_service_account() {
    let api = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.test",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&api)
        .await;

    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/sheet-42/values/Products:clear"))
        .and(header("authorization", "Bearer ya29.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&api)
        .await;

    Mock::given(method("PUT"))
        .and(path("/v4/spreadsheets/sheet-42/values/Products"))
        .and(query_param("valueInputOption", "RAW"))
        .and(header("authorization", "Bearer ya29.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updatedRows": 2})))
        .expect(1)
        .mount(&api)
        .await;

    let storefront = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(listing(&[product_card("Dress 7", "$35.00", "4.6", 4)]))
        .mount(&storefront)
        .await;

    let report = crawl(scraper_config(storefront.uri(), 1, 1000))
        .await
        .expect("crawl should start");
    let table = build_table(&report.records);
    assert_eq!(table.len(), 1);

    let dir = TempDir::new().unwrap();
    let key_path = dir.path().join("service_account.json");
    std::fs::write(
        &key_path,
        json!({
            "type": "service_account",
            "client_email": "harvest@test-project.iam.gserviceaccount.com",
            "private_key": TEST_PRIVATE_KEY,
            "token_uri": format!("{}/token", api.uri()),
        })
        .to_string(),
    )
    .unwrap();

    let output = OutputConfig {
        csv_path: dir.path().join("products.csv").display().to_string(),
        raw_csv_path: None,
        sheets: Some(SheetsConfig {
            credentials_path: key_path.display().to_string(),
            spreadsheet_id: "sheet-42".to_string(),
            sheet_name: "Products".to_string(),
            api_base: format!("{}/v4", api.uri()),
        }),
        database: None,
    };

    let sinks = SinkSet::from_config(&output, reqwest::Client::new());
    let results = sinks.persist_all(&table).await;

    let saved: Vec<(&str, bool)> = results.iter().map(|r| (r.name.as_str(), r.saved)).collect();
    assert_eq!(saved[1], ("Google Sheets", true));
    assert!(saved[0].1);
}
