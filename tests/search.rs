use landsat_stac::{blocking, Client, Error, SearchConfig, SearchFilter, SearchProfile};
use mockito::{Matcher, Server};
use serde_json::{json, Value};

const ITEM: &str = include_str!("fixtures/LC09_L1TP_116050_20220512_20220512_02_T1.json");

fn feature(id: &str, cloud_cover: f64) -> Value {
    json!({
        "type": "Feature",
        "id": id,
        "collection": "landsat-c2l1",
        "properties": {
            "eo:cloud_cover": cloud_cover,
            "landsat:wrs_path": "116",
            "landsat:wrs_row": "050"
        },
        "assets": {
            "red": {
                "href": format!("https://landsatlook.usgs.gov/data/collection02/level-1/{id}/{id}_B4.TIF"),
                "eo:bands": [{ "name": "B4", "common_name": "red" }]
            }
        }
    })
}

fn page(features: Vec<Value>, next: Option<Value>) -> String {
    let mut links = vec![json!({ "rel": "root", "href": "https://landsatlook.usgs.gov/stac-server" })];
    links.extend(next);
    json!({
        "type": "FeatureCollection",
        "features": features,
        "links": links,
        "context": { "matched": 3 }
    })
    .to_string()
}

fn config(server: &Server) -> SearchConfig {
    SearchConfig::with_endpoint(&format!("{}/search", server.url())).unwrap()
}

#[tokio::test]
async fn test_two_pages_with_merged_post_body() {
    let mut server = Server::new_async().await;
    let next = json!({
        "rel": "next",
        "href": format!("{}/search/next", server.url()),
        "method": "POST",
        "body": { "next": "token-2" },
        "merge": true
    });
    let first = server
        .mock("POST", "/search")
        .match_body(Matcher::PartialJson(json!({
            "collections": ["landsat-c2l1"],
            "query": { "landsat:wrs_path": { "eq": "116" } }
        })))
        .with_header("content-type", "application/geo+json")
        .with_body(page(vec![feature("a", 1.0), feature("b", 2.0)], Some(next)))
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("POST", "/search/next")
        .match_body(Matcher::PartialJson(json!({
            "collections": ["landsat-c2l1"],
            "query": { "landsat:wrs_path": { "eq": "116" } },
            "next": "token-2"
        })))
        .with_body(page(vec![feature("c", 3.0)], None))
        .expect(1)
        .create_async()
        .await;

    let filter = SearchFilter::builder().wrs_path("116").build().unwrap();
    let client = Client::new(config(&server)).unwrap();
    let results = client.search(&filter).await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(results.pages, 2);
    assert_eq!(results.number_matched, Some(3));
    assert_eq!(results.query, filter.query());
    let ids: Vec<&str> = results
        .features
        .iter()
        .map(|f| f["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_get_next_link() {
    let mut server = Server::new_async().await;
    let next = json!({ "rel": "next", "href": format!("{}/search/page/2", server.url()) });
    let first = server
        .mock("POST", "/search")
        .with_body(page(vec![feature("a", 1.0)], Some(next)))
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/search/page/2")
        .with_body(page(vec![feature("b", 1.0)], None))
        .expect(1)
        .create_async()
        .await;

    let client = Client::new(config(&server)).unwrap();
    let collection = client
        .search_collection(&SearchFilter::default())
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(collection.ids(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_max_pages() {
    let mut server = Server::new_async().await;
    let next = json!({ "rel": "next", "href": format!("{}/search/page/2", server.url()) });
    let first = server
        .mock("POST", "/search")
        .with_body(page(vec![feature("a", 1.0)], Some(next)))
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/search/page/2")
        .with_body(page(vec![feature("b", 1.0)], None))
        .expect(0)
        .create_async()
        .await;

    let mut config = config(&server);
    config.max_pages = Some(1);
    let results = Client::new(config)
        .unwrap()
        .search(&SearchFilter::default())
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(results.pages, 1);
    assert_eq!(results.features.len(), 1);
}

#[tokio::test]
async fn test_cloud_cover_filter() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/search")
        .match_body(Matcher::PartialJson(json!({
            "query": { "eo:cloud_cover": { "lte": 20.0 } }
        })))
        .with_body(page(
            vec![feature("a", 0.0), feature("b", 12.5), feature("c", 20.0)],
            None,
        ))
        .expect(1)
        .create_async()
        .await;

    let filter = SearchFilter::builder().cloud_cover_max(20.0).build().unwrap();
    let client = Client::new(config(&server)).unwrap();
    let collection = client.search_collection(&filter).await.unwrap();

    mock.assert_async().await;
    assert_eq!(collection.len(), 3);
    for scene in &collection {
        assert!(scene.cloud_cover().unwrap() <= 20.0);
    }
}

#[tokio::test]
async fn test_error_status() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/search")
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;

    let client = Client::new(config(&server)).unwrap();
    let err = client.search(&SearchFilter::default()).await.unwrap_err();
    assert!(err.is_request());
    match err {
        Error::Status { status, body, .. } => {
            assert_eq!(status.as_u16(), 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("expected status error, got {other}"),
    }
}

#[tokio::test]
async fn test_malformed_second_page_discards_results() {
    let mut server = Server::new_async().await;
    let next = json!({ "rel": "next", "href": format!("{}/search/page/2", server.url()) });
    let _first = server
        .mock("POST", "/search")
        .with_body(page(vec![feature("a", 1.0)], Some(next)))
        .create_async()
        .await;
    let _second = server
        .mock("GET", "/search/page/2")
        .with_body(r#"{"type": "FeatureCollection", "links": []}"#)
        .create_async()
        .await;

    let client = Client::new(config(&server)).unwrap();
    let err = client.search(&SearchFilter::default()).await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }), "{err}");
    assert!(!err.is_request());
}

#[tokio::test]
async fn test_malformed_record_is_skipped() {
    let mut server = Server::new_async().await;
    let broken = json!({ "id": "broken", "properties": {} });
    let _mock = server
        .mock("POST", "/search")
        .with_body(page(vec![feature("a", 1.0), broken, feature("c", 1.0)], None))
        .create_async()
        .await;

    let client = Client::new(config(&server)).unwrap();
    let collection = client
        .search_collection(&SearchFilter::default())
        .await
        .unwrap();
    assert_eq!(collection.ids(), vec!["a", "c"]);
    assert_eq!(collection.skipped()[0].index, 1);
}

#[tokio::test]
async fn test_fixture_item() {
    let mut server = Server::new_async().await;
    let item: Value = serde_json::from_str(ITEM).unwrap();
    let _mock = server
        .mock("POST", "/search")
        .with_body(page(vec![item], None))
        .create_async()
        .await;

    let filter = SearchFilter::builder()
        .scene_id("LC91160502022132LGN00")
        .build()
        .unwrap();
    let client = Client::new(config(&server)).unwrap();
    let collection = client.search_collection(&filter).await.unwrap();
    assert_eq!(collection.scene_ids(), vec!["LC91160502022132LGN00"]);
    assert_eq!(
        collection[0].s3_tiff_paths()["B4"],
        "s3://usgs-landsat/collection02/level-1/standard/oli-tirs/2022/116/050/LC09_L1TP_116050_20220512_20220512_02_T1/LC09_L1TP_116050_20220512_20220512_02_T1_B4.TIF"
    );
}

#[test]
fn test_blocking_client_with_profile() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/search")
        .match_body(Matcher::PartialJson(json!({
            "collections": ["landsat-c2l1"],
            "limit": 100,
            "datetime": "2022-01-01T00:00:00Z/2022-12-31T23:59:59Z"
        })))
        .with_body(page(vec![feature("a", 5.0)], None))
        .expect(1)
        .create();

    let mut profile =
        SearchProfile::from_template(&landsat_stac::config::landsat_c2l1_template()).unwrap();
    profile.config = config(&server);
    let client = blocking::Client::new(profile.config.clone()).unwrap();
    let collection = client.search_collection(&profile.filter).unwrap();

    mock.assert();
    assert_eq!(collection.len(), 1);
    assert_eq!(collection[0].wrs_row(), Some("050"));
}
