//! Clients with different options never see each other's endpoints.

use std::sync::Arc;

use sheetconv::endpoint::PayloadKind;
use sheetconv::{Client, ConversionOptions, Format, InternalIds, Layout, View};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{client, fast_config};

#[test]
fn test_constructing_clients_does_not_change_earlier_endpoints() {
    let json = Client::new_json("XLSX", "Hierarchy", "Auto", "Both", "k").unwrap();
    let before = json.endpoint().clone();

    let _xml = Client::new_xml("XLS", "Plain", "Portrait", "None", "k").unwrap();
    let _other_json = Client::new_json("XLS", "Both", "Landscape", "None", "k").unwrap();

    assert_eq!(json.endpoint(), &before);
    assert!(json.endpoint().url().contains("/ConvertJsonRaw?"));
    assert!(json.endpoint().url().contains("format=XLSX"));
}

#[test]
fn test_xml_client_does_not_leak_into_json_client() {
    let xml = Client::new_xml("XLS", "Plain", "Portrait", "None", "k").unwrap();
    let json = Client::new_json("XLSX", "Hierarchy", "Portrait", "Both", "k").unwrap();

    assert!(xml.endpoint().url().contains("/ConvertXmlRaw?"));
    assert!(xml.endpoint().url().contains("layout=Portrait"));
    assert!(json.endpoint().url().contains("/ConvertJsonRaw?"));
    assert!(json.endpoint().url().contains("layout=Auto"));
    assert!(json.endpoint().url().contains("format=XLSX"));
}

#[test]
fn test_parallel_construction_yields_own_endpoints() {
    let handles: Vec<_> = Format::ALL
        .iter()
        .flat_map(|f| View::ALL.iter().map(move |v| (*f, *v)))
        .map(|(format, view)| {
            std::thread::spawn(move || {
                let client = Client::new_xml(
                    format.as_str(),
                    view.as_str(),
                    "Landscape",
                    "None",
                    "k",
                )
                .unwrap();
                (format, view, client.endpoint().url().to_string())
            })
        })
        .collect();

    for handle in handles {
        let (format, view, url) = handle.join().unwrap();
        assert!(url.contains(&format!("format={format}&")), "{url}");
        assert!(url.contains(&format!("view={view}&")), "{url}");
    }
}

#[tokio::test]
async fn test_concurrent_clients_hit_their_own_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ConvertJsonRaw"))
        .and(query_param("format", "XLSX"))
        .respond_with(ResponseTemplate::new(200).set_body_string("json-xlsx"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/ConvertXmlRaw"))
        .and(query_param("format", "XLS"))
        .and(query_param("layout", "Portrait"))
        .respond_with(ResponseTemplate::new(200).set_body_string("xml-xls"))
        .mount(&server)
        .await;

    let json = Arc::new(client(
        PayloadKind::Json,
        ConversionOptions::default(),
        fast_config(&server.uri(), 1),
    ));
    let xml = Arc::new(client(
        PayloadKind::Xml,
        ConversionOptions::new(Format::Xls, View::Plain, Layout::Portrait, InternalIds::Neither),
        fast_config(&server.uri(), 1),
    ));

    let mut tasks = Vec::new();
    for i in 0..10 {
        let json = Arc::clone(&json);
        let xml = Arc::clone(&xml);
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                json.convert_json("{}").await
            } else {
                xml.convert_xml("<a/>").await
            }
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        let bytes = task.await.unwrap().unwrap();
        let expected: &[u8] = if i % 2 == 0 { b"json-xlsx" } else { b"xml-xls" };
        assert_eq!(bytes, expected);
    }
}
