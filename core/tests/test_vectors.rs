//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and either the expected parse result or the expected error. Results are
//! compared as decoded values, not raw strings, so field order is irrelevant.

use std::num::NonZeroU32;

use plumifly_core::{
    BlogClient, GetPostOptions, HttpMethod, HttpRequest, HttpResponse, InstanceStore, ListFilter, PlumiflyConfig,
    PlumiflyError, Post, PostList, PostStatus,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> BlogClient {
    let store = InstanceStore::new();
    let instance = store
        .initialize(PlumiflyConfig::new("vector-key").with_base_url(BASE_URL))
        .unwrap();
    BlogClient::new(&instance)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        other => panic!("unknown method: {other}"),
    }
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");
}

fn simulated_response(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn check_error(name: &str, err: &PlumiflyError, expected: &Value) {
    assert_eq!(err.code().as_str(), expected["code"].as_str().unwrap(), "{name}: code");
    if let Some(message) = expected.get("message") {
        assert_eq!(err.message(), message.as_str().unwrap(), "{name}: message");
    }
    let status = expected["status"].as_u64().map(|s| s as u16);
    assert_eq!(err.status(), status, "{name}: status");
}

fn nonzero(value: &Value) -> Option<NonZeroU32> {
    value.as_u64().and_then(|n| NonZeroU32::new(n as u32))
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let raw = include_str!("../../test-vectors/list.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let filter = ListFilter {
            page: nonzero(&input["page"]),
            limit: nonzero(&input["limit"]),
            status: input
                .get("status")
                .map(|s| serde_json::from_value::<PostStatus>(s.clone()).unwrap()),
        };

        // Verify build
        let req = c.build_list_posts(&filter);
        check_request(name, &req, &case["expected_request"]);

        // Verify parse
        let result = c.parse_list_posts(simulated_response(case));
        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, &result.unwrap_err(), expected_error);
        } else {
            let list = result.unwrap();
            let expected: PostList = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(list, expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

#[test]
fn get_test_vectors() {
    let raw = include_str!("../../test-vectors/get.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();
        let options = GetPostOptions {
            preview: case["preview"].as_bool().unwrap(),
        };

        // Verify build
        let req = c.build_get_post(id, &options).unwrap();
        check_request(name, &req, &case["expected_request"]);

        // Verify parse
        let result = c.parse_get_post(simulated_response(case));
        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, &result.unwrap_err(), expected_error);
        } else {
            let post = result.unwrap();
            let expected: Post = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(post, expected, "{name}: parsed result");
        }
    }
}
