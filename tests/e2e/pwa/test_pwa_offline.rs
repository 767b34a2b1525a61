//! E2E Test: Offline Serving
//!
//! Cache-first serving with network and offline fallbacks:
//! 1. Precached assets never hit the network
//! 2. Misses go to the network and are not stored
//! 3. Offline navigations get the offline document
//! 4. Non-GET and cross-origin requests are left alone

#[cfg(test)]
mod tests {
    use pearl_e2e_tests::{run, PearlFixtures, TestHost};
    use pearl_sw::config::{OFFLINE_HTML, STATIC_ASSETS};
    use pearl_sw::{Destination, FetchOutcome, Method, NetworkError, Request};
    use pearl_sw::worker::ResponseSource;

    fn installed() -> TestHost {
        let mut host = TestHost::new();
        host.install(PearlFixtures::config());
        host.network.clear_log();
        host
    }

    #[test]
    fn test_precached_assets_skip_network() {
        let host = installed();
        for path in STATIC_ASSETS {
            let outcome = host.get(path);
            assert_eq!(outcome.source(), Some(ResponseSource::Cache), "{}", path);
        }
        assert_eq!(host.network.request_count(), 0);
    }

    #[test]
    fn test_cached_body_matches_network_body() {
        let host = installed();
        let outcome = host.get("/static/css/style.css");
        assert_eq!(
            outcome.response().unwrap().text(),
            Some(PearlFixtures::asset_body("/static/css/style.css").as_str())
        );
    }

    #[test]
    fn test_fragment_is_ignored_for_lookup() {
        let host = installed();
        let outcome = host.get("/#market");
        assert_eq!(outcome.source(), Some(ResponseSource::Cache));
    }

    #[test]
    fn test_miss_is_fetched_but_not_stored() {
        let host = installed();
        let outcome = host.get("/api/market/items");

        assert_eq!(outcome.source(), Some(ResponseSource::Network));
        assert_eq!(
            outcome.response().unwrap().content_type(),
            Some("application/json")
        );
        assert_eq!(host.caches.len("pearl-verse-v1"), STATIC_ASSETS.len());

        // Second request goes to the network again
        host.get("/api/market/items");
        assert_eq!(host.network.request_count(), 2);
    }

    #[test]
    fn test_http_errors_are_returned_as_is() {
        let host = installed();
        let outcome = host.get("/does-not-exist");
        assert_eq!(outcome.source(), Some(ResponseSource::Network));
        assert_eq!(outcome.response().unwrap().status, 404);
    }

    #[test]
    fn test_offline_navigation_gets_offline_page() {
        let host = installed();
        host.network.set_online(false);

        let outcome = host.navigate("/market");
        let response = outcome.response().unwrap();
        assert_eq!(outcome.source(), Some(ResponseSource::OfflineFallback));
        assert_eq!(response.status, 200);
        assert_eq!(response.header("content-type"), Some("text/html"));
        assert_eq!(response.body, OFFLINE_HTML.as_bytes());
    }

    #[test]
    fn test_offline_cached_navigation_still_served_from_cache() {
        let host = installed();
        host.network.set_online(false);

        let outcome = host.navigate("/");
        assert_eq!(outcome.source(), Some(ResponseSource::Cache));
        assert_eq!(
            outcome.response().unwrap().text(),
            Some(PearlFixtures::index_page().as_str())
        );
    }

    #[test]
    fn test_offline_subresource_fails() {
        let host = installed();
        host.network.set_online(false);

        let request = Request::get(PearlFixtures::url("/static/images/black-pearl.png"))
            .with_destination(Destination::Image);
        let outcome = run(host.registration.fetch(&request));
        assert_eq!(outcome, FetchOutcome::Failed(NetworkError::Offline));
    }

    #[test]
    fn test_non_get_is_not_intercepted() {
        let host = installed();
        for method in [Method::Post, Method::Put, Method::Delete, Method::Head] {
            let request = Request::get(PearlFixtures::url("/")).with_method(method);
            assert_eq!(run(host.registration.fetch(&request)), FetchOutcome::Passthrough);
        }
        assert_eq!(host.network.request_count(), 0);
    }

    #[test]
    fn test_cross_origin_is_not_intercepted() {
        let host = installed();
        for url in [
            "https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css",
            "http://localhost:5001/",
            "http://localhost:50000/static/css/style.css",
        ] {
            assert_eq!(
                run(host.registration.fetch(&Request::get(url))),
                FetchOutcome::Passthrough,
                "{}",
                url
            );
        }
        assert_eq!(host.network.request_count(), 0);
    }

    #[test]
    fn test_no_worker_no_interception() {
        let host = TestHost::new();
        assert_eq!(host.get("/"), FetchOutcome::Passthrough);
        assert_eq!(host.network.request_count(), 0);
    }
}
