//! # Integration Tests
//!
//! End-to-end flows across crates:
//! - configuration -> routes -> dispatcher -> mocked HTTP backends
//! - environment topology with endpoint failover

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use bytes::Bytes;
    use config_loader::{ConfigFormat, ConfigLoader};
    use delivery::{ClientConfig, DeliveryClient};
    use dispatcher::{build_routes, DispatchSummary, Dispatcher, DispatcherConfig, StopReason};
    use ingestion::ChannelSource;
    use tokio::sync::watch;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    fn dead_endpoint() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr.to_string()
    }

    async fn expect_puts(server: &MockServer, path: &str, status: u16, calls: u64) {
        Mock::given(matchers::method("POST"))
            .and(matchers::path(path))
            .respond_with(ResponseTemplate::new(status))
            .expect(calls)
            .mount(server)
            .await;
    }

    async fn relay(blueprint: &contracts::RelayBlueprint, records: usize) -> DispatchSummary {
        let client = DeliveryClient::new(ClientConfig::from(&blueprint.http)).unwrap();
        let routes = build_routes(&blueprint.routes, &client).unwrap();

        let (tx, source) = ChannelSource::channel("e2e", records.max(1));
        for i in 0..records {
            tx.send(Bytes::from(format!("[{{\"metric\":\"m\",\"value\":{i}}}]")))
                .await
                .unwrap();
        }
        drop(tx);

        let config = DispatcherConfig {
            poll_timeout: Duration::from_millis(50),
            max_records: None,
        };
        Dispatcher::new(source, routes, config, watch::channel(false).1)
            .run()
            .await
            .unwrap()
    }

    /// Two sampled routes over one record stream
    ///
    /// Ratios 3 and 5 over 15 records forward 5 and 3 records; the payload
    /// is forwarded byte-for-byte with the configured headers.
    #[tokio::test]
    async fn test_e2e_sampled_routes_from_toml() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/short/api/put"))
            .and(matchers::header("Content-Encoding", "gzip"))
            .respond_with(ResponseTemplate::new(204))
            .expect(5)
            .mount(&server)
            .await;
        expect_puts(&server, "/long/api/put", 400, 3).await;

        let toml = format!(
            r#"
[source]
kind = "stdin"

[[routes]]
name = "short_term"
discard_ratio = 3

[[routes.destinations]]
name = "open_tsdb_short_term"
endpoints = ["{addr}/short"]
path = "/api/put"
headers = ["Content-Encoding: gzip"]
accept_statuses = [204, 400]

[[routes]]
name = "long_term"
discard_ratio = 5

[[routes.destinations]]
name = "open_tsdb_long_term"
endpoints = ["{addr}/long"]
path = "/api/put"
accept_statuses = [204, 400]
"#,
            addr = server.address()
        );
        let blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();

        let summary = relay(&blueprint, 15).await;

        assert_eq!(summary.stop_reason, StopReason::SourceClosed);
        assert_eq!(summary.records, 15);

        let (name, short) = &summary.routes[0];
        assert_eq!(name, "short_term");
        assert_eq!(short.forwarded, 5);
        assert_eq!(short.delivered, 5);

        let (_, long) = &summary.routes[1];
        assert_eq!(long.forwarded, 3);
        assert_eq!(long.delivered, 3);
        assert_eq!(long.failed, 0);

        let first = &server.received_requests().await.unwrap()[0];
        assert_eq!(first.body, br#"[{"metric":"m","value":2}]"#.to_vec());
    }

    /// Environment topology with a dead endpoint in every destination
    ///
    /// Round-robin plus failover still delivers every record exactly once
    /// per destination.
    #[tokio::test]
    async fn test_e2e_env_topology_fails_over() {
        let bosun = MockServer::start().await;
        expect_puts(&bosun, "/api/put", 204, 4).await;
        expect_puts(&bosun, "/api/metadata/put", 204, 4).await;

        let legacy = MockServer::start().await;
        expect_puts(&legacy, "/api/put", 204, 2).await;
        let long_term = MockServer::start().await;
        expect_puts(&long_term, "/api/put", 204, 2).await;

        let vars = HashMap::from([
            ("KAFKA_BROKER", "localhost:9092".to_string()),
            ("KAFKA_CONSUMER_GROUP", "relay".to_string()),
            ("KAFKA_TOPIC", "metrics".to_string()),
            (
                "OPEN_TSDB_BOSUN_URL",
                format!("{},{}", dead_endpoint(), bosun.address()),
            ),
            ("OPEN_TSDB_LEGACY_URL", legacy.address().to_string()),
            ("OPEN_TSDB_LONG_TERM_URL", long_term.address().to_string()),
            ("OPEN_TSDB_LONG_TERM_DISCARD_RATIO", "2".to_string()),
        ]);
        let blueprint = ConfigLoader::load_from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(blueprint.routes.len(), 2);

        let summary = relay(&blueprint, 4).await;

        let routes: HashMap<_, _> = summary.routes.iter().cloned().collect();
        assert_eq!(routes["bosun"].delivered, 8);
        assert_eq!(routes["bosun"].failed, 0);
        assert_eq!(routes["long_term"].forwarded, 2);
        assert_eq!(routes["long_term"].delivered, 4);
    }

    /// A rejecting backend loses records for that destination only
    #[tokio::test]
    async fn test_e2e_rejection_is_isolated() {
        let failing = MockServer::start().await;
        expect_puts(&failing, "/api/put", 500, 3).await;
        let healthy = MockServer::start().await;
        expect_puts(&healthy, "/api/put", 204, 3).await;

        let json = format!(
            r#"{{
  "source": {{ "kind": "stdin" }},
  "routes": [
    {{
      "name": "both",
      "destinations": [
        {{ "name": "failing", "endpoints": ["{failing}"], "path": "/api/put" }},
        {{ "name": "healthy", "endpoints": ["{healthy}"], "path": "/api/put" }}
      ]
    }}
  ]
}}"#,
            failing = failing.address(),
            healthy = healthy.address()
        );
        let blueprint = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();

        let summary = relay(&blueprint, 3).await;

        let (_, both) = &summary.routes[0];
        assert_eq!(both.forwarded, 3);
        assert_eq!(both.delivered, 3);
        assert_eq!(both.failed, 3);
        assert_eq!(summary.delivery_latency_ms.count, 3);
    }
}
