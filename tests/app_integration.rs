use std::fs;
use tracing::info;
use valtrack::core::config::AppConfig;
use valtrack::core::portfolio::PORTFOLIO_KEY;
use valtrack::core::{Portfolio, QuoteSource};
use valtrack::store::{DiskStore, KeyValueStore};

// Nothing listens on the discard port, so connections are refused at once.
const UNREACHABLE: &str = "http://127.0.0.1:9";

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_nse_mock_server(symbol: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/quote"))
            .and(query_param("symbol", symbol))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub async fn mount_symbol_list(mock_server: &MockServer, mock_response: &str) {
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(mock_server)
            .await;
    }

    /// Config with every provider pointed at `nse_base_url` or nowhere, and
    /// the portfolio stored under `data_path`.
    pub fn config_yaml(nse_base_url: &str, data_path: &std::path::Path) -> String {
        format!(
            r#"
providers:
  rapid_api:
    base_url: {unreachable}
  twelve_data:
    base_url: {unreachable}
  nse_tools:
    base_url: {nse_base_url}
request_timeout_secs: 2
retries: 0
data_path: "{data_path}"
"#,
            unreachable = super::UNREACHABLE,
            data_path = data_path.display()
        )
    }
}

const TCS_RESPONSE: &str = r#"{
    "data": {
        "companyName": "Tata Consultancy Services Ltd.",
        "lastPrice": 3850.5,
        "eps": "125.4",
        "high52": 4250.0,
        "low52": 3300.0,
        "marketCap": 14000000000000
    }
}"#;

#[test_log::test(tokio::test)]
async fn test_quote_command_with_mock() {
    let mock_server = test_utils::create_nse_mock_server("TCS", TCS_RESPONSE).await;
    let data_dir = tempfile::TempDir::new().expect("Failed to create temp dir");

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    fs::write(
        config_file.path(),
        test_utils::config_yaml(&mock_server.uri(), data_dir.path()),
    )
    .expect("Failed to write config file");

    let result = valtrack::run_command(
        valtrack::AppCommand::Quote("tcs".to_string()),
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Quote command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_quote_command_rejects_invalid_symbol() {
    let data_dir = tempfile::TempDir::new().unwrap();
    let config_file = tempfile::NamedTempFile::new().unwrap();
    fs::write(
        config_file.path(),
        test_utils::config_yaml(UNREACHABLE, data_dir.path()),
    )
    .unwrap();

    let result = valtrack::run_command(
        valtrack::AppCommand::Quote("x".to_string()),
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Invalid stock symbol"));
}

#[test_log::test(tokio::test)]
async fn test_portfolio_flow_with_mock() {
    let mock_server = test_utils::create_nse_mock_server("TCS", TCS_RESPONSE).await;
    let data_dir = tempfile::TempDir::new().expect("Failed to create temp dir");

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    fs::write(
        config_file.path(),
        test_utils::config_yaml(&mock_server.uri(), data_dir.path()),
    )
    .expect("Failed to write config file");
    let config_path = config_file.path().to_str().unwrap();

    for command in [
        valtrack::AppCommand::Add("TCS".to_string()),
        valtrack::AppCommand::Add("tcs".to_string()),
        valtrack::AppCommand::Add("ZZZZ".to_string()),
        valtrack::AppCommand::List,
        valtrack::AppCommand::Refresh,
        valtrack::AppCommand::Remove("zzzz".to_string()),
    ] {
        info!(?command, "Running command");
        let result = valtrack::run_command(command.clone(), Some(config_path)).await;
        assert!(
            result.is_ok(),
            "{command:?} failed with: {:?}",
            result.err()
        );
    }

    let store = DiskStore::open(data_dir.path()).unwrap();
    let saved = store.get(PORTFOLIO_KEY).await.unwrap().unwrap();
    let portfolio: Portfolio = serde_json::from_slice(&saved).unwrap();

    assert_eq!(portfolio.stocks.len(), 1);
    let tcs = &portfolio.stocks[0];
    assert_eq!(tcs.symbol, "TCS");
    assert_eq!(tcs.company_name, "Tata Consultancy Services Ltd.");
    assert_eq!(tcs.current_price, 3850.5);
    assert_eq!(tcs.pe_ratio, 30.71);
    assert_eq!(tcs.source, QuoteSource::Provider("NSETOOLS".to_string()));
}

#[test_log::test(tokio::test)]
async fn test_search_command_with_mock() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_symbol_list(
        &mock_server,
        r#"{"symbols": [{"symbol": "TCS", "name": "Tata Consultancy Services Ltd."}]}"#,
    )
    .await;
    let data_dir = tempfile::TempDir::new().unwrap();
    let config_file = tempfile::NamedTempFile::new().unwrap();
    fs::write(
        config_file.path(),
        test_utils::config_yaml(&mock_server.uri(), data_dir.path()),
    )
    .unwrap();

    let result = valtrack::run_command(
        valtrack::AppCommand::Search("tata".to_string()),
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Search command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_resolver_offline_with_corrections() {
    let data_dir = tempfile::TempDir::new().unwrap();
    let config_file = tempfile::NamedTempFile::new().unwrap();
    fs::write(
        config_file.path(),
        test_utils::config_yaml(UNREACHABLE, data_dir.path()),
    )
    .unwrap();
    let config = AppConfig::load_from_path(config_file.path()).unwrap();
    let resolver = valtrack::build_resolver(&config).unwrap();

    let symbols = vec![
        "HDFCBANK".to_string(),
        "NESTLEIND".to_string(),
        "ZZZZ".to_string(),
    ];
    let results = resolver.resolve_all(&symbols).await;
    assert_eq!(results.len(), 3);

    let hdfc = results[0].1.as_ref().unwrap();
    assert!(hdfc.is_synthesized());
    assert!(hdfc.corrected);
    assert_eq!(hdfc.pe_ratio, 19.5);
    assert!((hdfc.eps - hdfc.current_price / 19.5).abs() < 1e-9);

    let nestle = results[1].1.as_ref().unwrap();
    assert!(nestle.corrected);
    assert_eq!(nestle.high_52_week, 2778.0);
    assert_eq!(nestle.low_52_week, 2110.0);

    let other = results[2].1.as_ref().unwrap();
    assert!(other.is_synthesized());
    assert!(!other.corrected);

    // Served from cache, identical to the first answer.
    let again = resolver.resolve("hdfcbank").await.unwrap();
    assert_eq!(&again, hdfc);

    let matches = resolver.search("hdfc").await;
    assert!(matches.iter().any(|m| m.symbol == "HDFCBANK"));
}

#[test_log::test(tokio::test)]
async fn test_out_of_range_config_is_an_error() {
    let config_file = tempfile::NamedTempFile::new().unwrap();
    fs::write(config_file.path(), "cache_validity_hours: 9223372036854775807\n").unwrap();

    let result = valtrack::run_command(
        valtrack::AppCommand::Quote("TCS".to_string()),
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    let err = result.unwrap_err();
    assert!(
        format!("{err:#}").contains("cache_validity_hours"),
        "unexpected error: {err:#}"
    );
}
