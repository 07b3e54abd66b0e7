use tracing::{error, info};

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(base: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let url_path = format!("/v4/latest/{base}");

        Mock::given(method("GET"))
            .and(path(&url_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(base_url: &str) -> tempfile::NamedTempFile {
        write_config_with_list_base(base_url, "USD")
    }

    pub fn write_config_with_list_base(
        base_url: &str,
        list_base: &str,
    ) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
            providers:
              exchangerate:
                base_url: {base_url}
            currency_list_base: "{list_base}"
            defaults:
              source: "USD"
              target: "EUR"
              amount: "1"
        "#
        );
        std::fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

const USD_RATES: &str = r#"
{
    "provider": "https://www.exchangerate-api.com",
    "base": "USD",
    "date": "2026-10-17",
    "rates": {
        "USD": 1,
        "EUR": 0.9,
        "GBP": 0.8,
        "JPY": 149.85
    }
}"#;

#[test_log::test(tokio::test)]
async fn test_full_convert_flow_with_mock() {
    let mock_server = test_utils::create_mock_server("USD", USD_RATES).await;
    let config_file = test_utils::write_config(&mock_server.uri());

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: Some("10".to_string()),
            from: None,
            to: Some("gbp".to_string()),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Convert command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_full_currencies_flow_with_mock() {
    let mock_server = test_utils::create_mock_server("USD", USD_RATES).await;
    let config_file = test_utils::write_config(&mock_server.uri());

    let result = fxconv::run_command(
        fxconv::AppCommand::Currencies,
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Currencies command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_convert_flow_with_unreachable_provider() {
    let config_file = test_utils::write_config("http://127.0.0.1:9");

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: Some("10".to_string()),
            from: None,
            to: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    let err = result.expect_err("Convert should fail when rates are unreachable");
    assert!(err.to_string().ends_with("Please try again later."));
}

#[test_log::test(tokio::test)]
async fn test_convert_flow_fails_when_only_currency_list_fails() {
    // Conversion base USD is served, the GBP list base gets a 404
    let mock_server = test_utils::create_mock_server("USD", USD_RATES).await;
    let config_file = test_utils::write_config_with_list_base(&mock_server.uri(), "GBP");

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: Some("10".to_string()),
            from: None,
            to: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    let err = result.expect_err("Convert should fail when the currency list fails");
    assert_eq!(
        err.to_string(),
        "Failed to fetch currencies. Please try again later."
    );
}

#[test_log::test(tokio::test)]
async fn test_convert_flow_with_zero_amount_skips_conversion() {
    let mock_server = test_utils::create_mock_server("USD", USD_RATES).await;
    let config_file = test_utils::write_config(&mock_server.uri());

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: Some("0".to_string()),
            from: None,
            to: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Convert failed with: {:?}", result.err());

    // Only the currency list was fetched
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_fails() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let missing = dir.path().join("missing.yaml");

    let result = fxconv::run_command(
        fxconv::AppCommand::Currencies,
        Some(missing.to_str().unwrap()),
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
#[ignore = "hits the public exchange rate API"]
async fn test_real_exchangerate_api() {
    use fxconv::core::RateProvider;
    use fxconv::providers::exchangerate_api::ExchangeRateApiProvider;

    let provider = ExchangeRateApiProvider::new("https://api.exchangerate-api.com");

    let base = "USD";
    info!(?base, "Fetching rate table from exchangerate-api");

    match provider.fetch_rates(base).await {
        Ok(table) => {
            info!(count = table.len(), "Received rate table");
            assert!(table.rate("EUR").is_some_and(|r| r > 0.0));
            assert_eq!(table.rate("USD"), Some(1.0));
        }
        Err(e) => {
            error!("Rate API request failed: {e}\n{e:?}");
            panic!("Rate API request failed: {e}");
        }
    }
}
