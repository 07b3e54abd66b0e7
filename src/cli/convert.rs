use super::{ui, view};
use crate::core::Converter;
use anyhow::{Result, bail};
use std::io::Write;

/// One-shot conversion: mounts the view, waits for both fetches and prints
/// the rendered result. Fails when either fetch failed.
pub async fn run<W: Write>(converter: &mut Converter, out: &mut W) -> Result<()> {
    let spinner = ui::new_spinner("Fetching exchange rates...");
    let failures = converter.mount().await;
    spinner.finish_and_clear();

    writeln!(out, "{}", view::render(converter.state()))?;

    if let Some(failure) = failures.first() {
        bail!(failure.message());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConverterState;
    use crate::core::config::ConverterDefaults;
    use crate::providers::exchangerate_api::ExchangeRateApiProvider;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn converter(base_url: &str, amount: &str) -> Converter {
        let defaults = ConverterDefaults {
            amount: amount.to_string(),
            ..ConverterDefaults::default()
        };
        Converter::new(
            Arc::new(ExchangeRateApiProvider::new(base_url)),
            ConverterState::new(&defaults, "USD"),
        )
    }

    #[tokio::test]
    async fn test_convert_prints_result() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/USD"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"base": "USD", "rates": {"USD": 1, "EUR": 0.9}}"#),
            )
            .expect(2)
            .mount(&mock_server)
            .await;

        let mut converter = converter(&mock_server.uri(), "10");
        let mut out = Vec::new();
        run(&mut converter, &mut out).await.unwrap();

        let output = console::strip_ansi_codes(&String::from_utf8(out).unwrap()).to_string();
        assert!(output.contains("10 USD = 9.00 EUR"));
    }

    #[tokio::test]
    async fn test_convert_reports_unreachable_provider() {
        let mut converter = converter("http://127.0.0.1:9", "10");
        let mut out = Vec::new();
        let result = run(&mut converter, &mut out).await;

        assert!(result.is_err());
        assert!(!converter.state().is_loading());
        let output = console::strip_ansi_codes(&String::from_utf8(out).unwrap()).to_string();
        assert!(output.contains("Please try again later."));
        assert!(!output.contains(" = "));
    }
}
