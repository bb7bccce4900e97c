use std::fs;
use tracing::info;

mod test_utils {
    use chrono::NaiveDate;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Builds a Yahoo chart payload of daily bars starting at `first`.
    pub fn chart_response(currency: &str, first: NaiveDate, closes: &[f64]) -> String {
        let timestamps: Vec<String> = (0..closes.len())
            .map(|i| {
                (first + chrono::Days::new(i as u64))
                    .and_hms_opt(15, 0, 0)
                    .unwrap()
                    .and_utc()
                    .timestamp()
                    .to_string()
            })
            .collect();
        let closes: Vec<String> = closes.iter().map(|c| c.to_string()).collect();
        format!(
            r#"{{
                "chart": {{
                    "result": [{{
                        "meta": {{ "currency": "{currency}", "gmtoffset": 0 }},
                        "timestamp": [{}],
                        "indicators": {{
                            "quote": [{{ "close": [{}] }}],
                            "adjclose": [{{ "adjclose": [{}] }}]
                        }}
                    }}],
                    "error": null
                }}
            }}"#,
            timestamps.join(", "),
            closes.join(", "),
            closes.join(", ")
        )
    }

    pub async fn mount_symbol(server: &MockServer, symbol: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(format!("/v8/finance/chart/{symbol}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    pub fn write_config(dir: &std::path::Path, base_url: &str, assets: &[&str]) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let assets = assets
            .iter()
            .map(|a| format!("\"{a}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let config_content = format!(
            r#"
assets: [{assets}]
start: 2024-01-01
end: 2024-02-01
simulation:
  num_portfolios: 250
  seed: 17
  frontier_buckets: 5
providers:
  yahoo:
    base_url: {base_url}
"#
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }
}

fn start_date() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

#[test_log::test(tokio::test)]
async fn test_simulate_flow_with_mock() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_symbol(
        &mock_server,
        "AAPL",
        test_utils::chart_response("USD", start_date(), &[100.0, 101.0, 99.5, 102.0, 103.5, 102.8]),
    )
    .await;
    test_utils::mount_symbol(
        &mock_server,
        "MSFT",
        test_utils::chart_response("USD", start_date(), &[300.0, 297.0, 301.0, 305.0, 303.0, 306.5]),
    )
    .await;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), &["AAPL", "MSFT"]);
    let output_path = temp_dir.path().join("samples.json");

    let result = mvsim::run_command(
        mvsim::AppCommand::Simulate(mvsim::cli::SimulateOptions {
            num_portfolios: None,
            seed: None,
            output: Some(output_path.clone()),
        }),
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Simulate command failed with: {:?}",
        result.err()
    );

    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    info!(min_variance = %exported["min_variance"], "Exported simulation");

    let samples = exported["samples"].as_array().unwrap();
    assert_eq!(samples.len(), 250);
    let min_risk = samples
        .iter()
        .map(|s| s["risk"].as_f64().unwrap())
        .fold(f64::INFINITY, f64::min);
    assert_eq!(exported["min_variance"]["risk"].as_f64().unwrap(), min_risk);
    assert_eq!(exported["assets"], serde_json::json!(["AAPL", "MSFT"]));
}

#[test_log::test(tokio::test)]
async fn test_frontier_flow_with_mock() {
    let mock_server = wiremock::MockServer::start().await;
    for (symbol, closes) in [
        ("GGAL.BA", [500.0, 510.0, 495.0, 520.0, 530.0]),
        ("YPFD.BA", [8000.0, 7900.0, 8100.0, 8050.0, 8200.0]),
        ("PAMP.BA", [900.0, 905.0, 910.0, 890.0, 915.0]),
    ] {
        test_utils::mount_symbol(
            &mock_server,
            symbol,
            test_utils::chart_response("ARS", start_date(), &closes),
        )
        .await;
    }

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(
        temp_dir.path(),
        &mock_server.uri(),
        &["GGAL.BA", "YPFD.BA", "PAMP.BA"],
    );

    let result = mvsim::run_command(
        mvsim::AppCommand::Frontier(mvsim::cli::FrontierOptions::default()),
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Frontier command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_simulate_fails_on_unknown_symbol() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_symbol(
        &mock_server,
        "AAPL",
        test_utils::chart_response("USD", start_date(), &[100.0, 101.0, 102.0]),
    )
    .await;
    test_utils::mount_symbol(
        &mock_server,
        "DELISTED",
        r#"{"chart": {"result": [], "error": null}}"#.to_string(),
    )
    .await;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path =
        test_utils::write_config(temp_dir.path(), &mock_server.uri(), &["AAPL", "DELISTED"]);

    let result = mvsim::run_command(
        mvsim::AppCommand::Simulate(mvsim::cli::SimulateOptions::default()),
        Some(config_path.to_str().unwrap()),
    )
    .await;
    let err = result.expect_err("Simulation should fail for a missing symbol");
    assert!(err.to_string().contains("DELISTED"));
}

#[test_log::test(tokio::test)]
async fn test_simulate_rejects_zero_portfolios() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_symbol(
        &mock_server,
        "AAPL",
        test_utils::chart_response("USD", start_date(), &[100.0, 101.0, 102.0, 101.5]),
    )
    .await;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), &["AAPL"]);

    let result = mvsim::run_command(
        mvsim::AppCommand::Simulate(mvsim::cli::SimulateOptions {
            num_portfolios: Some(0),
            ..Default::default()
        }),
        Some(config_path.to_str().unwrap()),
    )
    .await;

    let err = result.expect_err("Zero portfolios should be rejected");
    let root = err
        .downcast_ref::<mvsim::core::MarkowitzError>()
        .expect("Root cause should be a core error");
    assert!(matches!(
        root,
        mvsim::core::MarkowitzError::InvalidParameter { .. }
    ));
}
