use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use url::Url;

use super::{ApiError, CalculationBackend};
use crate::config::ApiConfig;
use crate::core::{CalculationRequest, CalculationResponse};

pub const CALCULATE_PATH: &str = "/jurosPosFixados/calcular-parcelas";
const DEFAULT_STATUS_MESSAGE: &str = "calculation request failed";

/// reqwest transport for the calculation service; one request per call.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    endpoint: Url,
    client: Client,
}

impl HttpBackend {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let endpoint = endpoint_url(&config.base_url)?;
        if config.accept_invalid_certs {
            log::warn!("TLS certificate verification disabled for {}", endpoint);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;
        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl CalculationBackend for HttpBackend {
    fn calculate(&self, request: &CalculationRequest) -> Result<CalculationResponse, ApiError> {
        log::info!(
            "POST {} ({} installments)",
            self.endpoint,
            request.installments.len()
        );
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        log::debug!("calculation service answered {}", status);

        if status.is_success() {
            let parsed: CalculationResponse =
                serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
            log::info!("received {} installments", parsed.installments.len());
            return Ok(parsed);
        }

        let message = extract_error_message(&body).unwrap_or_else(|| {
            if !body.trim().is_empty() {
                body.trim().to_string()
            } else if status.is_server_error() {
                "server error".to_string()
            } else {
                DEFAULT_STATUS_MESSAGE.to_string()
            }
        });
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

fn endpoint_url(base: &str) -> Result<Url, ApiError> {
    let joined = format!("{}{}", base.trim_end_matches('/'), CALCULATE_PATH);
    Url::parse(&joined).map_err(|e| ApiError::Endpoint(format!("{}: {}", joined, e)))
}

/// Pull a readable message out of common JSON error bodies
/// (`{"error":{"message"}}`, `{"message"}`, ASP.NET problem details `{"title"}`).
fn extract_error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok()?;

    if let Some(msg) = parsed
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(|message| message.as_str())
    {
        return Some(msg.to_string());
    }
    ["message", "title", "detail"]
        .iter()
        .find_map(|key| parsed.get(*key).and_then(|v| v.as_str()))
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::installment::Installment;
    use crate::core::InstallmentKind;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn config(url: &str) -> ApiConfig {
        ApiConfig {
            base_url: url.to_string(),
            timeout_secs: 2,
            accept_invalid_certs: false,
        }
    }

    fn request() -> CalculationRequest {
        CalculationRequest {
            cdi_rate: dec!(1),
            annual_spread: dec!(0.02),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            reference_date: NaiveDate::from_ymd_opt(2026, 4, 15).unwrap(),
            installments: vec![Installment {
                kind: InstallmentKind::Principal,
                principal: dec!(1000),
                due_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                settled: false,
            }],
        }
    }

    #[test]
    fn endpoint_appends_calculation_path() {
        assert_eq!(
            endpoint_url("https://localhost:7018/api").unwrap().as_str(),
            "https://localhost:7018/api/jurosPosFixados/calcular-parcelas"
        );
        assert_eq!(
            endpoint_url("http://host/api/").unwrap().as_str(),
            "http://host/api/jurosPosFixados/calcular-parcelas"
        );
        assert!(endpoint_url("not a url").is_err());
    }

    #[test]
    fn posts_request_and_parses_results() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", CALCULATE_PATH)
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::PartialJson(serde_json::json!({
                    "percentualCdi": 1.0,
                    "dataInicial": "2026-01-01",
                    "dataReferencia": "2026-04-15"
                })),
                mockito::Matcher::Regex(r#""vencimento":"2026-02-01""#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"parcelas":[{"tipo":0,"valorPrincipal":1000.0,"valorJuros":0.0,
                    "vencimento":"2026-02-01T00:00:00","liquidada":false}]}"#,
            )
            .expect(1)
            .create();

        let backend = HttpBackend::new(&config(&server.url())).unwrap();
        let response = backend.calculate(&request()).unwrap();

        assert_eq!(response.installments.len(), 1);
        assert_eq!(response.installments[0].principal, dec!(1000));
        mock.assert();
    }

    #[test]
    fn surfaces_problem_details_title() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", CALCULATE_PATH)
            .with_status(400)
            .with_header("content-type", "application/problem+json")
            .with_body(r#"{"title":"One or more validation errors occurred.","status":400}"#)
            .create();

        let backend = HttpBackend::new(&config(&server.url())).unwrap();
        match backend.calculate(&request()).unwrap_err() {
            ApiError::Status { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "One or more validation errors occurred.");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn server_error_without_body() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("POST", CALCULATE_PATH).with_status(500).create();

        let backend = HttpBackend::new(&config(&server.url())).unwrap();
        match backend.calculate(&request()).unwrap_err() {
            ApiError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "server error");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", CALCULATE_PATH)
            .with_status(200)
            .with_body(r#"{"parcelas": "nope"}"#)
            .create();

        let backend = HttpBackend::new(&config(&server.url())).unwrap();
        assert!(matches!(
            backend.calculate(&request()),
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn nested_error_message_wins() {
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"CDI series unavailable"}}"#),
            Some("CDI series unavailable".to_string())
        );
        assert_eq!(
            extract_error_message(r#"{"message":"bad dates"}"#),
            Some("bad dates".to_string())
        );
        assert_eq!(extract_error_message("plain text"), None);
        assert_eq!(extract_error_message("  "), None);
    }

    #[test]
    fn refused_connection_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let backend = HttpBackend::new(&config(&url)).unwrap();
        assert!(matches!(
            backend.calculate(&request()),
            Err(ApiError::Transport(_))
        ));
    }

    #[test]
    fn truncated_body_is_a_transport_error() {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 500\r\n\r\n{\"parcelas\":",
            );
            let _ = stream.flush();
        });

        let backend = HttpBackend::new(&config(&url)).unwrap();
        let result = backend.calculate(&request());
        server.join().unwrap();
        assert!(
            matches!(result, Err(ApiError::Transport(_))),
            "unexpected result: {:?}",
            result
        );
    }

    #[test]
    fn builds_client_that_accepts_invalid_certs() {
        let backend = HttpBackend::new(&ApiConfig {
            accept_invalid_certs: true,
            ..config("https://localhost:7018/api")
        })
        .unwrap();
        assert_eq!(
            backend.endpoint().as_str(),
            "https://localhost:7018/api/jurosPosFixados/calcular-parcelas"
        );
    }
}
