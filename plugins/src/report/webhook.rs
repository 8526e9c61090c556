//! Report delivery by HTTP POST of `{subject, text, html}`.
//!
//! The bearer token is read from the environment variable named in config at
//! dispatch time; it is never stored in config or code.

use aic_core::api::{render_html, render_text, subject, ReportDispatcher, RunResult, WebhookReportConfig};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("webhook token env var {var} is not set")]
    MissingToken { var: String },
    #[error("webhook request to {url} timed out")]
    Timeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("webhook request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("webhook {url} returned {status}: {body}")]
    Status { url: String, status: u16, body: String },
}

impl WebhookError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn from_reqwest(source: reqwest::Error, url: &str) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            Self::Timeout { url, source }
        } else {
            Self::Transport { url, source }
        }
    }
}

fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    aic_core::util::truncate(trimmed, BODY_PREVIEW_LIMIT)
}

#[derive(Debug, Serialize)]
struct ReportPayload {
    subject: String,
    text: String,
    html: String,
}

pub struct WebhookReportDispatcher {
    url: String,
    token_env: Option<String>,
    http: reqwest::Client,
}

impl WebhookReportDispatcher {
    pub fn new(cfg: &WebhookReportConfig) -> anyhow::Result<Self> {
        if cfg.url.trim().is_empty() {
            anyhow::bail!("webhook report url is empty");
        }
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()?;
        Ok(Self {
            url: cfg.url.clone(),
            token_env: cfg.token_env.clone().filter(|v| !v.trim().is_empty()),
            http,
        })
    }

    fn token(&self) -> Result<Option<String>, WebhookError> {
        let Some(var) = &self.token_env else {
            return Ok(None);
        };
        match std::env::var(var) {
            Ok(v) if !v.trim().is_empty() => Ok(Some(v)),
            _ => Err(WebhookError::MissingToken { var: var.clone() }),
        }
    }
}

#[async_trait]
impl ReportDispatcher for WebhookReportDispatcher {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn dispatch(&self, result: &RunResult) -> anyhow::Result<()> {
        let payload = ReportPayload {
            subject: subject(result),
            text: render_text(result),
            html: render_html(result),
        };
        tracing::debug!(
            target: "aic.report",
            stage = "report.webhook.in",
            url = %self.url,
            session_id = %result.session_id,
            findings = result.sub_agent_findings.len()
        );

        let mut req = self.http.post(&self.url).json(&payload);
        if let Some(token) = self.token()? {
            req = req.bearer_auth(token);
        }
        let resp = req
            .send()
            .await
            .map_err(|err| WebhookError::from_reqwest(err, &self.url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WebhookError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
                body: preview_body(&body),
            }
            .into());
        }
        tracing::debug!(target: "aic.report", stage = "report.webhook.out", status = %status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use mockito::Server;
    use std::collections::BTreeMap;

    fn result() -> RunResult {
        RunResult {
            response: "Rollback abc".to_string(),
            session_id: "s-9".to_string(),
            elapsed_seconds: 4.2,
            event_count: 12,
            sub_agent_findings: BTreeMap::from([(
                "deploy_findings".to_string(),
                r#"{"summary":"risky"}"#.to_string(),
            )]),
        }
    }

    #[test]
    fn test_preview_body_empty() {
        assert_eq!(preview_body("   "), "<empty body>");
    }

    #[test]
    fn test_status_error_display() {
        let err = WebhookError::Status {
            url: "https://hooks.test/r".to_string(),
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "webhook https://hooks.test/r returned 502: bad gateway");
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_empty_url_is_rejected() {
        assert!(WebhookReportDispatcher::new(&WebhookReportConfig::new(" ")).is_err());
    }

    #[tokio::test]
    async fn test_posts_subject_and_bodies() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/report")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "subject": "[AIC] Incident Investigation Report - Session s-9"
            })))
            .with_status(202)
            .create_async()
            .await;

        let cfg = WebhookReportConfig::new(format!("{}/report", server.url()));
        let dispatcher = WebhookReportDispatcher::new(&cfg).unwrap();
        dispatcher.dispatch(&result()).await.unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_bearer_token_comes_from_env() {
        let var = "AIC_TEST_WEBHOOK_TOKEN_BEARER";
        std::env::set_var(var, "s3cret");
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/report")
            .match_header("authorization", "Bearer s3cret")
            .with_status(200)
            .create_async()
            .await;

        let mut cfg = WebhookReportConfig::new(format!("{}/report", server.url()));
        cfg.token_env = Some(var.to_string());
        WebhookReportDispatcher::new(&cfg)
            .unwrap()
            .dispatch(&result())
            .await
            .unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_sending() {
        let mut cfg = WebhookReportConfig::new("http://127.0.0.1:9/report");
        cfg.token_env = Some("AIC_TEST_WEBHOOK_TOKEN_UNSET".to_string());
        let err = WebhookReportDispatcher::new(&cfg)
            .unwrap()
            .dispatch(&result())
            .await
            .unwrap_err();
        let http = err.downcast_ref::<WebhookError>().unwrap();
        assert!(matches!(http, WebhookError::MissingToken { var } if var == "AIC_TEST_WEBHOOK_TOKEN_UNSET"));
        assert_eq!(http.status(), None);
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/report")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let cfg = WebhookReportConfig::new(format!("{}/report", server.url()));
        let err = WebhookReportDispatcher::new(&cfg)
            .unwrap()
            .dispatch(&result())
            .await
            .unwrap_err();
        let http = err.downcast_ref::<WebhookError>().unwrap();
        assert_eq!(http.status(), Some(503));
        assert!(err.to_string().contains("maintenance"));
    }
}
