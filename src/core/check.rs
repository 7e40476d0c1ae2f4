use crate::config::suite_config::CheckDefinition;
use crate::core::context::RunContext;
use crate::core::expect::{Assertion, ResponseView};
use crate::core::sequence::ContextualCheck;
use crate::domain::model::CheckEvidence;
use crate::utils::error::{ProbeError, Result};
use crate::utils::template::{render_str, render_value};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// One HTTP call against the backend plus the expectations on its response.
pub struct HttpCheck {
    definition: CheckDefinition,
    assertions: Vec<Assertion>,
    dependencies: Vec<String>,
    base_url: String,
    default_headers: BTreeMap<String, String>,
    client: Client,
}

impl HttpCheck {
    pub fn new(
        definition: CheckDefinition,
        base_url: &str,
        default_headers: BTreeMap<String, String>,
        client: Client,
    ) -> Result<Self> {
        let assertions = definition.compiled_assertions()?;
        let dependencies = definition.dependencies().to_vec();
        Ok(Self {
            definition,
            assertions,
            dependencies,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_headers,
            client,
        })
    }

    fn build_request(&self, vars: &HashMap<String, Value>) -> Result<(String, RequestBuilder)> {
        let method_name = self.definition.method();
        let method = Method::from_bytes(method_name.as_bytes()).map_err(|_| {
            ProbeError::InvalidConfigValueError {
                field: format!("checks.{}.method", self.definition.name),
                value: method_name.clone(),
                reason: "Not an HTTP method".to_string(),
            }
        })?;

        let path = render_str(&self.definition.path, vars)?;
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, &url);

        if let Some(query) = &self.definition.query {
            let mut pairs = Vec::with_capacity(query.len());
            for (key, value) in query {
                pairs.push((key.clone(), render_str(value, vars)?));
            }
            request = request.query(&pairs);
        }

        request = request.headers(self.build_headers(vars)?);

        if let Some(body) = &self.definition.body {
            request = request.json(&render_value(body, vars)?);
        }

        Ok((format!("{} {}", method_name, path), request))
    }

    /// 檢查自己的標頭覆蓋同名的套件預設標頭
    fn build_headers(&self, vars: &HashMap<String, Value>) -> Result<HeaderMap> {
        let invalid = |key: &str, value: &str, reason: String| ProbeError::InvalidConfigValueError {
            field: format!("checks.{}.headers.{}", self.definition.name, key),
            value: value.to_string(),
            reason,
        };

        let mut headers = HeaderMap::new();
        let check_headers = self.definition.headers.iter().flatten();
        for (key, value) in self.default_headers.iter().chain(check_headers) {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| invalid(key.as_str(), key.as_str(), e.to_string()))?;
            let rendered = render_str(value, vars)?;
            let value = HeaderValue::from_str(&rendered)
                .map_err(|e| invalid(key.as_str(), rendered.as_str(), e.to_string()))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    fn status_matches(&self, status: u16) -> bool {
        match &self.definition.expect_status {
            Some(codes) => codes.contains(&status),
            None => (200..300).contains(&status),
        }
    }

    fn expected_status_text(&self) -> String {
        match &self.definition.expect_status {
            Some(codes) => codes
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(" or "),
            None => "2xx".to_string(),
        }
    }

    fn needs_json(&self) -> bool {
        self.assertions.iter().any(Assertion::needs_json)
            || self.definition.capture.as_ref().is_some_and(|c| !c.is_empty())
    }
}

#[async_trait::async_trait]
impl ContextualCheck for HttpCheck {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    async fn execute(&self, context: &RunContext) -> Result<CheckEvidence> {
        let vars = context.variables();
        let (label, request) = self.build_request(vars)?;
        tracing::debug!("📡 {}: {}", self.definition.name, label);

        let response = request.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        if !self.status_matches(status) {
            tracing::debug!(
                "📡 {}: unexpected status {}, body: {}",
                self.definition.name,
                status,
                String::from_utf8_lossy(&body[..body.len().min(500)])
            );
            return Err(ProbeError::UnexpectedStatus {
                expected: self.expected_status_text(),
                actual: status,
            });
        }

        let json: Option<Value> = if self.needs_json() {
            serde_json::from_slice(&body).ok()
        } else {
            None
        };

        let view = ResponseView {
            status,
            content_type: content_type.as_deref(),
            body: &body[..],
            json: json.as_ref(),
        };

        let failures: Vec<String> = self
            .assertions
            .iter()
            .filter_map(|assertion| assertion.evaluate(&view, vars).err())
            .collect();
        if !failures.is_empty() {
            return Err(ProbeError::AssertionFailed {
                status: Some(status),
                message: failures.join("; "),
            });
        }

        let mut captured = Vec::new();
        if let Some(captures) = &self.definition.capture {
            let doc = json.as_ref().ok_or_else(|| ProbeError::AssertionFailed {
                status: Some(status),
                message: "cannot capture from a non-JSON response".to_string(),
            })?;
            for (var, pointer) in captures {
                let value = doc.pointer(pointer).ok_or_else(|| ProbeError::AssertionFailed {
                    status: Some(status),
                    message: format!("capture '{}': {} is missing", var, pointer),
                })?;
                captured.push((var.clone(), value.clone()));
            }
        }

        Ok(CheckEvidence {
            http_status: Some(status),
            message: format!(
                "{} -> {} ({} assertion(s), {} capture(s))",
                label,
                status,
                self.assertions.len(),
                captured.len()
            ),
            captured,
        })
    }
}
