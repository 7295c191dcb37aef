use anyhow::{anyhow, Context, Result};

use crate::form_values::FormValues;

/// Abstraction over the instruction-generating backend. Enables testing with
/// mocks; the real generation logic lives entirely server-side.
pub trait InstructionBackend {
    fn generate(&self, values: &FormValues) -> Result<String>;
}

/// Talks to the diagram backend over HTTP: POSTs the form record as JSON and
/// reads the `payload` string out of the response. No retry and no timeout;
/// the caller treats any failure as "nothing happened".
pub struct HttpInstructionBackend {
    pub base_url: String,
}

impl HttpInstructionBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    fn endpoint(&self) -> String {
        format!("{}/generate_diagram_instructions/", self.base_url)
    }
}

impl InstructionBackend for HttpInstructionBackend {
    fn generate(&self, values: &FormValues) -> Result<String> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .context("failed to build http client")?;

        let resp = client
            .post(self.endpoint())
            .json(values)
            .send()
            .context("instruction request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("instruction backend returned {status}");
        }

        let body: serde_json::Value = resp.json().context("parse instruction response")?;
        let payload = body
            .get("payload")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| anyhow!("no payload in instruction response"))?;

        Ok(payload.to_string())
    }
}

/// Mock backend returning a fixed payload.
pub struct MockInstructionBackend {
    pub payload: String,
}

impl InstructionBackend for MockInstructionBackend {
    fn generate(&self, _values: &FormValues) -> Result<String> {
        Ok(self.payload.clone())
    }
}

/// Mock backend that always fails, as a non-2xx response would.
pub struct FailingInstructionBackend;

impl InstructionBackend for FailingInstructionBackend {
    fn generate(&self, _values: &FormValues) -> Result<String> {
        anyhow::bail!("instruction backend returned 500 Internal Server Error")
    }
}

#[cfg(test)]
mod tests {
    use super::HttpInstructionBackend;

    #[test]
    fn endpoint_joins_base_url_without_double_slash() {
        let backend = HttpInstructionBackend::new("http://localhost:8000/");
        assert_eq!(
            backend.endpoint(),
            "http://localhost:8000/generate_diagram_instructions/"
        );
    }
}
