//! HTTP classification provider client

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use super::{Classification, Classifier, ClassifierError};

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    title: &'a str,
    description: &'a str,
}

/// Classification provider client
#[derive(Clone)]
pub struct HttpClassifier {
    client: Client,
    api_key: String,
    api_url: String,
}

impl HttpClassifier {
    #[must_use]
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_url,
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Option<Classification>, ClassifierError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&ClassifyRequest { title, description })
            .send()
            .await
            .map_err(|e| ClassifierError::RequestFailed(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| ClassifierError::RequestFailed(e.to_string()))?;
                if body.trim().is_empty() || body.trim() == "null" {
                    return Ok(None);
                }
                serde_json::from_str::<Classification>(&body)
                    .map(Some)
                    .map_err(|e| ClassifierError::ResponseParse(e.to_string()))
            }
            StatusCode::NO_CONTENT => Ok(None),
            StatusCode::TOO_MANY_REQUESTS => Err(ClassifierError::RateLimited),
            StatusCode::UNAUTHORIZED => Err(ClassifierError::Unauthorized),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ClassifierError::Api {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}
