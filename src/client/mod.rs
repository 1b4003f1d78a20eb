//! Thin transport client for the BankID RP API v5.1.
//!
//! One mutually authenticated `reqwest` client per [`BankIdClient`]
//! instance. Operations are independent, stateless request/response
//! calls; the only shared identity between calls is the opaque order
//! reference, so callers may run them concurrently for different orders.

mod error;
mod models;

pub use error::{ClientError, ErrorBody};
pub use models::{
    AuthenticateRequest, CollectResponse, CompletedCert, CompletedDevice, CompletedUser,
    CompletionData, OrderRefRequest, OrderResponse, SIMPLE_MARKDOWN_V1, SignRequest,
};

use std::fs;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Certificate, Client, Identity};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;

/// The narrow seam between the resolution core and the wire.
///
/// Production code talks to [`BankIdClient`]; tests substitute scripted
/// stubs.
#[async_trait]
pub trait BankIdApi: Send + Sync {
    /// Starts an identification order for a user.
    async fn authenticate(&self, request: AuthenticateRequest)
    -> Result<OrderResponse, ClientError>;

    /// Starts a signing order for a user.
    async fn sign(&self, request: SignRequest) -> Result<OrderResponse, ClientError>;

    /// Polls an in-flight order. Callers repeat this with the same
    /// orderRef until the status is terminal; the polling cadence is
    /// theirs to own.
    async fn collect(&self, order_ref: &str) -> Result<CollectResponse, ClientError>;

    /// Cancels an in-flight order.
    async fn cancel(&self, order_ref: &str) -> Result<(), ClientError>;
}

/// HTTPS client for the central BankID server.
pub struct BankIdClient {
    http: Client,
    base_url: String,
}

impl BankIdClient {
    /// Builds the client from configuration: RP identity certificate,
    /// pinned server root CA, endpoint for the selected environment.
    ///
    /// Built-in roots are disabled so only the pinned CA verifies the
    /// peer; rustls enforces TLS >= 1.2, negotiates no legacy cipher
    /// suites, and never compresses.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let identity = Identity::from_pem(&read_pem(&config.tls.identity_pem)?)?;
        let server_ca = Certificate::from_pem(&read_pem(&config.tls.server_ca_pem)?)?;

        let http = Client::builder()
            .use_rustls_tls()
            .identity(identity)
            .add_root_certificate(server_ca)
            .tls_built_in_root_certs(false)
            .https_only(true)
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api.environment.api_url().to_string(),
        })
    }

    async fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "sending request");
        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            // A decodable fault body makes the error classifiable; a
            // missing one leaves it an unclassified transport failure.
            let body = response.json::<ErrorBody>().await.ok();
            debug!(%status, code = body.as_ref().map(|b| b.error_code.as_str()), "api fault");
            Err(ClientError::Api { status, body })
        }
    }
}

#[async_trait]
impl BankIdApi for BankIdClient {
    async fn authenticate(
        &self,
        request: AuthenticateRequest,
    ) -> Result<OrderResponse, ClientError> {
        self.post("auth", &request).await
    }

    async fn sign(&self, request: SignRequest) -> Result<OrderResponse, ClientError> {
        self.post("sign", &request).await
    }

    async fn collect(&self, order_ref: &str) -> Result<CollectResponse, ClientError> {
        let request = OrderRefRequest {
            order_ref: order_ref.to_string(),
        };
        self.post("collect", &request).await
    }

    async fn cancel(&self, order_ref: &str) -> Result<(), ClientError> {
        let request = OrderRefRequest {
            order_ref: order_ref.to_string(),
        };
        let _: serde_json::Value = self.post("cancel", &request).await?;
        Ok(())
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, ClientError> {
    fs::read(path).map_err(|source| ClientError::Certificate {
        path: path.to_path_buf(),
        source,
    })
}
