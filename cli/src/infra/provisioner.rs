//! `Provisioner` backed by the DigitalOcean v2 API.
//!
//! Instances are droplets. Every account SSH key is attached at creation so
//! the operator's key can log in.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::application::ports::{InstanceSpec, InstanceStatus, Provisioner};
use crate::domain::ProvisioningError;

/// Public API endpoint.
pub const DIGITALOCEAN_API: &str = "https://api.digitalocean.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct CreateDroplet<'a> {
    name: &'a str,
    region: &'a str,
    size: &'a str,
    image: &'a str,
    ssh_keys: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct DropletEnvelope {
    droplet: Droplet,
}

#[derive(Debug, Deserialize)]
struct Droplet {
    id: u64,
    #[serde(default)]
    status: String,
    #[serde(default)]
    networks: Networks,
}

#[derive(Debug, Default, Deserialize)]
struct Networks {
    #[serde(default)]
    v4: Vec<NetworkV4>,
}

#[derive(Debug, Deserialize)]
struct NetworkV4 {
    ip_address: String,
    #[serde(default, rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct SshKeys {
    ssh_keys: Vec<SshKey>,
}

#[derive(Debug, Deserialize)]
struct SshKey {
    id: u64,
}

impl Droplet {
    /// Public IPv4 if the droplet has one, otherwise the first IPv4.
    fn address(&self) -> Option<&str> {
        self.networks
            .v4
            .iter()
            .find(|n| n.kind == "public")
            .or_else(|| self.networks.v4.first())
            .map(|n| n.ip_address.as_str())
    }
}

pub struct DigitalOceanProvisioner {
    client: Client,
    base_url: String,
    token: String,
}

impl DigitalOceanProvisioner {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(token, DIGITALOCEAN_API)
    }

    /// Point the client at another API root (tests use a local server).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_base_url(token: impl Into<String>, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Turn a non-success response into `ProvisioningError::Api`.
    async fn check(response: Response, operation: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ProvisioningError::Api {
            operation: operation.to_string(),
            status: status.as_u16(),
            body,
        }
        .into())
    }

    async fn ssh_key_ids(&self) -> Result<Vec<u64>> {
        let response = self
            .client
            .get(self.url("/v2/account/keys"))
            .bearer_auth(&self.token)
            .send()
            .await
            .context("listing account SSH keys")?;
        let keys: SshKeys = Self::check(response, "list SSH keys").await?.json().await?;
        Ok(keys.ssh_keys.into_iter().map(|k| k.id).collect())
    }

    async fn droplet(&self, id: u64) -> Result<Droplet> {
        let response = self
            .client
            .get(self.url(&format!("/v2/droplets/{id}")))
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("fetching droplet {id}"))?;
        let envelope: DropletEnvelope = Self::check(response, "get droplet")
            .await?
            .json()
            .await
            .with_context(|| format!("decoding droplet {id}"))?;
        Ok(envelope.droplet)
    }
}

impl Provisioner for DigitalOceanProvisioner {
    async fn create(&self, spec: &InstanceSpec<'_>) -> Result<u64> {
        // Creation goes ahead without keys if they cannot be listed.
        let ssh_keys = match self.ssh_key_ids().await {
            Ok(keys) => {
                tracing::debug!(?keys, "account SSH keys");
                keys
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "failed to get SSH keys");
                Vec::new()
            }
        };

        let body = CreateDroplet {
            name: spec.name,
            region: spec.region,
            size: spec.size,
            image: spec.image,
            ssh_keys,
        };
        let response = self
            .client
            .post(self.url("/v2/droplets"))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .context("creating droplet")?;
        let envelope: DropletEnvelope = Self::check(response, "create droplet")
            .await?
            .json()
            .await
            .context("decoding created droplet")?;
        Ok(envelope.droplet.id)
    }

    async fn status(&self, id: u64) -> Result<InstanceStatus> {
        Ok(InstanceStatus::parse(&self.droplet(id).await?.status))
    }

    async fn address(&self, id: u64) -> Result<String> {
        let droplet = self.droplet(id).await?;
        droplet
            .address()
            .map(str::to_string)
            .ok_or_else(|| ProvisioningError::NoAddress { id }.into())
    }
}
