use anyhow::{bail, Context, Result};
use clap::Args;
use cliclack::{intro, log, outro, spinner};
use reqwest::Client;
use shared::dto::{ClientCredentialsRequest, TokenResponse};

/// Fetches an API access token with the OAuth2 client-credentials grant.
#[derive(Args, Debug)]
pub struct TokenCommand {
    #[arg(long, env = "AUTH0_DOMAIN")]
    pub domain: String,

    #[arg(long, env = "AUTH0_CLIENT_ID")]
    pub client_id: String,

    #[arg(long, env = "AUTH0_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    #[arg(long, env = "AUTH0_API_AUDIENCE")]
    pub audience: String,

    /// Print only the raw token, for use in scripts
    #[arg(long)]
    pub raw: bool,
}

impl TokenCommand {
    pub fn token_url(&self) -> String {
        let domain = self
            .domain
            .trim_start_matches("https://")
            .trim_end_matches('/');
        format!("https://{}/oauth/token", domain)
    }

    pub async fn fetch(&self, url: &str) -> Result<TokenResponse> {
        let body = ClientCredentialsRequest {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            audience: self.audience.clone(),
            grant_type: "client_credentials".to_string(),
        };

        let res = Client::new()
            .post(url)
            .json(&body)
            .send()
            .await
            .context("Failed to reach the identity provider")?;

        if !res.status().is_success() {
            let status = res.status();
            let err = res.text().await.unwrap_or_default();
            bail!("Token request failed ({}): {}", status, err);
        }

        res.json().await.context("Unexpected token response")
    }

    pub async fn execute(&self) -> Result<()> {
        if self.raw {
            let token = self.fetch(&self.token_url()).await?;
            println!("{}", token.access_token);
            return Ok(());
        }

        intro(console::style("Access token").bold())?;
        let s = spinner();
        s.start(format!("Requesting a token from {}", self.domain));
        let token = match self.fetch(&self.token_url()).await {
            Ok(t) => t,
            Err(e) => {
                s.error("Request failed");
                return Err(e);
            }
        };
        s.stop("Token issued");

        if let Some(secs) = token.expires_in {
            log::info(format!("Expires in {} seconds", secs))?;
        }
        println!("{}", token.access_token);
        outro(format!(
            "Export it with {}",
            console::style("INVENTORY_TOKEN=<token>").cyan()
        ))?;
        Ok(())
    }
}
