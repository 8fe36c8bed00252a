//! HTTP client for the proxy admin API.

use crate::config::AdminConfig;
use crate::error::{AdminError, AdminResult};
use crate::records::{NameIndex, Page, RootInfo};
use async_trait::async_trait;
use proxysync_sendconfig::{BoxError, ConfigService, FetchOptions, ReloadError, StateFetcher};
use proxysync_types::{
    Consumer, Plugin, ProxyState, ProxyVersion, Route, Service, Target, Upstream,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client for one proxy's admin API.
///
/// Serves as the whole-state strategy's [`ConfigService`] and the diff-apply
/// strategy's [`StateFetcher`].
#[derive(Debug, Clone)]
pub struct AdminClient {
    config: AdminConfig,
    base_url: String,
    client: Client,
}

impl AdminClient {
    /// Creates a client. Fails on an empty base URL or an unusable token.
    pub fn new(config: AdminConfig) -> AdminResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(AdminError::Config("admin base URL is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let name = HeaderName::from_bytes(config.token_header.as_bytes()).map_err(|e| {
                AdminError::Config(format!("invalid token header {:?}: {e}", config.token_header))
            })?;
            let mut value = HeaderValue::from_str(token)
                .map_err(|e| AdminError::Config(format!("invalid admin token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// Root URL of the admin API, without a trailing slash.
    pub fn base_root_url(&self) -> &str {
        &self.base_url
    }

    /// Reads the proxy's version from the admin API root.
    pub async fn version(&self) -> AdminResult<ProxyVersion> {
        let root: RootInfo = self.get_json("/", &[]).await?;
        Ok(root.version.parse()?)
    }

    /// Replaces the proxy's configuration with a declarative payload.
    ///
    /// A failure response keeps its status and raw body so the caller can
    /// parse entity errors out of it.
    pub async fn reload(
        &self,
        config: Vec<u8>,
        check_hash: bool,
        flatten_errors: bool,
    ) -> Result<(), ReloadError> {
        let flag = |on: bool| if on { "1" } else { "0" };
        let response = self
            .client
            .post(self.url("/config"))
            .query(&[
                ("check_hash", flag(check_hash)),
                ("flatten_errors", flag(flatten_errors)),
            ])
            .header(CONTENT_TYPE, "application/json")
            .body(config)
            .send()
            .await
            .map_err(|e| ReloadError::transport(format!("posting declarative config: {e}")))?;

        let status = response.status();
        if status.is_success() {
            info!(status = status.as_u16(), "declarative config accepted");
            return Ok(());
        }

        let body = match response.bytes().await {
            Ok(body) => body.to_vec(),
            Err(e) => {
                warn!(error = %e, "could not read config error body");
                Vec::new()
            }
        };
        Err(ReloadError::rejected(status.as_u16(), body))
    }

    /// Reads the entities currently configured on the proxy.
    ///
    /// References between entities are resolved to names where the referenced
    /// entity was fetched too.
    pub async fn fetch_state(&self, options: &FetchOptions) -> AdminResult<ProxyState> {
        let tags = options.select_tags.as_slice();
        let mut names = NameIndex::default();

        let services: Vec<Service> = self.list_typed("/services", "service", tags, &names).await?;
        for s in &services {
            names.insert(s.id.as_deref(), &s.name);
        }

        let routes: Vec<Route> = self.list_typed("/routes", "route", tags, &names).await?;
        for r in &routes {
            names.insert(r.id.as_deref(), &r.name);
        }

        let upstreams: Vec<Upstream> =
            self.list_typed("/upstreams", "upstream", tags, &names).await?;
        let mut targets = Vec::new();
        for u in &upstreams {
            names.insert(u.id.as_deref(), &u.name);
            let key = u.id.as_deref().unwrap_or(&u.name);
            let path = format!("/upstreams/{key}/targets");
            let upstream_targets: Vec<Target> =
                self.list_typed(&path, "target", &[], &names).await?;
            targets.extend(upstream_targets);
        }

        let consumers: Vec<Consumer> = if options.skip_consumers {
            Vec::new()
        } else {
            self.list_typed("/consumers", "consumer", tags, &names).await?
        };
        for c in &consumers {
            names.insert(c.id.as_deref(), &c.username);
        }

        let plugins: Vec<Plugin> = self.list_typed("/plugins", "plugin", tags, &names).await?;

        let mut state = ProxyState::new();
        services.into_iter().for_each(|e| state.push(e));
        routes.into_iter().for_each(|e| state.push(e));
        upstreams.into_iter().for_each(|e| state.push(e));
        targets.into_iter().for_each(|e| state.push(e));
        plugins.into_iter().for_each(|e| state.push(e));
        consumers.into_iter().for_each(|e| state.push(e));

        info!(entities = state.len(), url = %self.base_url, "fetched proxy state");
        Ok(state)
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AdminResult<T> {
        let response = self.client.get(self.url(path)).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdminError::Status {
                method: "GET",
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Reads every page of a list endpoint.
    async fn list_all(&self, path: &str, tags: &[String]) -> AdminResult<Vec<Value>> {
        let mut query = vec![("size", self.config.page_size.to_string())];
        if !tags.is_empty() {
            query.push(("tags", tags.join(",")));
        }

        let mut records = Vec::new();
        let mut page: Page = self.get_json(path, &query).await?;
        loop {
            records.extend(page.data);
            match page.next.filter(|next| !next.is_empty()) {
                Some(next) => page = self.get_json(&next, &[]).await?,
                None => break,
            }
        }

        debug!(path, count = records.len(), "listed admin entities");
        Ok(records)
    }

    async fn list_typed<T: DeserializeOwned>(
        &self,
        path: &str,
        kind: &'static str,
        tags: &[String],
        names: &NameIndex,
    ) -> AdminResult<Vec<T>> {
        self.list_all(path, tags)
            .await?
            .into_iter()
            .map(|record| names.decode(kind, record))
            .collect()
    }
}

#[async_trait]
impl ConfigService for AdminClient {
    async fn reload_declarative_raw_config(
        &self,
        config: Vec<u8>,
        check_hash: bool,
        flatten_errors: bool,
    ) -> Result<(), ReloadError> {
        self.reload(config, check_hash, flatten_errors).await
    }
}

#[async_trait]
impl StateFetcher for AdminClient {
    fn base_root_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_state(&self, options: &FetchOptions) -> Result<ProxyState, BoxError> {
        Ok(AdminClient::fetch_state(self, options).await?)
    }
}
