// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TP-Link cloud client.
//!
//! Implements [`PlugClient`] over the vendor's cloud HTTP API: `login` for a
//! session token, `getDeviceList` for the account's device inventory, and
//! `passthrough` to relay Kasa-protocol JSON to the target plug. The session
//! (token plus resolved device) is established lazily on the first command
//! and re-established after an authentication failure.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::client::PlugClient;
use crate::config::Credentials;
use crate::error::ClientError;
use crate::types::PlugState;

/// Default cloud endpoint. The device list may point individual devices at a
/// regional `appServerUrl` instead.
pub const DEFAULT_ENDPOINT: &str = "https://wap.tplinkcloud.com";

// Vendor error codes that mean the session or credentials are bad.
const ERR_INVALID_CREDENTIALS: i32 = -20601;
const ERR_TOKEN_EXPIRED: i32 = -20651;
const ERR_ACCOUNT_LOCKED: i32 = -20661;

/// Configuration for a [`CloudClient`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use chargectl::client::CloudConfig;
/// use chargectl::config::Credentials;
///
/// let config = CloudConfig::new(Credentials {
///     email: "user@example.com".into(),
///     password: "secret".into(),
/// })
/// .with_device_alias("desk plug")
/// .with_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct CloudConfig {
    credentials: Credentials,
    device_alias: Option<String>,
    endpoint: String,
    timeout: Duration,
}

impl CloudConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the given account.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            device_alias: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Selects a device by alias instead of the account's first device.
    #[must_use]
    pub fn with_device_alias(mut self, alias: impl Into<String>) -> Self {
        self.device_alias = Some(alias.into());
        self
    }

    /// Selects a device by alias if one is given.
    #[must_use]
    pub fn with_device_alias_opt(mut self, alias: Option<String>) -> Self {
        self.device_alias = alias;
        self
    }

    /// Overrides the cloud endpoint. Mainly useful for tests.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Network` if the HTTP client cannot be created.
    pub fn into_client(self) -> Result<CloudClient, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ClientError::Network)?;
        Ok(CloudClient {
            http,
            credentials: self.credentials,
            device_alias: self.device_alias,
            endpoint: self.endpoint,
            timeout: self.timeout,
            terminal_uuid: Uuid::new_v4().to_string(),
            session: Mutex::new(None),
        })
    }
}

/// A client for one smart plug behind the TP-Link cloud.
#[derive(Debug)]
pub struct CloudClient {
    http: reqwest::Client,
    credentials: Credentials,
    device_alias: Option<String>,
    endpoint: String,
    timeout: Duration,
    terminal_uuid: String,
    session: Mutex<Option<Session>>,
}

#[derive(Debug, Clone)]
struct Session {
    token: String,
    device: DeviceEntry,
}

/// Device information reported by the cloud and the device itself.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// The device alias configured in the vendor app.
    pub alias: String,
    /// Hardware model, e.g. `P110`.
    pub model: String,
    /// The vendor device id.
    pub device_id: String,
    /// Firmware version, when reported.
    pub firmware: Option<String>,
    /// Current relay state, when reported.
    pub relay_state: Option<PlugState>,
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Envelope<T> {
    error_code: i32,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct LoginResult {
    token: String,
}

#[derive(Debug, Deserialize)]
struct DeviceListResult {
    #[serde(rename = "deviceList")]
    device_list: Vec<DeviceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct DeviceEntry {
    #[serde(rename = "deviceId")]
    device_id: String,
    #[serde(default)]
    alias: String,
    #[serde(rename = "deviceModel", default)]
    model: String,
    #[serde(rename = "appServerUrl", default)]
    app_server_url: Option<String>,
    #[serde(default)]
    status: i32,
}

#[derive(Debug, Deserialize)]
struct PassthroughResult {
    #[serde(rename = "responseData")]
    response_data: String,
}

#[derive(Debug, Deserialize)]
struct SysInfoEnvelope {
    system: SysInfoSystem,
}

#[derive(Debug, Deserialize)]
struct SysInfoSystem {
    get_sysinfo: SysInfo,
}

#[derive(Debug, Deserialize)]
struct SysInfo {
    #[serde(default)]
    alias: String,
    #[serde(default)]
    model: String,
    #[serde(rename = "deviceId", default)]
    device_id: String,
    #[serde(rename = "sw_ver", default)]
    sw_ver: Option<String>,
    #[serde(default)]
    relay_state: Option<u8>,
    #[serde(default, rename = "err_code")]
    err_code: Option<i32>,
}

// ============================================================================
// Client implementation
// ============================================================================

impl CloudClient {
    /// Lists the aliases and models of every device on the account.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if login or the device list request fails.
    pub async fn list_devices(&self) -> Result<Vec<(String, String, bool)>, ClientError> {
        let token = self.login().await?;
        let devices = self.fetch_device_list(&token).await?;
        Ok(devices
            .into_iter()
            .map(|d| (d.alias, d.model, d.status == 1))
            .collect())
    }

    /// Fetches full information for the configured device.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the device cannot be resolved or queried.
    pub async fn device_info(&self) -> Result<DeviceInfo, ClientError> {
        let info = self.sysinfo().await?;
        Ok(DeviceInfo {
            alias: info.alias,
            model: info.model,
            device_id: info.device_id,
            firmware: info.sw_ver,
            relay_state: info.relay_state.map(|v| PlugState::from(v != 0)),
        })
    }

    async fn sysinfo(&self) -> Result<SysInfo, ClientError> {
        let response = self
            .passthrough(json!({"system": {"get_sysinfo": {}}}))
            .await?;
        let envelope: SysInfoEnvelope = serde_json::from_str(&response)
            .map_err(|e| ClientError::UnexpectedResponse(e.to_string()))?;
        let info = envelope.system.get_sysinfo;
        if let Some(code) = info.err_code
            && code != 0
        {
            return Err(ClientError::Api {
                code,
                message: "device rejected get_sysinfo".to_string(),
            });
        }
        Ok(info)
    }

    /// Sends a Kasa-protocol request to the configured device and returns the
    /// raw response data.
    async fn passthrough(&self, request: serde_json::Value) -> Result<String, ClientError> {
        // One retry after re-login when the token has expired.
        match self.passthrough_once(&request, false).await {
            Err(ClientError::Auth) => self.passthrough_once(&request, true).await,
            other => other,
        }
    }

    async fn passthrough_once(
        &self,
        request: &serde_json::Value,
        fresh_session: bool,
    ) -> Result<String, ClientError> {
        let session = self.session_handle(fresh_session).await?;
        let request_data = serde_json::to_string(request)
            .map_err(|e| ClientError::UnexpectedResponse(e.to_string()))?;
        let url = session
            .device
            .app_server_url
            .clone()
            .unwrap_or_else(|| self.endpoint.clone());

        let body = json!({
            "method": "passthrough",
            "params": {
                "deviceId": session.device.device_id,
                "requestData": request_data,
            },
        });
        let result: PassthroughResult = self
            .post(&url, Some(session.token.as_str()), &body)
            .await?;
        Ok(result.response_data)
    }

    /// Returns the cached session, establishing one if needed.
    async fn session_handle(&self, force: bool) -> Result<Session, ClientError> {
        let mut guard = self.session.lock().await;
        if force {
            *guard = None;
        }
        if let Some(session) = guard.as_ref() {
            return Ok(session.clone());
        }
        let token = self.login().await?;
        let device = self.resolve_device(&token).await?;
        let session = Session { token, device };
        *guard = Some(session.clone());
        Ok(session)
    }

    async fn login(&self) -> Result<String, ClientError> {
        let body = json!({
            "method": "login",
            "params": {
                "appType": "Kasa_Android",
                "cloudUserName": self.credentials.email,
                "cloudPassword": self.credentials.password,
                "terminalUUID": self.terminal_uuid,
            },
        });
        let result: LoginResult = self.post(&self.endpoint, None, &body).await?;
        Ok(result.token)
    }

    async fn fetch_device_list(&self, token: &str) -> Result<Vec<DeviceEntry>, ClientError> {
        let body = json!({"method": "getDeviceList"});
        let result: DeviceListResult = self.post(&self.endpoint, Some(token), &body).await?;
        Ok(result.device_list)
    }

    /// Picks the configured device from the account inventory: by alias,
    /// case-insensitively, or the first device when no alias is configured.
    async fn resolve_device(&self, token: &str) -> Result<DeviceEntry, ClientError> {
        let devices = self.fetch_device_list(token).await?;
        match &self.device_alias {
            Some(alias) => devices
                .into_iter()
                .find(|d| d.alias.eq_ignore_ascii_case(alias))
                .ok_or_else(|| ClientError::DeviceNotFound {
                    alias: Some(alias.clone()),
                }),
            None => devices
                .into_iter()
                .next()
                .ok_or(ClientError::DeviceNotFound { alias: None }),
        }
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        token: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<T, ClientError> {
        let mut request = self.http.post(url);
        if let Some(token) = token {
            request = request.query(&[("token", token)]);
        }
        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        match envelope.error_code {
            0 => envelope.result.ok_or_else(|| {
                ClientError::UnexpectedResponse("missing result field".to_string())
            }),
            ERR_INVALID_CREDENTIALS | ERR_TOKEN_EXPIRED | ERR_ACCOUNT_LOCKED => {
                Err(ClientError::Auth)
            }
            code => Err(ClientError::Api {
                code,
                message: envelope.msg.unwrap_or_default(),
            }),
        }
    }

    fn map_transport_error(&self, error: reqwest::Error) -> ClientError {
        if error.is_timeout() {
            ClientError::Timeout(self.timeout)
        } else {
            ClientError::Network(error)
        }
    }
}

impl PlugClient for CloudClient {
    async fn set_power(&self, state: PlugState) -> Result<(), ClientError> {
        let request = json!({
            "system": {"set_relay_state": {"state": state.as_relay_value()}},
        });
        let response = self.passthrough(request).await?;
        // The device echoes an err_code inside the relayed response.
        let parsed: serde_json::Value = serde_json::from_str(&response)
            .map_err(|e| ClientError::UnexpectedResponse(e.to_string()))?;
        let err_code = parsed
            .pointer("/system/set_relay_state/err_code")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(0);
        if err_code != 0 {
            #[allow(clippy::cast_possible_truncation)]
            return Err(ClientError::Api {
                code: err_code as i32,
                message: "device rejected set_relay_state".to_string(),
            });
        }
        Ok(())
    }

    async fn power_state(&self) -> Result<Option<PlugState>, ClientError> {
        let info = self.sysinfo().await?;
        Ok(info.relay_state.map(|v| PlugState::from(v != 0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_parses_login() {
        let json = r#"{"error_code":0,"result":{"token":"abc123"}}"#;
        let envelope: Envelope<LoginResult> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.error_code, 0);
        assert_eq!(envelope.result.unwrap().token, "abc123");
    }

    #[test]
    fn envelope_parses_error() {
        let json = r#"{"error_code":-20601,"msg":"Password incorrect"}"#;
        let envelope: Envelope<LoginResult> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.error_code, ERR_INVALID_CREDENTIALS);
        assert_eq!(envelope.msg.as_deref(), Some("Password incorrect"));
        assert!(envelope.result.is_none());
    }

    #[test]
    fn device_list_parses() {
        let json = r#"{
            "deviceList": [
                {"deviceId":"8012ABC","alias":"Desk Plug","deviceModel":"P110",
                 "appServerUrl":"https://eu-wap.tplinkcloud.com","status":1},
                {"deviceId":"8012DEF","alias":"Heater","deviceModel":"HS110","status":0}
            ]
        }"#;
        let result: DeviceListResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.device_list.len(), 2);
        assert_eq!(result.device_list[0].alias, "Desk Plug");
        assert_eq!(
            result.device_list[0].app_server_url.as_deref(),
            Some("https://eu-wap.tplinkcloud.com")
        );
        assert!(result.device_list[1].app_server_url.is_none());
    }

    #[test]
    fn sysinfo_parses_relay_state() {
        let json = r#"{"system":{"get_sysinfo":{
            "alias":"Desk Plug","model":"P110","deviceId":"8012ABC",
            "sw_ver":"1.0.4","relay_state":1,"err_code":0
        }}}"#;
        let envelope: SysInfoEnvelope = serde_json::from_str(json).unwrap();
        let info = envelope.system.get_sysinfo;
        assert_eq!(info.relay_state, Some(1));
        assert_eq!(info.model, "P110");
    }

    #[test]
    fn config_defaults() {
        let config = CloudConfig::new(Credentials {
            email: "user@example.com".into(),
            password: "secret".into(),
        });
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, CloudConfig::DEFAULT_TIMEOUT);
        assert!(config.device_alias.is_none());
    }
}
