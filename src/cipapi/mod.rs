//! Minimal client for the authenticated case-management API.
//!
//! Requests are serial and blocking; there is no retry or backoff and
//! failures propagate to the caller.

use std::path::Path;

/// Credentials and endpoint of the case-management API.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// API base URL.
    pub host: String,
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl Config {
    /// Load the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// If the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("problem reading config file: {}", e))?;
        toml::from_str(&text).map_err(|e| anyhow::anyhow!("problem parsing config file: {}", e))
    }
}

/// Token response of the `get-token` endpoint.
#[derive(Debug, Clone, serde::Deserialize)]
struct TokenResponse {
    token: String,
}

/// An authenticated session with the case-management API.
pub struct Session {
    client: reqwest::blocking::Client,
    host: String,
    token: String,
}

impl Session {
    /// Authenticate with the configured credentials.
    ///
    /// # Errors
    ///
    /// If the token request fails.
    pub fn authenticate(config: &Config) -> Result<Self, anyhow::Error> {
        let host = config.host.trim_end_matches('/').to_string();
        let client = reqwest::blocking::Client::new();
        let response: TokenResponse = client
            .post(format!("{}/get-token/", &host))
            .json(&serde_json::json!({
                "username": &config.username,
                "password": &config.password,
            }))
            .send()
            .map_err(|e| anyhow::anyhow!("token request failed: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow::anyhow!("token request failed: {}", e))?
            .json()
            .map_err(|e| anyhow::anyhow!("problem parsing token response: {}", e))?;
        Ok(Self {
            client,
            host,
            token: response.token,
        })
    }

    /// Fetch the raw interpretation request JSON for a case.
    ///
    /// # Errors
    ///
    /// If the request fails or the response is not JSON.
    pub fn interpretation_request(
        &self,
        case_id: u32,
        case_version: u32,
    ) -> Result<serde_json::Value, anyhow::Error> {
        let url = format!(
            "{}/interpretation-request/{}/{}/",
            &self.host, case_id, case_version
        );
        tracing::debug!("fetching case from {}", &url);
        self.client
            .get(&url)
            .query(&[("reports_v6", "true")])
            .header("Authorization", format!("JWT {}", &self.token))
            .send()
            .map_err(|e| anyhow::anyhow!("case request failed: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow::anyhow!("case request failed: {}", e))?
            .json()
            .map_err(|e| anyhow::anyhow!("problem parsing case response: {}", e))
    }
}

#[cfg(test)]
mod test {
    use std::io::Write as _;

    use super::Config;

    #[test]
    fn config_loads_from_toml() -> Result<(), anyhow::Error> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(
            file,
            "host = \"https://cipapi.example.org/api/2\"\nusername = \"jdoe\"\npassword = \"hunter2\""
        )?;

        let config = Config::load(file.path())?;
        assert_eq!(config.host, "https://cipapi.example.org/api/2");
        assert_eq!(config.username, "jdoe");
        assert_eq!(config.password, "hunter2");
        Ok(())
    }

    #[test]
    fn config_load_fails_on_missing_fields() -> Result<(), anyhow::Error> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "host = \"https://cipapi.example.org/api/2\"")?;

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("problem parsing config file"));
        Ok(())
    }
}
