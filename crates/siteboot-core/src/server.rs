//! Request environment seen by the application while bootstrapping from the
//! command line.
//!
//! The site resolver reads `http_host` to pick a configuration directory, so
//! it has to be populated from the selected URI before resolution.

use serde::Serialize;

pub const DEFAULT_URI: &str = "http://default";

///
/// ServerContext
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ServerContext {
    pub http_host: Option<String>,
    pub script_name: String,
    pub request_uri: String,
    pub https: bool,
}

impl ServerContext {
    /// Populate the context from a URI such as `https://example.com:8080/sub`.
    /// An empty URI selects the default site.
    pub fn setup_from_uri(&mut self, uri: &str) {
        let uri = if uri.trim().is_empty() { DEFAULT_URI } else { uri.trim() };
        let parts = UriParts::parse(uri);

        let base_path = parts.path.trim_end_matches('/');
        let script_name = format!("{base_path}/index.php");

        self.http_host = Some(parts.host_with_port());
        self.https = parts.scheme == "https";
        self.request_uri = if parts.path.is_empty() {
            "/".to_string()
        } else {
            parts.path.clone()
        };
        self.script_name = script_name;
    }

    #[must_use]
    pub fn host(&self) -> &str {
        self.http_host.as_deref().unwrap_or_default()
    }

    /// Directory part of the script path, without leading or trailing slashes.
    #[must_use]
    pub fn base_path(&self) -> &str {
        self.script_name
            .strip_suffix("index.php")
            .unwrap_or(&self.script_name)
            .trim_matches('/')
    }
}

///
/// UriParts
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UriParts {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
}

impl UriParts {
    /// Lenient parse; a missing scheme is treated as `http`.
    #[must_use]
    pub fn parse(uri: &str) -> Self {
        let (scheme, rest) = uri
            .split_once("://")
            .map_or(("http", uri), |(scheme, rest)| (scheme, rest));

        let (authority, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };

        // Strip user info.
        let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => match port.parse::<u16>() {
                Ok(port) => (host, Some(port)),
                Err(_) => (authority, None),
            },
            None => (authority, None),
        };

        Self {
            scheme: scheme.to_ascii_lowercase(),
            host: host.to_ascii_lowercase(),
            port,
            path: path.to_string(),
        }
    }

    #[must_use]
    pub fn host_with_port(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{port}", self.host),
            None => self.host.clone(),
        }
    }
}

///
/// TESTS
///
