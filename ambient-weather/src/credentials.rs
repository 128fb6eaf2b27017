//! Account keys and API key selections

use std::fmt;

/// Keys identifying the account and the device owners to query
///
/// Set once at construction. The order of `api_keys` is the order in which
/// devices are polled and subscribed; it carries no other meaning.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    application_key: String,
    api_keys: Vec<String>,
}

impl Credentials {
    pub fn new<I, K>(application_key: impl Into<String>, api_keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            application_key: application_key.into(),
            api_keys: api_keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Account-level key sent with every request
    pub fn application_key(&self) -> &str {
        &self.application_key
    }

    /// Per-owner keys, in configured order
    pub fn api_keys(&self) -> &[String] {
        &self.api_keys
    }
}

// Keys are secrets; keep them out of debug logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("application_key", &mask(&self.application_key))
            .field(
                "api_keys",
                &self.api_keys.iter().map(|k| mask(k)).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Shorten a key to its last four characters for diagnostics
pub(crate) fn mask(key: &str) -> String {
    let tail: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("…{}", tail)
}

/// A selection of API keys to subscribe to
///
/// A single bare key is normalized into a one-element list, so both
/// `client.subscribe("key")` and `client.subscribe(["a", "b"])` work.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKeys(Vec<String>);

impl ApiKeys {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for ApiKeys {
    fn from(key: &str) -> Self {
        Self(vec![key.to_string()])
    }
}

impl From<String> for ApiKeys {
    fn from(key: String) -> Self {
        Self(vec![key])
    }
}

impl From<&String> for ApiKeys {
    fn from(key: &String) -> Self {
        Self(vec![key.clone()])
    }
}

impl From<Vec<String>> for ApiKeys {
    fn from(keys: Vec<String>) -> Self {
        Self(keys)
    }
}

impl From<Vec<&str>> for ApiKeys {
    fn from(keys: Vec<&str>) -> Self {
        keys.as_slice().into()
    }
}

impl From<&[String]> for ApiKeys {
    fn from(keys: &[String]) -> Self {
        Self(keys.to_vec())
    }
}

impl From<&[&str]> for ApiKeys {
    fn from(keys: &[&str]) -> Self {
        Self(keys.iter().map(|k| k.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ApiKeys {
    fn from(keys: [&str; N]) -> Self {
        keys.as_slice().into()
    }
}

impl<const N: usize> From<[String; N]> for ApiKeys {
    fn from(keys: [String; N]) -> Self {
        Self(keys.into())
    }
}
