//! Request context and reconciliation outcome

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use super::AppContext;

/// The inbound admin request, as far as reconciliation cares
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Full request URL
    pub url: String,
    /// Query parameters, percent-decoded
    pub query: BTreeMap<String, String>,
}

impl RequestContext {
    /// Build a request context from a URL, reading its query string
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let query = url
            .split_once('?')
            .map(|(_, rest)| rest.split('#').next().unwrap_or_default())
            .map(parse_query)
            .unwrap_or_default();
        Self { url, query }
    }

    /// Whether the query carries a parameter
    pub fn has_parameter(&self, name: &str) -> bool {
        self.query.contains_key(name)
    }

    /// The request URL with `parameter=1` appended, unless already present
    pub fn url_with_parameter(&self, parameter: &str) -> String {
        if self.has_parameter(parameter) {
            return self.url.clone();
        }

        let (base, fragment) = match self.url.split_once('#') {
            Some((base, fragment)) => (base, Some(fragment)),
            None => (self.url.as_str(), None),
        };
        let separator = if !base.contains('?') {
            "?"
        } else if base.ends_with('?') || base.ends_with('&') {
            ""
        } else {
            "&"
        };

        let mut url = format!("{base}{separator}{}=1", urlencoding::encode(parameter));
        if let Some(fragment) = fragment {
            url.push('#');
            url.push_str(fragment);
        }
        url
    }
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (decode_component(key), decode_component(value)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

/// Form-decode a query component; invalid UTF-8 escapes are kept as sent
fn decode_component(component: &str) -> String {
    let component = component.replace('+', " ");
    urlencoding::decode(&component).map_or_else(|_| component.clone(), Cow::into_owned)
}

/// Result of a companion install/enable triggered from the request.
///
/// Serializes as `{"<module>": {"status": true}}`, with a `msg` when the action failed
/// with an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortCircuitPayload {
    pub module: String,
    pub status: bool,
    pub message: Option<String>,
}

impl ShortCircuitPayload {
    pub fn status(module: impl Into<String>, status: bool) -> Self {
        Self {
            module: module.into(),
            status,
            message: None,
        }
    }

    pub fn failure(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            status: false,
            message: Some(message.into()),
        }
    }
}

struct ActionStatus<'a>(&'a ShortCircuitPayload);

impl Serialize for ActionStatus<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let fields = if self.0.message.is_some() { 2 } else { 1 };
        let mut state = serializer.serialize_struct("ActionStatus", fields)?;
        state.serialize_field("status", &self.0.status)?;
        if let Some(message) = &self.0.message {
            state.serialize_field("msg", message)?;
        }
        state.end()
    }
}

impl Serialize for ShortCircuitPayload {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.module, &ActionStatus(self))?;
        map.end()
    }
}

/// What the calling layer must do with the request
#[derive(Debug, Clone, PartialEq)]
pub enum ReconciliationOutcome {
    /// Render the page normally with this context
    Continue(AppContext),
    /// Stop here and answer the request with this JSON payload
    ShortCircuit(ShortCircuitPayload),
}

impl ReconciliationOutcome {
    pub fn is_short_circuit(&self) -> bool {
        matches!(self, Self::ShortCircuit(_))
    }
}
