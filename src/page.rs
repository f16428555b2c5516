use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One page of item search results.
#[derive(Debug, Deserialize)]
pub struct Page {
    pub features: Vec<Map<String, Value>>,

    #[serde(default)]
    pub links: Vec<Link>,

    #[serde(rename = "numberMatched")]
    pub number_matched: Option<u64>,

    /// Older servers report counts through the context extension instead.
    pub context: Option<Value>,
}

impl Page {
    /// A missing or mistyped `features` field is a malformed response.
    pub fn from_slice(url: &str, bytes: &[u8]) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedResponse {
            url: url.to_string(),
            reason,
        };
        let value: Value =
            serde_json::from_slice(bytes).map_err(|err| malformed(format!("invalid JSON: {err}")))?;
        match value.get("features") {
            Some(Value::Array(_)) => {}
            Some(_) => return Err(malformed("`features` is not an array".into())),
            None => return Err(malformed("missing `features` array".into())),
        }
        serde_json::from_value(value).map_err(|err| malformed(err.to_string()))
    }

    pub fn next_link(&self) -> Option<&Link> {
        self.links.iter().find(|link| link.rel == "next")
    }

    pub fn number_matched(&self) -> Option<u64> {
        self.number_matched.or_else(|| {
            self.context
                .as_ref()?
                .get("matched")
                .and_then(Value::as_u64)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Link {
    pub rel: String,
    pub href: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<bool>,
}

impl Link {
    pub fn is_post(&self) -> bool {
        self.method
            .as_deref()
            .map(|method| method.eq_ignore_ascii_case("POST"))
            .unwrap_or(false)
    }

    /// The body to POST for this link, given the body of the previous request.
    ///
    /// Without a link body the previous body is resent. With `merge = true`
    /// the link body is laid over the previous one.
    pub fn post_body(&self, previous: &Value) -> Value {
        match (&self.body, self.merge.unwrap_or(false)) {
            (None, _) => previous.clone(),
            (Some(body), false) => body.clone(),
            (Some(body), true) => {
                let mut merged = previous.clone();
                if let (Some(base), Some(overlay)) = (merged.as_object_mut(), body.as_object()) {
                    for (key, value) in overlay {
                        base.insert(key.clone(), value.clone());
                    }
                }
                merged
            }
        }
    }
}
