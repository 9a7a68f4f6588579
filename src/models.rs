use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::GatewayError;

// Inbound request body, also the outbound body sent to the resume agent
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ResumeQuery {
    pub query: String,
}

impl ResumeQuery {
    /// Decode a request body. Anything that is not a JSON object with a
    /// non-empty string `query` is a client error.
    pub fn from_body(body: &[u8]) -> Result<Self, GatewayError> {
        let object: Map<String, Value> =
            serde_json::from_slice(body).map_err(|_| GatewayError::InvalidBody)?;

        match object.get("query").and_then(Value::as_str) {
            Some(query) if !query.is_empty() => Ok(Self {
                query: query.to_string(),
            }),
            _ => Err(GatewayError::MissingQuery),
        }
    }
}

// Resume agent response, passed through untouched
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(transparent)]
pub struct AgentResponse(pub Map<String, Value>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_query() {
        let q = ResumeQuery::from_body(br#"{"query":"hello","extra":1}"#).unwrap();
        assert_eq!(q.query, "hello");
    }

    #[test]
    fn rejects_bad_bodies() {
        assert!(matches!(ResumeQuery::from_body(b"not json"), Err(GatewayError::InvalidBody)));
        assert!(matches!(ResumeQuery::from_body(b"[1,2]"), Err(GatewayError::InvalidBody)));
        assert!(matches!(ResumeQuery::from_body(b""), Err(GatewayError::InvalidBody)));
        assert!(matches!(ResumeQuery::from_body(b"{}"), Err(GatewayError::MissingQuery)));
        assert!(matches!(
            ResumeQuery::from_body(br#"{"query":""}"#),
            Err(GatewayError::MissingQuery)
        ));
        assert!(matches!(
            ResumeQuery::from_body(br#"{"query":42}"#),
            Err(GatewayError::MissingQuery)
        ));
    }

    #[test]
    fn agent_response_is_opaque() {
        let raw = r#"{"answer":"world","sources":["a","b"]}"#;
        let resp: AgentResponse = serde_json::from_str(raw).unwrap();
        let back: Value = serde_json::to_value(&resp).unwrap();
        assert_eq!(back, serde_json::from_str::<Value>(raw).unwrap());
    }
}
