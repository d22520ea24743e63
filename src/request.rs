//! HTTP request assembly from call descriptions.

use crate::encoding::encode_parameters;
use crate::endpoint::{append_path, Endpoint};
use crate::service::ServiceMethod;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::{Map, Value};
use url::{form_urlencoded, Url};

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn carries_query(self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

impl From<&ServiceMethod> for HttpMethod {
    fn from(method: &ServiceMethod) -> Self {
        match method {
            ServiceMethod::Find { .. } | ServiceMethod::Get { .. } => HttpMethod::Get,
            ServiceMethod::Create { .. } => HttpMethod::Post,
            ServiceMethod::Update { .. } => HttpMethod::Put,
            ServiceMethod::Patch { .. } => HttpMethod::Patch,
            ServiceMethod::Remove { .. } => HttpMethod::Delete,
        }
    }
}

/// How parameters of an authentication call are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterEncoding {
    /// Form-urlencoded in the request body
    HttpBody,
    /// Query string for GET and DELETE, form body otherwise
    Default,
}

/// A fully assembled request, ready to hand to the HTTP client.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl PreparedRequest {
    /// Build the request for a service call.
    ///
    /// The body of create/update/patch calls is the JSON encoded data. If that
    /// encoding fails the request is sent without a body.
    pub fn for_endpoint(base_url: &Url, endpoint: &Endpoint) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        if let Some(ref token) = endpoint.access_token {
            insert_auth_header(&mut headers, &endpoint.auth.header, token);
        }

        let body = endpoint.method.data().and_then(|data| match serde_json::to_vec(data) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    request_id = %endpoint.request_id(),
                    "failed to encode body, sending none"
                );
                None
            }
        });

        PreparedRequest {
            method: HttpMethod::from(&endpoint.method),
            url: endpoint.url(base_url),
            headers,
            body,
        }
    }

    /// Build an authentication request against a fixed path.
    pub fn authentication(
        base_url: &Url,
        path: &str,
        method: HttpMethod,
        parameters: Option<&Map<String, Value>>,
        encoding: ParameterEncoding,
    ) -> Self {
        let mut url = append_path(base_url, path);
        let mut headers = HeaderMap::new();
        let mut body = None;

        let items = parameters.map(encode_parameters).unwrap_or_default();
        let in_query = encoding == ParameterEncoding::Default && method.carries_query();

        if items.is_empty() || in_query {
            if !items.is_empty() {
                url.query_pairs_mut().extend_pairs(items);
            }
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        } else {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(items)
                .finish();
            body = Some(encoded.into_bytes());
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        }

        PreparedRequest {
            method,
            url,
            headers,
            body,
        }
    }

    /// Turn this into a reqwest request on `client`
    pub fn into_reqwest(self, client: &Client) -> reqwest::RequestBuilder {
        let request = client
            .request(self.method.to_reqwest(), self.url)
            .headers(self.headers);
        match self.body {
            Some(body) => request.body(body),
            None => request,
        }
    }
}

/// Set `name: token`, replacing any value the header already had.
fn insert_auth_header(headers: &mut HeaderMap, name: &str, token: &str) {
    let name = match HeaderName::from_bytes(name.as_bytes()) {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!(header = name, error = %e, "invalid auth header name, token not sent");
            return;
        }
    };
    match HeaderValue::from_str(token) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(e) => tracing::warn!(error = %e, "invalid access token value, token not sent"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::AuthConfig;
    use crate::query::Query;
    use serde_json::json;

    fn base() -> Url {
        Url::parse("https://api.test/").unwrap()
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_method_mapping() {
        let data = object(json!({}));
        let cases = [
            (ServiceMethod::Find { query: None }, HttpMethod::Get),
            (ServiceMethod::Get { id: "1".into(), query: None }, HttpMethod::Get),
            (ServiceMethod::Create { data: data.clone(), query: None }, HttpMethod::Post),
            (ServiceMethod::Update { id: None, data: data.clone(), query: None }, HttpMethod::Put),
            (ServiceMethod::Patch { id: None, data, query: None }, HttpMethod::Patch),
            (ServiceMethod::Remove { id: None, query: None }, HttpMethod::Delete),
        ];
        for (method, expected) in cases {
            assert_eq!(HttpMethod::from(&method), expected, "{}", method);
        }
    }

    #[test]
    fn test_find_has_json_content_type_and_no_body() {
        let endpoint = Endpoint::new(
            "users",
            ServiceMethod::Find {
                query: Some(Query::new().limit(1)),
            },
        );
        let request = PreparedRequest::for_endpoint(&base(), &endpoint);

        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.headers[CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert!(request.body.is_none());
        assert_eq!(request.url.as_str(), "https://api.test/users?%24limit=1");
    }

    #[test]
    fn test_create_encodes_body() {
        let endpoint = Endpoint::new(
            "users",
            ServiceMethod::Create { data: object(json!({"name": "x", "age": 3})), query: None },
        );
        let request = PreparedRequest::for_endpoint(&base(), &endpoint);

        assert_eq!(request.method, HttpMethod::Post);
        let body: Value = serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "x", "age": 3}));
    }

    #[test]
    fn test_access_token_uses_configured_header() {
        let endpoint = Endpoint::new("users", ServiceMethod::Find { query: None })
            .with_auth(AuthConfig::default().with_header("X-Access-Token"))
            .with_access_token("secret");
        let request = PreparedRequest::for_endpoint(&base(), &endpoint);

        assert_eq!(request.headers["x-access-token"], "secret");
        assert_eq!(request.headers[CONTENT_TYPE], JSON_CONTENT_TYPE);
    }

    #[test]
    fn test_access_token_overwrites_header() {
        let endpoint = Endpoint::new("users", ServiceMethod::Find { query: None })
            .with_auth(AuthConfig::default().with_header("Content-Type"))
            .with_access_token("token");
        let request = PreparedRequest::for_endpoint(&base(), &endpoint);

        assert_eq!(request.headers.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(request.headers[CONTENT_TYPE], "token");
    }

    #[test]
    fn test_invalid_header_name_is_skipped() {
        let endpoint = Endpoint::new("users", ServiceMethod::Find { query: None })
            .with_auth(AuthConfig::default().with_header("bad header"))
            .with_access_token("token");
        let request = PreparedRequest::for_endpoint(&base(), &endpoint);

        assert_eq!(request.headers.len(), 1);
    }

    #[test]
    fn test_authentication_form_body() {
        let credentials = object(json!({"strategy": "local", "email": "a@b.c", "password": "p w"}));
        let request = PreparedRequest::authentication(
            &base(),
            "authentication",
            HttpMethod::Post,
            Some(&credentials),
            ParameterEncoding::HttpBody,
        );

        assert_eq!(request.url.as_str(), "https://api.test/authentication");
        assert_eq!(request.headers[CONTENT_TYPE], FORM_CONTENT_TYPE);
        assert_eq!(
            String::from_utf8(request.body.unwrap()).unwrap(),
            "strategy=local&email=a%40b.c&password=p+w"
        );
    }

    #[test]
    fn test_logout_has_no_body() {
        let request = PreparedRequest::authentication(
            &base(),
            "authentication",
            HttpMethod::Delete,
            None,
            ParameterEncoding::Default,
        );

        assert_eq!(request.method, HttpMethod::Delete);
        assert!(request.body.is_none());
        assert_eq!(request.headers[CONTENT_TYPE], JSON_CONTENT_TYPE);
    }

    #[test]
    fn test_default_encoding_uses_query_for_delete() {
        let params = object(json!({"all": true}));
        let request = PreparedRequest::authentication(
            &base(),
            "authentication",
            HttpMethod::Delete,
            Some(&params),
            ParameterEncoding::Default,
        );

        assert_eq!(request.url.as_str(), "https://api.test/authentication?all=true");
        assert!(request.body.is_none());
    }
}
