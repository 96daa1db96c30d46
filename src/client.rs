use {
    super::{
        error::{Error, Result},
        post::Post,
    },
    bytes::Bytes,
    derivative::Derivative,
    log::debug,
    reqwest::{
        header::{self, HeaderMap, HeaderValue},
        RequestBuilder, Response,
    },
    serde::{de::DeserializeOwned, Serialize},
    serde_json::Value as JsonValue,
    std::time::Duration,
    url::Url,
};

/// Root endpoint of the public Danbooru instance.
pub const DEFAULT_BASE_URL: &str = "https://danbooru.donmai.us";

/// Anything with a stable numeric identity. Listings collapse duplicates on this key.
pub trait Identified {
    fn id(&self) -> u64;
}

/// Turns one raw post object from the API into a post value.
///
/// [`Client`] is generic over its factory so alternate post representations can be plugged in
/// with [`Client::with_factory`] without touching the endpoints.
pub trait PostFactory {
    type Post: Identified;

    fn build(&self, value: JsonValue) -> Result<Self::Post>;
}

/// The default factory, deserializing into [`Post`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Posts;

impl PostFactory for Posts {
    type Post = Post;

    fn build(&self, value: JsonValue) -> Result<Post> {
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Derivative, Clone, Serialize)]
#[derivative(Debug)]
struct Login {
    login: String,
    #[derivative(Debug = "ignore")]
    api_key: String,
}

/// Client struct.
#[derive(Debug, Clone)]
pub struct Client<F = Posts> {
    client: reqwest::Client,
    base_url: String,
    login: Option<Login>,
    timeout: Option<Duration>,
    factory: F,
}

impl Client {
    /// Create a new client for the instance at `url` with the specified value for the User-Agent
    /// header. Booru hosts commonly block the default user agents of HTTP libraries, so a
    /// descriptive one naming your project is required.
    pub fn new(url: &str, user_agent: impl AsRef<[u8]>) -> Result<Self> {
        if user_agent.as_ref() == b"" {
            return Err(Error::CannotCreateClient(String::from(
                "User Agent mustn't be empty",
            )));
        }

        Url::parse(url)
            .map_err(|e| Error::CannotCreateClient(format!("Invalid base URL {:?}: {}", url, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_bytes(user_agent.as_ref())
                .map_err(|e| Error::CannotCreateClient(format!("Invalid header value: {}", e)))?,
        );

        match reqwest::Client::builder().default_headers(headers).build() {
            Ok(client) => Ok(Client {
                client,
                base_url: url.trim_end_matches('/').to_owned(),
                login: None,
                timeout: None,
                factory: Posts,
            }),
            Err(e) => Err(Error::CannotCreateClient(format!("{:?}", e))),
        }
    }

    /// Create a new client for the public instance at [`DEFAULT_BASE_URL`].
    pub fn danbooru(user_agent: impl AsRef<[u8]>) -> Result<Self> {
        Self::new(DEFAULT_BASE_URL, user_agent)
    }
}

impl<F> Client<F> {
    /// Authenticate every API request with the given login and API key.
    pub fn login(&mut self, login: impl Into<String>, api_key: impl Into<String>) {
        self.login = Some(Login {
            login: login.into(),
            api_key: api_key.into(),
        });
    }

    /// Go back to unauthenticated requests.
    pub fn logout(&mut self) {
        self.login = None;
    }

    /// Give up on any request taking longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the factory used to build posts out of API responses.
    pub fn with_factory<G: PostFactory>(self, factory: G) -> Client<G> {
        Client {
            client: self.client,
            base_url: self.base_url,
            login: self.login,
            timeout: self.timeout,
            factory,
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// The root endpoint this client talks to, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The web page of the post with the given ID on this instance.
    pub fn post_link(&self, id: u64) -> String {
        format!("{}/posts/{}", self.base_url, id)
    }

    /// Download the bytes at `url`. Credentials are never attached to these requests since media
    /// usually lives on other hosts.
    pub async fn get_bytes(&self, url: &str) -> Result<Bytes> {
        let response = self.send(self.get(url), url).await?;

        response
            .bytes()
            .await
            .map_err(|source| Error::CannotSendRequest {
                url: url.to_owned(),
                source,
            })
    }

    pub(crate) async fn get_json_endpoint<T>(&self, endpoint: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.get_json_endpoint_query(endpoint, &()).await
    }

    pub(crate) async fn get_json_endpoint_query<T, Q>(&self, endpoint: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut request = self.get(&url).query(query);
        if let Some(login) = &self.login {
            request = request.query(login);
        }

        let body = self
            .send(request, &url)
            .await?
            .bytes()
            .await
            .map_err(|source| Error::CannotSendRequest {
                url: url.clone(),
                source,
            })?;

        Ok(serde_json::from_slice(&body)?)
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let request = self.client.get(url);

        match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    // `url` is the address without its query string, so that credentials never end up in errors
    // or logs.
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response> {
        debug!("GET {}", url);

        let response = request
            .send()
            .await
            .map_err(|source| Error::CannotSendRequest {
                url: url.to_owned(),
                source,
            })?;

        let status = response.status();
        debug!("{} answered {}", url, status);

        if status.is_success() {
            return Ok(response);
        }

        // Danbooru describes failures as `{ "success": false, "message": "..." }`
        let reason = response
            .json::<JsonValue>()
            .await
            .ok()
            .and_then(|body| body["message"].as_str().map(String::from))
            .filter(|message| !message.is_empty());

        Err(Error::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            reason,
        })
    }
}

impl<F: PostFactory> Client<F> {
    pub(crate) fn build_post(&self, value: JsonValue) -> Result<F::Post> {
        self.factory.build(value)
    }

    pub(crate) fn build_posts(&self, values: Vec<JsonValue>) -> Result<Vec<F::Post>> {
        values.into_iter().map(|v| self.build_post(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn client_new() {
        Client::new("https://danbooru.donmai.us", b"rsdanbooru/unit_test").unwrap();
    }

    #[test]
    #[should_panic]
    fn client_new_requires_non_empty_user_agent() {
        Client::new("https://danbooru.donmai.us", b"").unwrap();
    }

    #[test]
    fn client_new_rejects_invalid_base_url() {
        assert!(matches!(
            Client::new("not a url", b"rsdanbooru/unit_test"),
            Err(Error::CannotCreateClient(_))
        ));
    }

    #[test]
    fn client_danbooru_uses_public_instance() {
        let client = Client::danbooru(b"rsdanbooru/unit_test").unwrap();

        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(
            client.post_link(1234),
            "https://danbooru.donmai.us/posts/1234"
        );
    }

    #[test]
    fn client_base_url_drops_trailing_slash() {
        let client = Client::new("https://testbooru.donmai.us/", b"rsdanbooru/unit_test").unwrap();

        assert_eq!(client.base_url(), "https://testbooru.donmai.us");
    }

    #[test]
    fn debug_hides_api_key() {
        let mut client = Client::danbooru(b"rsdanbooru/unit_test").unwrap();
        client.login("someone", "hunter2");

        let printed = format!("{:?}", client);
        assert!(printed.contains("someone"));
        assert!(!printed.contains("hunter2"));
    }

    #[tokio::test]
    async fn login_adds_credentials_to_api_requests() {
        let mut server = mockito::Server::new_async().await;
        let mut client = Client::new(&server.url(), b"rsdanbooru/unit_test").unwrap();
        client.login("someone", "hunter2");

        let m = server
            .mock("GET", "/posts/random.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("login".into(), "someone".into()),
                Matcher::UrlEncoded("api_key".into(), "hunter2".into()),
            ]))
            .with_body("{}")
            .create_async()
            .await;

        let body: JsonValue = client
            .get_json_endpoint("/posts/random.json")
            .await
            .unwrap();

        assert_eq!(body, serde_json::json!({}));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn logout_drops_credentials() {
        let mut server = mockito::Server::new_async().await;
        let mut client = Client::new(&server.url(), b"rsdanbooru/unit_test").unwrap();
        client.login("someone", "hunter2");
        client.logout();

        let m = server
            .mock("GET", "/posts/random.json")
            .match_query(Matcher::Exact(String::new()))
            .with_body("{}")
            .create_async()
            .await;

        let _: JsonValue = client
            .get_json_endpoint("/posts/random.json")
            .await
            .unwrap();

        m.assert_async().await;
    }

    #[tokio::test]
    async fn get_bytes_never_sends_credentials() {
        let mut server = mockito::Server::new_async().await;
        let mut client = Client::new(&server.url(), b"rsdanbooru/unit_test").unwrap();
        client.login("someone", "hunter2");

        let m = server
            .mock("GET", "/data/abc.png")
            .match_query(Matcher::Exact(String::new()))
            .with_body(b"\x89PNG")
            .create_async()
            .await;

        let bytes = client
            .get_bytes(&format!("{}/data/abc.png", server.url()))
            .await
            .unwrap();

        assert_eq!(&bytes[..], b"\x89PNG");
        m.assert_async().await;
    }

    #[tokio::test]
    async fn http_error_carries_api_message() {
        let mut server = mockito::Server::new_async().await;
        let client = Client::new(&server.url(), b"rsdanbooru/unit_test").unwrap();

        let _m = server
            .mock("GET", "/posts.json")
            .with_status(422)
            .with_body(r#"{"success":false,"message":"You cannot go beyond page 1000."}"#)
            .create_async()
            .await;

        let err = client
            .get_json_endpoint::<JsonValue>("/posts.json")
            .await
            .unwrap_err();

        match err {
            Error::Http {
                url,
                status,
                reason,
            } => {
                assert_eq!(url, format!("{}/posts.json", server.url()));
                assert_eq!(status, 422);
                assert_eq!(reason.as_deref(), Some("You cannot go beyond page 1000."));
            }
            e => panic!("unexpected error: {:?}", e),
        }
    }

    #[tokio::test]
    async fn error_url_has_no_credentials() {
        let mut server = mockito::Server::new_async().await;
        let mut client = Client::new(&server.url(), b"rsdanbooru/unit_test").unwrap();
        client.login("someone", "hunter2");

        let _m = server
            .mock("GET", "/posts.json")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let err = client
            .get_json_endpoint::<JsonValue>("/posts.json")
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(!err.to_string().contains("hunter2"));
    }

    #[tokio::test]
    async fn invalid_json_is_a_deserialization_error() {
        let mut server = mockito::Server::new_async().await;
        let client = Client::new(&server.url(), b"rsdanbooru/unit_test").unwrap();

        let _m = server
            .mock("GET", "/posts.json")
            .with_body("<html>")
            .create_async()
            .await;

        assert!(matches!(
            client.get_json_endpoint::<JsonValue>("/posts.json").await,
            Err(Error::Deserialization(_))
        ));
    }
}
