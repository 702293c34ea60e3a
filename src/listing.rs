//! Subreddit listing selection.
//!
//! This module queries the reddit listing API for a subreddit, filters the
//! returned posts down to plausible audio candidates (non-self posts with a
//! link), and picks one according to the requested listing type. It performs
//! a single network read per call and never retries; transient failures
//! surface as [`Error::UpstreamUnavailable`].

use crate::config::ListingConfig;
use crate::error::{Error, Result};
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// The ordering/selection rule used to pick a post from a subreddit's
/// post stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListingType {
    /// Front-page ordering; picks the first candidate
    Hot,
    /// Newest first; picks the first candidate
    New,
    /// One uniformly random post among the candidates
    Random,
    /// Posts gaining traction; picks the first candidate
    Rising,
    /// Highest voted; picks the first candidate
    Top,
}

impl ListingType {
    /// The path segment used in the listing URL, e.g. `random` in
    /// `/r/jazznoir/random.json`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::Hot => "hot",
            ListingType::New => "new",
            ListingType::Random => "random",
            ListingType::Rising => "rising",
            ListingType::Top => "top",
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hot" => Ok(ListingType::Hot),
            "new" => Ok(ListingType::New),
            "random" => Ok(ListingType::Random),
            "rising" => Ok(ListingType::Rising),
            "top" => Ok(ListingType::Top),
            other => Err(Error::InvalidArgument(format!(
                "listing type '{}' not supported (expected hot, new, random, rising or top)",
                other
            ))),
        }
    }
}

/// A post selected from a subreddit listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    /// Reddit's id for the post (e.g. "t3_abc123" without the prefix)
    pub id: String,

    /// The link the post points at
    pub url: String,

    /// Post title, used as a display name downstream
    pub title: String,
}

// Wire format of the listing API. Only the fields we consume are modeled;
// everything else in the response is ignored.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    data: RawPost,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    #[serde(default)]
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    is_self: bool,
}

/// Client for the subreddit listing API
pub struct ListingClient {
    http_client: reqwest::Client,
    config: ListingConfig,
}

impl ListingClient {
    /// Create a new listing client.
    ///
    /// The user agent carries a random per-process suffix: reddit throttles
    /// generic agents aggressively, distinct ones much less so.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ListingConfig) -> Result<Self> {
        let user_agent = format!("radioreddit/{:032x}", rand::random::<u128>());
        debug!(user_agent = %user_agent, "User-agent defined");

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// The listing URL for a subreddit and listing type,
    /// e.g. `https://www.reddit.com/r/jazznoir/random.json`.
    pub fn listing_url(&self, subreddit: &str, listing_type: ListingType) -> String {
        format!(
            "{}/r/{}/{}.json",
            self.config.api_uri.trim_end_matches('/'),
            subreddit,
            listing_type.as_str()
        )
    }

    /// Select one audio-candidate post from a subreddit.
    ///
    /// Fetches one page of the listing, filters to non-self posts with a
    /// non-empty link, and applies the listing type's selection rule:
    /// [`ListingType::Random`] picks uniformly among the candidates, every
    /// other type picks the first candidate in listing order.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] if `subreddit` is empty
    /// - [`Error::NoPostFound`] if the listing is empty or no candidate
    ///   survives filtering
    /// - [`Error::UpstreamUnavailable`] on network failure, a non-success
    ///   HTTP status, or an unparseable response
    pub async fn select_post(&self, subreddit: &str, listing_type: ListingType) -> Result<Post> {
        let subreddit = subreddit.trim();
        if subreddit.is_empty() {
            return Err(Error::InvalidArgument(
                "subreddit must not be empty".to_string(),
            ));
        }

        let url = self.listing_url(subreddit, listing_type);
        debug!(url = %url, "Fetching subreddit listing");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamUnavailable(format!(
                "listing returned HTTP {}: {}",
                status.as_u16(),
                url
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("unreadable response from {}: {}", url, e)))?;

        let listing = parse_listing(body)
            .map_err(|e| Error::UpstreamUnavailable(format!("bad listing JSON from {}: {}", url, e)))?;

        let candidates: Vec<Post> = listing
            .data
            .children
            .into_iter()
            .map(|thing| thing.data)
            .filter(|post| !post.is_self)
            .filter_map(|post| {
                let url = post.url.unwrap_or_default();
                if url.is_empty() {
                    None
                } else {
                    Some(Post {
                        id: post.id,
                        url,
                        title: post.title,
                    })
                }
            })
            .collect();

        debug!(
            subreddit = subreddit,
            candidates = candidates.len(),
            "Filtered listing to audio candidates"
        );

        let selected = match listing_type {
            ListingType::Random => candidates.choose(&mut rand::thread_rng()).cloned(),
            _ => candidates.into_iter().next(),
        };

        selected.ok_or_else(|| Error::NoPostFound {
            subreddit: subreddit.to_string(),
        })
    }
}

/// Normalize the two response shapes the listing API produces.
///
/// The `random` endpoint redirects to a post's comment page, which returns a
/// JSON *array* whose first element is the post listing (the rest is comment
/// data). Every other listing type returns a single listing object.
fn parse_listing(body: serde_json::Value) -> serde_json::Result<Listing> {
    match body {
        serde_json::Value::Array(mut parts) if !parts.is_empty() => {
            serde_json::from_value(parts.remove(0))
        }
        other => serde_json::from_value(other),
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn listing_json(posts: &[(&str, &str, &str, bool)]) -> serde_json::Value {
        let children: Vec<serde_json::Value> = posts
            .iter()
            .map(|(id, url, title, is_self)| {
                serde_json::json!({
                    "kind": "t3",
                    "data": {
                        "id": id,
                        "url": url,
                        "title": title,
                        "is_self": is_self,
                    }
                })
            })
            .collect();
        serde_json::json!({
            "kind": "Listing",
            "data": { "children": children }
        })
    }

    fn client_for(server: &MockServer) -> ListingClient {
        ListingClient::new(ListingConfig {
            api_uri: server.uri(),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_listing_type_from_str() {
        assert_eq!("hot".parse::<ListingType>().unwrap(), ListingType::Hot);
        assert_eq!("TOP".parse::<ListingType>().unwrap(), ListingType::Top);
        assert_eq!(
            "Random".parse::<ListingType>().unwrap(),
            ListingType::Random
        );
        assert!(matches!(
            "best".parse::<ListingType>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_listing_url() {
        let client = ListingClient::new(ListingConfig::default()).unwrap();
        assert_eq!(
            client.listing_url("jazznoir", ListingType::Random),
            "https://www.reddit.com/r/jazznoir/random.json"
        );
    }

    #[tokio::test]
    async fn test_select_post_returns_first_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/jazznoir/hot.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing_json(&[
                ("p1", "https://youtu.be/abc", "First", false),
                ("p2", "https://youtu.be/def", "Second", false),
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let post = client.select_post("jazznoir", ListingType::Hot).await.unwrap();
        assert_eq!(post.id, "p1");
        assert_eq!(post.url, "https://youtu.be/abc");
        assert_eq!(post.title, "First");
    }

    #[tokio::test]
    async fn test_select_post_skips_self_posts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/jazznoir/new.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing_json(&[
                ("p1", "https://reddit.com/r/jazznoir/p1", "Discussion", true),
                ("p2", "https://youtu.be/def", "A track", false),
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let post = client.select_post("jazznoir", ListingType::New).await.unwrap();
        assert_eq!(post.id, "p2");
    }

    #[tokio::test]
    async fn test_select_post_random_array_shape() {
        // The random endpoint returns [post_listing, comment_listing]
        let server = MockServer::start().await;
        let body = serde_json::json!([
            listing_json(&[("p9", "https://youtu.be/xyz", "Lucky pick", false)]),
            listing_json(&[]),
        ]);
        Mock::given(method("GET"))
            .and(path("/r/jazznoir/random.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let post = client
            .select_post("jazznoir", ListingType::Random)
            .await
            .unwrap();
        assert_eq!(post.id, "p9");
    }

    #[tokio::test]
    async fn test_select_post_no_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/emptysub/hot.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing_json(&[
                ("p1", "https://reddit.com/self", "Only talk here", true),
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .select_post("emptysub", ListingType::Hot)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoPostFound { .. }));
    }

    #[tokio::test]
    async fn test_select_post_empty_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/ghosttown/top.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing_json(&[])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .select_post("ghosttown", ListingType::Top)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoPostFound { .. }));
    }

    #[tokio::test]
    async fn test_select_post_http_error_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/jazznoir/hot.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .select_post("jazznoir", ListingType::Hot)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_select_post_garbage_json_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/jazznoir/hot.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!("nope")))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .select_post("jazznoir", ListingType::Hot)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_select_post_empty_subreddit_is_invalid() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let err = client
            .select_post("  ", ListingType::Hot)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
