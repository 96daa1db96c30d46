use {
    super::{
        client::{Client, Identified, PostFactory, DEFAULT_BASE_URL},
        error::{Error, Result as DanbooruResult},
        utils::collapse_by_id,
    },
    futures::{
        stream::{self, unfold},
        Stream, StreamExt, TryStreamExt,
    },
    log::{debug, info},
    serde::{Deserialize, Serialize},
    serde_json::{Map as JsonMap, Value as JsonValue},
    url::Url,
};

mod media;

/// Structure representing a post.
///
/// Fields the API sends that aren't listed here are kept in [`Post::extra`] and come back out of
/// [`Post::metadata`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Post {
    pub id: u64,
    pub uploader_id: u64,
    pub approver_id: Option<u64>,

    /// Every tag of the post, separated by spaces.
    pub tag_string: String,
    pub tag_string_general: String,
    pub tag_string_artist: String,
    pub tag_string_copyright: String,
    pub tag_string_character: String,
    pub tag_string_meta: String,
    pub tag_count_general: u64,
    pub tag_count_artist: u64,
    pub tag_count_copyright: u64,
    pub tag_count_character: u64,
    pub tag_count_meta: u64,

    pub rating: Option<String>,
    /// Not resolved; the parent may not exist anymore.
    pub parent_id: Option<u64>,
    pub has_children: bool,

    /// Where the post was uploaded from. Not necessarily an HTTP URL.
    pub source: Option<String>,
    pub md5: Option<String>,
    pub file_url: Option<Url>,
    pub large_file_url: Option<Url>,
    pub preview_file_url: Option<Url>,
    pub file_ext: Option<String>,
    pub file_size: Option<u64>,
    pub image_width: Option<u64>,
    pub image_height: Option<u64>,

    pub score: i64,
    pub fav_count: i64,

    pub created_at: String,
    pub updated_at: String,
    pub last_comment_bumped_at: Option<String>,
    pub last_noted_at: Option<String>,

    /// Everything else the API sent.
    #[serde(flatten)]
    pub extra: JsonMap<String, JsonValue>,
}

impl Identified for Post {
    fn id(&self) -> u64 {
        self.id
    }
}

fn split_tags(tags: &str) -> Vec<&str> {
    tags.split_whitespace().collect()
}

fn url_extension(url: &Url) -> &str {
    url.path()
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit('.').next())
        .unwrap_or_default()
}

impl Post {
    pub fn tags(&self) -> Vec<&str> {
        split_tags(&self.tag_string)
    }

    pub fn general_tags(&self) -> Vec<&str> {
        split_tags(&self.tag_string_general)
    }

    pub fn artist_tags(&self) -> Vec<&str> {
        split_tags(&self.tag_string_artist)
    }

    pub fn copyright_tags(&self) -> Vec<&str> {
        split_tags(&self.tag_string_copyright)
    }

    pub fn character_tags(&self) -> Vec<&str> {
        split_tags(&self.tag_string_character)
    }

    pub fn meta_tags(&self) -> Vec<&str> {
        split_tags(&self.tag_string_meta)
    }

    /// The file extension of the media, taken from the large file URL, then the file URL, then
    /// the `file_ext` field.
    pub fn extension(&self) -> Option<&str> {
        match (&self.large_file_url, &self.file_url) {
            (Some(url), _) | (None, Some(url)) => Some(url_extension(url)),
            (None, None) => self.file_ext.as_deref(),
        }
    }

    /// `{md5}.{extension}`, when both are known.
    pub fn filename(&self) -> Option<String> {
        Some(format!("{}.{}", self.md5.as_ref()?, self.extension()?))
    }

    /// Best known location of the media: large file URL, file URL or source, in that order.
    pub fn media_url(&self) -> Option<&str> {
        self.large_file_url
            .as_ref()
            .or(self.file_url.as_ref())
            .map(Url::as_str)
            .or_else(|| self.usable_source())
    }

    /// The page of this post on the public instance. See [`Post::link_at`] for other instances.
    pub fn link(&self) -> String {
        self.link_at(DEFAULT_BASE_URL)
    }

    pub fn link_at(&self, base_url: &str) -> String {
        format!("{}/posts/{}", base_url.trim_end_matches('/'), self.id)
    }

    pub fn is_video(&self) -> bool {
        matches!(self.extension(), Some("webm" | "mp4"))
    }

    pub fn is_image(&self) -> bool {
        matches!(self.extension(), Some("jpg" | "jpeg" | "png" | "webp"))
    }

    pub fn is_animation(&self) -> bool {
        matches!(self.extension(), Some("gif" | "gifv"))
    }

    pub fn is_zip(&self) -> bool {
        matches!(self.extension(), Some("zip"))
    }

    /// Everything known about the post except the media itself, including fields this crate
    /// doesn't know about.
    pub fn metadata(&self) -> DanbooruResult<JsonMap<String, JsonValue>> {
        match serde_json::to_value(self)? {
            JsonValue::Object(map) => Ok(map),
            other => Err(Error::Deserialization(serde::ser::Error::custom(format!(
                "post #{} serialized to a non-object: {}",
                self.id, other
            )))),
        }
    }

    // The API sends an empty string when the source is unknown.
    pub(crate) fn usable_source(&self) -> Option<&str> {
        self.source.as_deref().filter(|s| !s.is_empty())
    }
}

/// Parameters of a post listing. Every parameter left unset is omitted from the request.
///
/// ```
/// # use rsdanbooru::post::Query;
/// let query = Query::new()
///     .tags(["cat_ears", "rating:general"])
///     .limit(20)
///     .page(3);
/// ```
#[derive(Default, Debug, PartialEq, Eq, Serialize, Clone)]
pub struct Query {
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u64>,
}

impl Query {
    /// Create a new instance of `Query` with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only list posts matching all of these tags.
    pub fn tags<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, tags: I) -> Self {
        let tags: Vec<String> = tags.into_iter().map(|t| t.as_ref().to_owned()).collect();
        self.tags = Some(tags.join(" "));
        self
    }

    /// Set the number of posts per page. For [`Client::get_all_posts`], this is also the maximum
    /// number of posts returned.
    pub fn limit<T: Into<Option<u64>>>(mut self, limit: T) -> Self {
        self.limit = limit.into();
        self
    }

    /// Set the 1-based page to fetch.
    pub fn page<T: Into<Option<u64>>>(mut self, page: T) -> Self {
        self.page = page.into();
        self
    }
}

impl From<&[&str]> for Query {
    fn from(q: &[&str]) -> Self {
        Query::new().tags(q)
    }
}

/// What fetching one page of a crawl gave.
enum PageOutcome<P> {
    Posts(Vec<P>),
    Exhausted,
    Failed(Error),
}

impl<F: PostFactory> Client<F> {
    /// Returns the post with the given ID.
    ///
    /// ```no_run
    /// # use rsdanbooru::client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> rsdanbooru::error::Result<()> {
    /// let client = Client::danbooru("MyProject/1.0 (by username on Danbooru)")?;
    /// let post = client.get_post(6107378).await?;
    ///
    /// assert_eq!(post.id, 6107378);
    /// # Ok(()) }
    /// ```
    pub async fn get_post(&self, id: u64) -> DanbooruResult<F::Post> {
        let body = self
            .get_json_endpoint(&format!("/posts/{}.json", id))
            .await
            .map_err(|e| match e {
                Error::Http {
                    url, status: 404, ..
                } => Error::NotFound { url },
                e => e,
            })?;

        self.build_post(body)
    }

    /// Returns the posts with the given IDs, in the same order. Requests are made one after the
    /// other and the first failure is returned.
    pub async fn get_posts_by_id(&self, ids: &[u64]) -> DanbooruResult<Vec<F::Post>> {
        stream::iter(ids)
            .then(|&id| self.get_post(id))
            .try_collect()
            .await
    }

    /// Returns one page of posts, in the order the API gave them.
    ///
    /// ```no_run
    /// # use rsdanbooru::client::Client;
    /// # use rsdanbooru::post::Query;
    /// # #[tokio::main]
    /// # async fn main() -> rsdanbooru::error::Result<()> {
    /// let client = Client::danbooru("MyProject/1.0 (by username on Danbooru)")?;
    ///
    /// for post in client
    ///     .get_posts(Query::new().tags(["cat_ears"]).limit(5))
    ///     .await?
    /// {
    ///     assert!(post.tags().contains(&"cat_ears"));
    /// }
    /// # Ok(()) }
    /// ```
    pub async fn get_posts(&self, query: impl Into<Query>) -> DanbooruResult<Vec<F::Post>> {
        let query: Query = query.into();
        let body: Vec<JsonValue> = self.get_json_endpoint_query("/posts.json", &query).await?;

        self.build_posts(body)
    }

    /// Returns the posts of pages `page_start` to `page_end`, both included, with duplicates
    /// collapsed (see [`Client::get_all_posts`]). Any page failing fails the whole call.
    pub async fn get_posts_pages(
        &self,
        query: impl Into<Query>,
        page_start: u64,
        page_end: u64,
    ) -> DanbooruResult<Vec<F::Post>> {
        let query = query.into();
        let mut posts = Vec::new();

        for page in page_start..=page_end {
            posts.extend(self.get_posts(query.clone().page(page)).await?);
        }

        Ok(collapse_by_id(posts))
    }

    /// Returns every post matching the query, crawling pages from 1 until the API gives an
    /// empty page or an error.
    ///
    /// Both count as the end of the results, so an error is never returned and **the result may
    /// be incomplete** if the server failed in the middle of the crawl.
    ///
    /// A post showing up more than once only appears once, as its last fetched copy, at the
    /// position of that last copy. When the query has a limit, it is used as the page size and
    /// the result is cut down to that many posts.
    pub async fn get_all_posts(&self, query: impl Into<Query>) -> Vec<F::Post> {
        let query = query.into();
        let limit = query.limit;
        let mut posts = Vec::new();
        let mut page = 1;

        loop {
            match self.fetch_page(&query, page).await {
                PageOutcome::Posts(new_posts) => posts.extend(new_posts),
                PageOutcome::Exhausted => {
                    debug!("page {} is empty, stopping", page);
                    break;
                }
                PageOutcome::Failed(e) => {
                    debug!("page {} failed, stopping: {}", page, e);
                    break;
                }
            }

            page += 1;
        }

        let mut posts = collapse_by_id(posts);
        info!("crawled {} page(s), {} distinct post(s)", page - 1, posts.len());

        if let Some(limit) = limit {
            posts.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }

        posts
    }

    /// Returns a Stream over the pages of posts matching the query, starting at page 1. It ends
    /// after the first empty page, or right after yielding an error.
    ///
    /// ```no_run
    /// # use rsdanbooru::client::Client;
    /// use futures::prelude::*;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> rsdanbooru::error::Result<()> {
    /// let client = Client::danbooru("MyProject/1.0 (by username on Danbooru)")?;
    ///
    /// let pages = client.post_pages(&["cat_ears"][..]).take(3);
    /// futures::pin_mut!(pages);
    ///
    /// while let Some(page) = pages.next().await {
    ///     println!("{} posts", page?.len());
    /// }
    /// # Ok(()) }
    /// ```
    pub fn post_pages(
        &self,
        query: impl Into<Query>,
    ) -> impl Stream<Item = DanbooruResult<Vec<F::Post>>> + '_ {
        let query = query.into();

        // `None` once the stream is over
        unfold(Some(1), move |page| {
            let query = query.clone();

            async move {
                let page = page?;

                match self.fetch_page(&query, page).await {
                    PageOutcome::Posts(posts) => Some((Ok(posts), Some(page + 1))),
                    PageOutcome::Exhausted => None,
                    PageOutcome::Failed(e) => Some((Err(e), None)),
                }
            }
        })
    }

    /// Returns a random post.
    pub async fn get_random_post(&self) -> DanbooruResult<F::Post> {
        let body = self.get_json_endpoint("/posts/random.json").await?;

        self.build_post(body)
    }

    async fn fetch_page(&self, query: &Query, page: u64) -> PageOutcome<F::Post> {
        match self.get_posts(query.clone().page(page)).await {
            Ok(posts) if posts.is_empty() => PageOutcome::Exhausted,
            Ok(posts) => PageOutcome::Posts(posts),
            Err(e) => PageOutcome::Failed(e),
        }
    }
}

/// A complete post object as the API sends it, with `id` and ids derived from it.
#[cfg(test)]
pub(crate) fn post_json(id: u64) -> JsonValue {
    serde_json::json!({
        "id": id,
        "created_at": "2023-03-14T09:12:44.011-04:00",
        "uploader_id": 500_000 + id,
        "score": 12,
        "source": "",
        "md5": format!("{:032x}", id),
        "last_comment_bumped_at": null,
        "rating": "g",
        "image_width": 1200,
        "image_height": 1600,
        "tag_string": "1girl cat_ears original solo",
        "fav_count": 20,
        "file_ext": "jpg",
        "last_noted_at": null,
        "parent_id": null,
        "has_children": false,
        "approver_id": null,
        "tag_count_general": 3,
        "tag_count_artist": 0,
        "tag_count_character": 0,
        "tag_count_copyright": 1,
        "file_size": 123_456,
        "up_score": 12,
        "down_score": 0,
        "is_pending": false,
        "updated_at": "2023-03-14T09:12:44.011-04:00",
        "tag_string_general": "1girl cat_ears solo",
        "tag_string_character": "",
        "tag_string_copyright": "original",
        "tag_string_artist": "",
        "tag_string_meta": "",
        "tag_count_meta": 0,
        "file_url": format!("https://cdn.donmai.us/original/{:032x}.jpg", id),
        "large_file_url": format!("https://cdn.donmai.us/sample/sample-{:032x}.jpg", id),
        "preview_file_url": format!("https://cdn.donmai.us/180x180/{:032x}.jpg", id),
    })
}
