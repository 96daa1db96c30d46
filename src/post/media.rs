use {
    super::Post,
    crate::{
        client::Client,
        error::{Error, Result as DanbooruResult},
    },
    bytes::Bytes,
    log::debug,
    std::borrow::Cow,
};

/// Pixiv's image CDN refuses hotlinking; its mirror serves the same paths.
const PIXIV_CDN: &str = "https://i.pximg.net/";
const PIXIV_MIRROR: &str = "https://i.pixiv.cat/";

/// Where the media of a source lives.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SourceTarget<'a> {
    Remote(Cow<'a, str>),
    /// Only existed on the uploader's machine.
    Local,
}

pub(crate) fn resolve_source(source: &str) -> SourceTarget<'_> {
    if let Some(path) = source.strip_prefix(PIXIV_CDN) {
        SourceTarget::Remote(Cow::Owned(format!("{}{}", PIXIV_MIRROR, path)))
    } else if source.starts_with("file://") {
        SourceTarget::Local
    } else {
        SourceTarget::Remote(Cow::Borrowed(source))
    }
}

impl Post {
    /// Downloads the media of the post.
    ///
    /// The large file is preferred when `use_large` is set and the post has one. Posts without any
    /// file URL are fetched through their source instead; sources pointing at local files give
    /// empty bytes.
    ///
    /// ```no_run
    /// # use rsdanbooru::client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> rsdanbooru::error::Result<()> {
    /// let client = Client::danbooru("MyProject/1.0 (by username on Danbooru)")?;
    /// let post = client.get_post(6107378).await?;
    ///
    /// let bytes = post.get_media(&client, true).await?;
    /// std::fs::write(post.filename().unwrap_or_default(), &bytes).unwrap();
    /// # Ok(()) }
    /// ```
    pub async fn get_media<F>(&self, client: &Client<F>, use_large: bool) -> DanbooruResult<Bytes> {
        let url = match (&self.large_file_url, &self.file_url) {
            (Some(large), _) if use_large => large,
            (_, Some(file)) => file,
            (Some(large), None) => large,
            (None, None) => {
                let source = self.usable_source().ok_or(Error::NoMediaUrl { id: self.id })?;

                return self
                    .get_media_from_source(client, source)
                    .await
                    .map_err(|cause| Error::MediaResolution {
                        id: self.id,
                        source_url: source.to_owned(),
                        cause: Box::new(cause),
                    });
            }
        };

        client.get_bytes(url.as_str()).await
    }

    async fn get_media_from_source<F>(&self, client: &Client<F>, source: &str) -> DanbooruResult<Bytes> {
        match resolve_source(source) {
            SourceTarget::Remote(url) => {
                debug!("post #{} has no file URL, fetching {}", self.id, url);
                client.get_bytes(&url).await
            }
            SourceTarget::Local => {
                debug!("post #{} comes from a local file, nothing to fetch", self.id);
                Ok(Bytes::new())
            }
        }
    }
}
