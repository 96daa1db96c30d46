//! Async wrapper crate for the [Danbooru](https://danbooru.donmai.us) API.
//!
//! ## Usage
//!
//! First, create a [`Client`]. You have to provide a descriptive User-Agent for your project.
//!
//! ```no_run
//! # use rsdanbooru::client::Client;
//! # fn main() -> Result<(), rsdanbooru::error::Error> {
//! let client = Client::danbooru("MyProject/1.0 (by username on Danbooru)")?;
//! # Ok(()) }
//! ```
//!
//! Other instances running the same software work too:
//!
//! ```no_run
//! # use rsdanbooru::client::Client;
//! # fn main() -> Result<(), rsdanbooru::error::Error> {
//! let mut client = Client::new("https://testbooru.donmai.us", "MyProject/1.0")?;
//! client.login("username", "api key");
//! # Ok(()) }
//! ```
//!
//! Now it's ready to go! For example you can get post #6107378 like this:
//!
//! ```no_run
//! # use rsdanbooru::client::Client;
//! # #[tokio::main]
//! # async fn main() -> Result<(), rsdanbooru::error::Error> {
//! # let client = Client::danbooru("MyProject/1.0 (by username on Danbooru)")?;
//! let post = client.get_post(6107378).await?;
//!
//! assert_eq!(post.id, 6107378);
//! # Ok(()) }
//! ```
//!
//! Or you can make a search like on the website, using tags:
//!
//! ```no_run
//! # use rsdanbooru::{client::Client, post::Query};
//! # #[tokio::main]
//! # async fn main() -> Result<(), rsdanbooru::error::Error> {
//! # let client = Client::danbooru("MyProject/1.0 (by username on Danbooru)")?;
//! for post in client
//!     .get_posts(Query::new().tags(["cat_ears", "rating:general"]).limit(20))
//!     .await?
//! {
//!     println!("#{}", post.id);
//! }
//! # Ok(()) }
//! ```
//!
//! ## Crawling
//!
//! [`Client::get_all_posts`] walks the pages of a search until the API runs out of results. It
//! stops at the first page that fails, without reporting the error, so its result is best-effort.
//! Use [`Client::post_pages`] to see the errors.
//!
//! Requests are always made one after the other. `rsdanbooru` does no rate limiting, caching or
//! retrying of its own.
//!
//! [`Client`]: client/struct.Client.html
//! [`Client::get_all_posts`]: client/struct.Client.html#method.get_all_posts
//! [`Client::post_pages`]: client/struct.Client.html#method.post_pages

mod utils;

/// Client related structures.
pub mod client;

/// Error management.
pub mod error;

/// Post management.
pub mod post;
