use rsdanbooru::{client::Client, post::Query};

#[tokio::main]
async fn main() -> rsdanbooru::error::Result<()> {
    let client = Client::danbooru("MyProject/1.0 (by username on Danbooru)")?;

    println!("Cat ears, pages 1 to 3:");

    let posts = client
        .get_posts_pages(Query::new().tags(["cat_ears", "rating:general"]).limit(20), 1, 3)
        .await?;

    for post in &posts {
        println!("- #{}: {:?}", post.id, post.media_url());
    }

    println!("Every post of a small tag, up to 50:");

    let posts = client
        .get_all_posts(Query::new().tags(["hatsune_miku_(append)", "order:score"]).limit(50))
        .await;

    println!("{} posts (may be incomplete)", posts.len());

    Ok(())
}
