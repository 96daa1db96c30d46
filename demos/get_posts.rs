use rsdanbooru::client::Client;

#[tokio::main]
async fn main() -> rsdanbooru::error::Result<()> {
    simple_logger::init_with_level(log::Level::Debug).ok();

    let client = Client::danbooru("MyProject/1.0 (by username on Danbooru)")?;

    println!("Some very specific posts fetched by ID:");

    for post in client.get_posts_by_id(&[1, 2, 3, 6107378]).await? {
        println!("- #{} with a score of {}", post.id, post.score);
    }

    let post = client.get_random_post().await?;
    println!("And a random one: {}", post.link());

    Ok(())
}
