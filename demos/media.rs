use rsdanbooru::client::Client;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    simple_logger::init_with_level(log::Level::Info).ok();

    let client = Client::danbooru("MyProject/1.0 (by username on Danbooru)")?
        .timeout(std::time::Duration::from_secs(30));

    let id = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(6107378);

    let post = client.get_post(id).await?;
    let bytes = post.get_media(&client, true).await?;

    let filename = post.filename().unwrap_or_else(|| format!("{}.bin", post.id));
    std::fs::write(&filename, &bytes)?;

    println!("saved {} ({} bytes)", filename, bytes.len());

    Ok(())
}
