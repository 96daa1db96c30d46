use rsdanbooru::{client::Client, post::Query};

macro_rules! input {
    ($($arg:tt)*) => ({
        use std::io::prelude::*;

        print!($($arg)*);

        let mut buffer = String::new();

        std::io::stdout()
            .flush()
            .and_then(|_| std::io::stdin().read_line(&mut buffer))
            .map(move |_| if buffer.trim().is_empty() {
                None
            } else {
                Some(String::from(buffer.trim()))
            })
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server = rsdanbooru::client::DEFAULT_BASE_URL;
    let server = input!("Server ({}): ", server)?.unwrap_or_else(|| server.into());

    let login = input!("Login (optional): ")?;
    let api_key = login.as_ref().map(|_| input!("API key: "));

    let mut client = Client::new(&server, "MyProject/1.0 (by username on Danbooru)")?;

    if let (Some(login), Some(Ok(Some(api_key)))) = (login, api_key) {
        client.login(login, api_key);
    }

    let tags = input!("Search terms: ")?.unwrap_or_default();

    let posts = client
        .get_posts(Query::new().tags(tags.split_ascii_whitespace()).limit(10))
        .await?;

    for post in posts {
        println!("- #{}: {:?}", post.id, post.file_url.as_ref().map(|u| u.as_str()));
    }

    Ok(())
}
