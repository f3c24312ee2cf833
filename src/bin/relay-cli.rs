use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Read channel history and reactions through a running discord-relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Credential for caller-supplied deployments, sent verbatim (e.g. "Bot abc").
    #[arg(short, long, env = "RELAY_TOKEN")]
    token: Option<String>,

    /// Header the relay reads the credential from.
    #[arg(long, default_value = "authorization")]
    header: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one page of channel message history
    Messages {
        channel: String,
        #[arg(short, long)]
        limit: Option<u32>,
        #[arg(long)]
        before: Option<String>,
        #[arg(long)]
        after: Option<String>,
        #[arg(long)]
        around: Option<String>,
    },
    /// List users who reacted with an emoji
    Reactions {
        channel: String,
        message: String,
        emoji: String,
        #[arg(long)]
        after: Option<String>,
        /// Follow next_page links until exhausted
        #[arg(long)]
        all: bool,
        /// Upper bound on pages fetched with --all
        #[arg(long, default_value_t = 100)]
        max_pages: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            HeaderName::try_from(cli.header.as_str())?,
            HeaderValue::from_str(token)?,
        );
    }

    match cli.command {
        Commands::Messages {
            channel,
            limit,
            before,
            after,
            around,
        } => {
            let mut query: Vec<(&str, String)> = Vec::new();
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }
            for (key, value) in [("before", before), ("after", after), ("around", around)] {
                if let Some(value) = value {
                    query.push((key, value));
                }
            }

            let url = format!(
                "{}/api/v10/channels/{}/messages",
                base,
                urlencoding::encode(&channel)
            );
            let body = fetch(&client, &url, &query, &headers).await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Commands::Reactions {
            channel,
            message,
            emoji,
            after,
            all,
            max_pages,
        } => {
            let url = format!(
                "{}/api/v10/channels/{}/messages/{}/reactions/{}",
                base,
                urlencoding::encode(&channel),
                urlencoding::encode(&message),
                urlencoding::encode(&emoji)
            );
            let query: Vec<(&str, String)> = after.map(|a| ("after", a)).into_iter().collect();

            if !all {
                let page = fetch(&client, &url, &query, &headers).await?;
                println!("{}", serde_json::to_string_pretty(&page)?);
                return Ok(());
            }

            let (users, exhausted) =
                collect_reactions(&client, &url, &query, &headers, max_pages).await?;
            if !exhausted {
                eprintln!("Stopped after {max_pages} pages (--max-pages)");
            }
            println!("{}", serde_json::to_string_pretty(&Value::Array(users))?);
        }
    }

    Ok(())
}

async fn fetch(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
    headers: &HeaderMap,
) -> Result<Value, Box<dyn std::error::Error>> {
    let res = client
        .get(url)
        .query(query)
        .headers(headers.clone())
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        let text = res.text().await?;
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(text);
        return Err(format!("relay returned {status}: {message}").into());
    }
    Ok(res.json().await?)
}

/// Walk `next_page` links from the first reaction page, gathering every
/// reactor. The flag is false when `max_pages` cut the walk short.
async fn collect_reactions(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
    headers: &HeaderMap,
    max_pages: usize,
) -> Result<(Vec<Value>, bool), Box<dyn std::error::Error>> {
    let mut users = Vec::new();
    let mut page = fetch(client, url, query, headers).await?;
    let mut pages = 1;
    loop {
        if let Some(data) = page.get("data").and_then(Value::as_array) {
            users.extend(data.iter().cloned());
        }
        let Some(next) = page.get("next_page").and_then(Value::as_str).map(str::to_string) else {
            return Ok((users, true));
        };
        if pages >= max_pages {
            return Ok((users, false));
        }
        page = fetch(client, &next, &[], headers).await?;
        pages += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    async fn relay_with_two_pages() -> MockServer {
        let relay = MockServer::start().await;
        let second = format!("{}/reactions/wave/page2", relay.uri());
        Mock::given(method("GET"))
            .and(path("/reactions/wave"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "id": "1" }, { "id": "2" }],
                "next_page": second,
            })))
            .mount(&relay)
            .await;
        Mock::given(method("GET"))
            .and(path("/reactions/wave/page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "id": "3" }],
                "next_page": null,
            })))
            .mount(&relay)
            .await;
        relay
    }

    #[tokio::test]
    async fn test_collect_follows_next_page() {
        let relay = relay_with_two_pages().await;
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bot t"));

        let url = format!("{}/reactions/wave", relay.uri());
        let (users, exhausted) = collect_reactions(&client(), &url, &[], &headers, 10)
            .await
            .unwrap();

        assert!(exhausted);
        let ids: Vec<&str> = users.iter().filter_map(|u| u["id"].as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);

        let requests = relay.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.headers.contains_key("authorization")));
    }

    #[tokio::test]
    async fn test_collect_stops_at_max_pages() {
        let relay = relay_with_two_pages().await;
        let url = format!("{}/reactions/wave", relay.uri());
        let (users, exhausted) =
            collect_reactions(&client(), &url, &[], &HeaderMap::new(), 1)
                .await
                .unwrap();

        assert!(!exhausted);
        assert_eq!(users.len(), 2);
        assert_eq!(relay.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_reports_status_for_json_and_plain_errors() {
        let relay = MockServer::start().await;
        Mock::given(path("/json"))
            .and(header("authorization", "Bot t"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "error": "Missing bot token in header: x" })),
            )
            .mount(&relay)
            .await;
        Mock::given(path("/plain"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no route"))
            .mount(&relay)
            .await;

        let client = client();
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bot t"));

        let err = fetch(&client, &format!("{}/json", relay.uri()), &[], &headers)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "relay returned 401 Unauthorized: Missing bot token in header: x"
        );

        let err = fetch(&client, &format!("{}/plain", relay.uri()), &[], &headers)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "relay returned 404 Not Found: no route");
    }
}
