use anyhow::{Context, Result};
use clap::Parser;

use unifeed::{FeedParser, Fetcher, ProxyConfig};

#[derive(Parser, Debug)]
#[command(name = "unifeed", about = "Parse an RSS, Atom, or Sitemap feed into canonical JSON")]
struct Args {
    /// Feed source: an http(s) URL or a filesystem path
    source: String,

    /// Route the request through a forward proxy (host:port)
    #[arg(long, value_name = "HOST:PORT")]
    proxy: Option<String>,

    /// Proxy basic-auth credentials (user:password)
    #[arg(long, value_name = "USER:PASSWORD", requires = "proxy")]
    proxy_auth: Option<String>,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let feed = if args.source.starts_with("http://") || args.source.starts_with("https://") {
        let parser = FeedParser::new();
        let fetcher = match &args.proxy {
            Some(address) => {
                let credentials = args
                    .proxy_auth
                    .as_deref()
                    .map(parse_credentials)
                    .transpose()?;
                let proxy = ProxyConfig {
                    address: address.clone(),
                    credentials,
                };
                Fetcher::with_proxy(parser, &proxy).context("Failed to configure proxy client")?
            }
            None => Fetcher::new(parser).context("Failed to build HTTP client")?,
        };
        fetcher
            .fetch(&args.source)
            .await
            .with_context(|| format!("Failed to fetch feed from {}", args.source))?
    } else {
        let file = std::fs::File::open(&args.source)
            .with_context(|| format!("Failed to open {}", args.source))?;
        FeedParser::new()
            .parse(file)
            .with_context(|| format!("Failed to parse {}", args.source))?
    };

    let json = if args.compact {
        serde_json::to_string(&feed)?
    } else {
        serde_json::to_string_pretty(&feed)?
    };
    println!("{}", json);

    Ok(())
}

fn parse_credentials(raw: &str) -> Result<(String, String)> {
    let (user, password) = raw
        .split_once(':')
        .context("Proxy credentials must be user:password")?;
    Ok((user.to_string(), password.to_string()))
}
