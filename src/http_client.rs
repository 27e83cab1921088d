use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client. Transport defaults apply; nothing is retried.
pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .build()
            .context("failed to build http client")
    })
}

pub fn fetch_json(client: &Client, url: &str, extra_headers: &[(&str, &str)]) -> Result<String> {
    let mut req = client
        .get(url)
        .header(USER_AGENT, concat!("bet_analyser/", env!("CARGO_PKG_VERSION")))
        .header(ACCEPT, "application/json");
    for (name, value) in extra_headers {
        req = req.header(*name, *value);
    }

    let resp = req.send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        let snippet: String = body.chars().take(200).collect();
        return Err(anyhow::anyhow!("http {}: {}", status, snippet));
    }
    Ok(body)
}
