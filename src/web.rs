use std::net::SocketAddr;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tokio::time::{Duration, interval};
use tracing::{debug, error, info, warn};

use crate::constants::{KEEP_ALIVE_INTERVAL_SECS, LIVENESS_BODY};

async fn liveness() -> &'static str {
    LIVENESS_BODY
}

fn router() -> Router {
    Router::new().route("/", get(liveness))
}

/// Serve the liveness endpoint on all interfaces in the background
pub async fn start_liveness_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Web server started on port {}", port);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router()).await {
            error!("Web server stopped: {}", e);
        }
    });

    Ok(())
}

/// URL pinged to keep the hosting platform from idling the service
pub fn keep_alive_url(public_domain: &str) -> String {
    let domain = public_domain
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    format!("https://{}/", domain)
}

/// Shared outbound client; every request gives up after `timeout`
pub fn build_http_client(
    timeout: Duration,
    connect_timeout: Duration,
) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .build()
}

/// Periodically request our own public URL
pub fn start_keep_alive(http: reqwest::Client, public_domain: String) {
    let url = keep_alive_url(&public_domain);
    info!("Keep-alive enabled for {}", url);

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(KEEP_ALIVE_INTERVAL_SECS));
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match http.get(&url).send().await {
                Ok(resp) => debug!("Keep-alive ping answered {}", resp.status()),
                Err(e) => warn!("Keep-alive ping failed: {}", e),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_alive_url() {
        assert_eq!(keep_alive_url("bot.up.railway.app"), "https://bot.up.railway.app/");
        assert_eq!(
            keep_alive_url("https://bot.up.railway.app/"),
            "https://bot.up.railway.app/"
        );
    }

    #[tokio::test]
    async fn test_http_client_gives_up_on_silent_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and never answer
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let client =
            build_http_client(Duration::from_millis(300), Duration::from_millis(300)).unwrap();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            client.get(format!("http://{}/", addr)).send(),
        )
        .await
        .expect("client timeout should fire before the outer one");

        let err = result.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_liveness_endpoint() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router()).await.unwrap();
        });

        let response = reqwest::get(format!("http://{}/", addr)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "Bot is running!");
    }
}
