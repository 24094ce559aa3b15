use anyhow::{anyhow, Result};
use log::debug;
use mockito::Server;
use reqwest::{header::LOCATION, redirect::Policy, Client, StatusCode};
use std::{
    net::SocketAddr,
    process::{Child, Command, Stdio},
    sync::Once,
    time::Duration,
};
use tokio::net::{TcpListener, TcpStream};

const UBR_SERVER: &str = env!("CARGO_BIN_EXE_ubr-server");

// These tests run an executable, so `test_log` has nothing to hook into for the server itself. This
// captures the test's own logging.
fn init_logging() {
    static INIT_LOGGING: Once = Once::new();
    INIT_LOGGING.call_once(|| {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    });
}

// Kills the server when a test ends, even if it panics.
struct Running(Child);

impl Drop for Running {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

async fn free_port() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    Ok(listener.local_addr()?.port())
}

async fn wait_for(addr: SocketAddr) -> Result<()> {
    for _ in 0..100 {
        if TcpStream::connect(addr).await.is_ok() {
            debug!("ubr-server is listening on {addr}");
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    Err(anyhow!("ubr-server never started listening on {addr}"))
}

#[tokio::test]
async fn serves_redirects_on_port_from_env() -> Result<()> {
    init_logging();

    let mut upstream = Server::new_async().await;
    let m = upstream
        .mock("GET", "/repos/octocat/hello-world/releases/latest")
        .with_status(200)
        .with_body(
            r#"{"assets": [{
                "name": "hello-world-linux-amd64.tar.gz",
                "content_type": "application/gzip",
                "browser_download_url": "https://example.com/file.tar.gz"
            }]}"#,
        )
        .create_async()
        .await;

    let port = free_port().await?;
    let _server = Running(
        Command::new(UBR_SERVER)
            .env("PORT", port.to_string())
            .env("UBR_API_BASE_URL", upstream.url())
            .env("UBR_LOG_LEVEL", "debug")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?,
    );
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    wait_for(addr).await?;

    let resp = Client::builder()
        .redirect(Policy::none())
        .build()?
        .get(format!("http://{addr}/octocat/hello-world/gzip/linux"))
        .send()
        .await?;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers()
            .get(LOCATION)
            .map(|v| v.to_str())
            .transpose()?,
        Some("https://example.com/file.tar.gz"),
    );
    m.assert_async().await;

    Ok(())
}

#[test]
fn invalid_port_exits_with_config_error() -> Result<()> {
    init_logging();

    let output = Command::new(UBR_SERVER)
        .env("PORT", "not-a-port")
        .stdout(Stdio::null())
        .output()?;

    assert_eq!(output.status.code(), Some(127));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(
        stderr.contains("the PORT environment variable must be a port number"),
        "stderr = {stderr}",
    );

    Ok(())
}

#[test]
fn invalid_api_base_url_exits_with_config_error() -> Result<()> {
    init_logging();

    for url in ["api.github.com", "mailto:someone@example.com"] {
        debug!("running ubr-server with UBR_API_BASE_URL={url}");
        let output = Command::new(UBR_SERVER)
            .env("PORT", "0")
            .env("UBR_API_BASE_URL", url)
            .stdout(Stdio::null())
            .output()?;

        assert_eq!(output.status.code(), Some(127), "{url}");
        let stderr = String::from_utf8(output.stderr)?;
        assert!(
            stderr.contains("the UBR_API_BASE_URL environment variable"),
            "stderr = {stderr}",
        );
    }

    Ok(())
}
