//! Chromium-backed [`PageDriver`] built on chromiumoxide.
//!
//! Finding the browser executable follows the usual ladder: the
//! `CHROMIUM_PATH` environment variable, well-known install paths per
//! platform, `which`, and finally a managed download into the cache
//! directory.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use tokio::task::{self, JoinHandle};
use tracing::{info, trace, warn};

use super::PageDriver;

/// [`PageDriver`] over a live CDP page.
#[derive(Debug)]
pub struct CdpDriver {
    page: Page,
}

impl CdpDriver {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

impl PageDriver for CdpDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("navigating to {url}"))?;
        Ok(())
    }

    async fn wait_until_loaded(&self) -> Result<String> {
        self.page
            .wait_for_navigation()
            .await
            .context("waiting for page load")?;
        let url = self
            .page
            .url()
            .await
            .context("reading page url")?
            .unwrap_or_default();
        Ok(url)
    }

    async fn run_script(&self, script: &str) -> Result<serde_json::Value> {
        let value = self
            .page
            .evaluate(script)
            .await
            .context("evaluating page script")?
            .into_value::<serde_json::Value>()
            .context("decoding script result")?;
        Ok(value)
    }
}

/// Locates a Chrome/Chromium executable on the system.
pub async fn find_browser_executable() -> Result<PathBuf> {
    // Environment variable overrides everything else.
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("using browser from CHROMIUM_PATH: {}", path.display());
            return Ok(path);
        }
        warn!("CHROMIUM_PATH points to a non-existent file: {}", path.display());
    }

    let paths: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    for path_str in paths {
        let path = if let Some(rest) = path_str.strip_prefix("~/") {
            match dirs::home_dir() {
                Some(home) => home.join(rest),
                None => continue,
            }
        } else {
            PathBuf::from(path_str)
        };
        if path.exists() {
            info!("found browser at {}", path.display());
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in ["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path_str.is_empty() {
                    let path = PathBuf::from(path_str);
                    info!("found browser via which: {}", path.display());
                    return Ok(path);
                }
            }
        }
    }

    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Downloads a managed Chromium build into the user cache directory and
/// returns its executable path.
pub async fn download_managed_browser() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("inhash-crawler")
        .join("chromium");
    std::fs::create_dir_all(&cache_dir).context("creating browser cache directory")?;

    info!("downloading managed Chromium into {}", cache_dir.display());
    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("building fetcher options")?,
    );
    let revision_info = fetcher.fetch().await.context("fetching browser")?;
    info!("downloaded Chromium to {}", revision_info.folder_path.display());
    Ok(revision_info.executable_path)
}

/// Launches a browser instance and spawns its CDP event handler task.
///
/// The portal renders fine headless, but manual-login flows need a visible
/// window, so headless is a parameter rather than a constant.
pub async fn launch_browser(headless: bool) -> Result<(Browser, JoinHandle<()>)> {
    let chrome_path = match find_browser_executable().await {
        Ok(path) => path,
        Err(_) => download_managed_browser().await?,
    };

    let user_data_dir =
        std::env::temp_dir().join(format!("inhash_chrome_{}", std::process::id()));
    std::fs::create_dir_all(&user_data_dir).context("creating user data directory")?;

    let mut config_builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(1280, 900)
        .user_data_dir(user_data_dir)
        .chrome_executable(chrome_path);

    config_builder = if headless {
        config_builder.headless_mode(HeadlessMode::default())
    } else {
        config_builder.with_head()
    };

    config_builder = config_builder
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--disable-notifications")
        .arg("--disable-background-networking")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--no-sandbox")
        .arg("--mute-audio");

    let browser_config = config_builder
        .build()
        .map_err(|e| anyhow::anyhow!("building browser config: {e}"))?;

    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("launching browser")?;

    let handler_task = task::spawn(async move {
        while let Some(h) = handler.next().await {
            if let Err(e) = h {
                let message = e.to_string();
                // Chrome emits CDP events chromiumoxide does not model; the
                // resulting deserialization failures are harmless.
                // See chromiumoxide issues #167 and #229.
                let benign = message
                    .contains("data did not match any variant of untagged enum Message")
                    || message.contains("Failed to deserialize WS response");
                if benign {
                    trace!("suppressed benign CDP serialization error: {message}");
                } else {
                    warn!("browser handler error: {message}");
                }
            }
        }
        trace!("browser handler task completed");
    });

    Ok((browser, handler_task))
}
