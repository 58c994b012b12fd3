// src/status/browser.rs
//
// Fallback used where the registry's anti-automation heuristics block the
// direct path. Renders the endpoint through headless Chrome so the request
// carries a real browser fingerprint, then parses the rendered body text as
// JSON. Far slower than the direct path; selected only by configuration.
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions};
use serde_json::Value;
use tokio::task;

pub async fn fetch(base_url: &str, server_id: &str, timeout: Duration) -> Result<Value, String> {
    let url = super::endpoint(base_url, server_id);

    // Chrome's API is blocking; keep it off the runtime threads so other
    // connections' ticks are not starved while a page renders.
    task::spawn_blocking(move || render_and_parse(&url, timeout))
        .await
        .map_err(|e| format!("browser task failed: {}", e))?
}

fn render_and_parse(url: &str, timeout: Duration) -> Result<Value, String> {
    let options = LaunchOptions::default_builder()
        .headless(true)
        .build()
        .map_err(|e| format!("invalid launch options: {}", e))?;

    // Browser kills the Chrome process when dropped, so every early return
    // below still tears it down.
    let browser = Browser::new(options).map_err(|e| format!("chrome launch failed: {}", e))?;

    let tab = browser
        .new_tab()
        .map_err(|e| format!("failed to open tab: {}", e))?;
    tab.set_default_timeout(timeout);

    tab.navigate_to(url)
        .map_err(|e| format!("navigation to {} failed: {}", url, e))?;
    tab.wait_until_navigated()
        .map_err(|e| format!("navigation to {} timed out: {}", url, e))?;

    let body = tab
        .wait_for_element("body")
        .and_then(|element| element.get_inner_text())
        .map_err(|e| format!("failed to read rendered body: {}", e))?;

    parse_status_body(&body)
}

fn parse_status_body(body: &str) -> Result<Value, String> {
    serde_json::from_str(body.trim()).map_err(|e| format!("rendered body is not JSON: {}", e))
}
