use eye_core::{load_glb, AssetError, LoadedAsset};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

async fn fetch_bytes(url: &str) -> anyhow::Result<Vec<u8>> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let resp = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .dyn_into::<web::Response>()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    if !resp.ok() {
        anyhow::bail!("HTTP {} for {}", resp.status(), url);
    }
    let buf = JsFuture::from(resp.array_buffer().map_err(|e| anyhow::anyhow!("{:?}", e))?)
        .await
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

/// Fetch and decode the model. Transport failures are folded into
/// `AssetError::Unavailable` so the scene sees a single load outcome.
pub async fn load_model(url: &str) -> Result<LoadedAsset, AssetError> {
    let bytes = fetch_bytes(url)
        .await
        .map_err(|e| AssetError::Unavailable(e.to_string()))?;
    log::info!("[asset] {}: {} bytes, 100% loaded", url, bytes.len());
    load_glb(&bytes)
}
