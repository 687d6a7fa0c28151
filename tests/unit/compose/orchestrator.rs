use async_trait::async_trait;

use super::*;
use crate::fetch::StaticAssetFetcher;
use crate::store::memory::MemoryArtifactStore;

fn clip(w: u32, h: u32) -> Vec<u8> {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}"><rect width="{w}" height="{h}" fill="#00ff00"/></svg>"##
    )
    .into_bytes()
}

fn refs(raw: &[&str]) -> Vec<AssetRef> {
    raw.iter().map(|r| AssetRef::parse(r).unwrap()).collect()
}

fn gallery() -> StaticAssetFetcher {
    StaticAssetFetcher::new()
        .with_asset("mem://clip/a.svg", clip(100, 50))
        .unwrap()
        .with_asset("mem://clip/b.svg", clip(60, 80))
        .unwrap()
        .with_asset("mem://clip/c.svg", clip(100, 100))
        .unwrap()
}

struct FailingStore;

#[async_trait]
impl ArtifactStore for FailingStore {
    async fn store(&self, _: Vec<u8>, name: &str, _: &str) -> DrapeResult<String> {
        Err(DrapeError::storage(format!("bucket unavailable for {name}")))
    }
}

struct SlowStore(Duration);

#[async_trait]
impl ArtifactStore for SlowStore {
    async fn store(&self, _: Vec<u8>, name: &str, _: &str) -> DrapeResult<String> {
        tokio::time::sleep(self.0).await;
        Ok(format!("slow://{name}"))
    }
}

#[tokio::test]
async fn combines_and_stores_exactly_two_artifacts() {
    let fetcher = Arc::new(gallery());
    let store = Arc::new(MemoryArtifactStore::new());
    let composer = Composer::new(fetcher.clone(), store.clone(), ComposeOpts::default());

    let urls = composer
        .combine_and_upload(
            &refs(&["mem://clip/a.svg", "mem://clip/b.svg", "mem://clip/c.svg"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(fetcher.calls(), 3);
    assert_eq!(store.len(), 2);
    assert!(urls.svg_url.ends_with(".svg"));
    assert!(urls.png_url.ends_with(".png"));
    assert_eq!(
        urls.svg_url.trim_end_matches(".svg"),
        urls.png_url.trim_end_matches(".png")
    );

    let svg_name = urls.svg_url.trim_start_matches("mem://");
    let svg = store.get(svg_name).unwrap();
    assert_eq!(svg.content_type, SVG_CONTENT_TYPE);
    let text = String::from_utf8(svg.bytes).unwrap();
    assert!(text.contains(r#"viewBox="0 0 100 230""#));
    assert!(text.contains("translate(20, 50)"));
    assert!(text.contains("translate(0, 130)"));

    let png = store.get(urls.png_url.trim_start_matches("mem://")).unwrap();
    assert_eq!(png.content_type, PNG_CONTENT_TYPE);
    let decoded = image::load_from_memory(&png.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (100, 230));
}

#[tokio::test]
async fn empty_selection_makes_no_calls() {
    let fetcher = Arc::new(gallery());
    let store = Arc::new(MemoryArtifactStore::new());
    let composer = Composer::new(fetcher.clone(), store.clone(), ComposeOpts::default());

    let err = composer
        .combine_and_upload(&[], &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DrapeError::Input(_)));
    assert_eq!(fetcher.calls(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn fetch_failure_persists_nothing() {
    let store = Arc::new(MemoryArtifactStore::new());
    let composer = Composer::new(Arc::new(gallery()), store.clone(), ComposeOpts::default());
    let err = composer
        .combine_and_upload(
            &refs(&["mem://clip/a.svg", "mem://clip/missing.svg"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DrapeError::Network(_)));
    assert!(err.is_retryable());
    assert!(store.is_empty());
}

#[tokio::test]
async fn unusable_inputs_are_a_composition_failure() {
    let store = Arc::new(MemoryArtifactStore::new());
    let composer = Composer::new(
        Arc::new(StaticAssetFetcher::new()),
        store.clone(),
        ComposeOpts::default(),
    );
    let err = composer
        .compose_and_store(
            vec![b"not svg".to_vec(), vec![0xff, 0xfe, 0x00]],
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DrapeError::Composition(_)));
    assert!(store.is_empty());
}

#[tokio::test]
async fn raster_failure_persists_nothing() {
    let store = Arc::new(MemoryArtifactStore::new());
    let composer = Composer::new(
        Arc::new(StaticAssetFetcher::new()),
        store.clone(),
        ComposeOpts::default(),
    );
    // Content the compositor accepts but an XML parser does not.
    let doc = br#"<svg viewBox="0 0 10 10"><g><rect></svg>"#.to_vec();
    let err = composer
        .compose_and_store(vec![doc], &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DrapeError::Rasterization(_)));
    assert!(store.is_empty());
}

#[tokio::test]
async fn storage_failure_propagates() {
    let composer = Composer::new(
        Arc::new(gallery()),
        Arc::new(FailingStore),
        ComposeOpts::default(),
    );
    let err = composer
        .combine_and_upload(&refs(&["mem://clip/a.svg"]), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DrapeError::Storage(_)));
}

#[tokio::test]
async fn slow_upload_times_out_as_retryable() {
    let opts = ComposeOpts {
        upload_timeout: Duration::from_millis(50),
        ..ComposeOpts::default()
    };
    let composer = Composer::new(
        Arc::new(gallery()),
        Arc::new(SlowStore(Duration::from_secs(5))),
        opts,
    );
    let err = composer
        .combine_and_upload(&refs(&["mem://clip/a.svg"]), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DrapeError::Timeout {
            stage: Stage::Upload,
            millis: 50
        }
    ));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn cancellation_abandons_fetches() {
    let fetcher = Arc::new(gallery().with_delay(Duration::from_secs(10)));
    let store = Arc::new(MemoryArtifactStore::new());
    let composer = Composer::new(fetcher.clone(), store.clone(), ComposeOpts::default());
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let err = composer
        .combine_and_upload(&refs(&["mem://clip/a.svg", "mem://clip/b.svg"]), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, DrapeError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(store.is_empty());
}

#[tokio::test]
async fn pre_cancelled_token_returns_before_storing() {
    let store = Arc::new(MemoryArtifactStore::new());
    let composer = Composer::new(
        Arc::new(StaticAssetFetcher::new()),
        store.clone(),
        ComposeOpts::default(),
    );
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = composer
        .compose_and_store(vec![clip(10, 10)], &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, DrapeError::Cancelled));
    assert!(store.is_empty());
}

/// A composite big enough that rendering and encoding take well over a few milliseconds.
fn poster() -> Vec<u8> {
    let mut body = String::new();
    for i in 0..200 {
        body.push_str(&format!(
            r##"<circle cx="{}" cy="{}" r="{}" fill="#{:06x}" opacity="0.5"/>"##,
            (i * 37) % 4000,
            (i * 53) % 3000,
            50 + i * 3,
            i * 4099
        ));
    }
    format!(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 4000 3000">{body}</svg>"#)
        .into_bytes()
}

#[tokio::test]
async fn slow_rasterization_times_out_separately_from_upload() {
    let store = Arc::new(MemoryArtifactStore::new());
    let opts = ComposeOpts {
        raster_timeout: Duration::from_millis(1),
        ..ComposeOpts::default()
    };
    let composer = Composer::new(Arc::new(StaticAssetFetcher::new()), store.clone(), opts);
    let err = composer
        .compose_and_store(vec![poster()], &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DrapeError::Timeout {
            stage: Stage::Rasterize,
            millis: 1
        }
    ));
    assert!(err.is_retryable());
    assert!(store.is_empty());
}

#[tokio::test]
async fn cancellation_during_rasterization_persists_nothing() {
    let store = Arc::new(MemoryArtifactStore::new());
    let composer = Composer::new(
        Arc::new(StaticAssetFetcher::new()),
        store.clone(),
        ComposeOpts::default(),
    );
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        trigger.cancel();
    });

    let err = composer
        .compose_and_store(vec![poster()], &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, DrapeError::Cancelled));
    assert!(store.is_empty());
}
