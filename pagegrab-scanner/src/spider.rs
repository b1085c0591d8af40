use crate::error::{Result, ScanError};
use crate::extract::{ResourceRef, extract_api_calls, extract_resources};
use crate::paths::{api_response_path, local_path};
use crate::result::{ItemKind, ItemOutcome, SpiderReport};
use crate::well_known::{WELL_KNOWN_FILES, well_known_url};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::Html;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("pagegrab/", env!("CARGO_PKG_VERSION"));

/// Progress notifications emitted while a page is being grabbed
#[derive(Debug, Clone)]
pub enum SpiderEvent {
    PageFetched { url: String, bytes: u64 },
    Discovered { resources: usize, api_calls: usize },
    ItemStarted { kind: ItemKind, url: String },
    ItemFinished(ItemOutcome),
}

pub type ProgressCallback = Arc<dyn Fn(SpiderEvent) + Send + Sync>;

/// A resource body fetched but not yet written
struct Download {
    url: Url,
    target: PathBuf,
    start: Instant,
    body: Result<(u16, Vec<u8>)>,
}

enum WellKnownFetch {
    Saved { status_code: u16, bytes: u64 },
    Missing { status_code: u16 },
}

/// Fetches one page and everything it points at into `output_dir`.
///
/// A single pooled client is shared by every request of a run. Only the
/// page fetch itself can fail the run; each resource, API call and
/// well-known file is isolated and reported through its [`ItemOutcome`].
pub struct Spider {
    client: Client,
    output_dir: PathBuf,
    workers: usize,
    progress_callback: Option<ProgressCallback>,
}

impl Spider {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_timeout(output_dir, None)
    }

    pub fn with_timeout(output_dir: impl Into<PathBuf>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(10));

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout).connect_timeout(timeout);
        }

        Ok(Self::with_client(builder.build()?, output_dir))
    }

    pub fn with_client(client: Client, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            output_dir: output_dir.into(),
            workers: 1,
            progress_callback: None,
        }
    }

    /// Bound on concurrent fetches within the API and resource stages.
    /// One means strictly sequential.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub async fn spider(&self, page: &Url) -> Result<SpiderReport> {
        let started = Instant::now();
        info!("Starting grab of {} into {}", page, self.output_dir.display());

        fs::create_dir_all(&self.output_dir).await?;

        let html = self
            .get_text(page)
            .await
            .map_err(|source| ScanError::PageFetch {
                url: page.to_string(),
                source,
            })?;

        let mut report = SpiderReport::new(page.to_string(), self.output_dir.clone());
        report.page_bytes = html.len() as u64;
        self.emit(SpiderEvent::PageFetched {
            url: page.to_string(),
            bytes: report.page_bytes,
        });

        // Html is not Send, keep it out of the await points below
        let resources = {
            let document = Html::parse_document(&html);
            extract_resources(&document, page)
        };
        let api_calls = extract_api_calls(&html, page);

        info!(
            "Found {} resources and {} API calls on {}",
            resources.len(),
            api_calls.len(),
            page
        );
        self.emit(SpiderEvent::Discovered {
            resources: resources.len(),
            api_calls: api_calls.len(),
        });

        report.api_calls = stream::iter(api_calls)
            .map(|url| self.call_api(url))
            .buffered(self.workers)
            .collect()
            .await;

        // Downloads overlap but writes land in discovery order, so a path
        // shared by two resources always ends up with the later one.
        let mut downloads = stream::iter(resources)
            .map(|resource| self.download_resource(resource, page))
            .buffered(self.workers);
        let mut written: HashMap<PathBuf, String> = HashMap::new();
        while let Some(download) = downloads.next().await {
            let outcome = self.store_resource(download, &mut written).await;
            report.resources.push(outcome);
        }

        for file in WELL_KNOWN_FILES {
            let outcome = self.pull_well_known(page, file).await;
            report.well_known.push(outcome);
        }

        report.elapsed = started.elapsed();
        info!(
            "Grab of {} complete in {:?}: {} failed items",
            page,
            report.elapsed,
            report.failed_count()
        );

        Ok(report)
    }

    async fn call_api(&self, url: Url) -> ItemOutcome {
        info!("Calling API: {}", url);
        self.emit(SpiderEvent::ItemStarted {
            kind: ItemKind::ApiCall,
            url: url.to_string(),
        });

        let target = api_response_path(&self.output_dir);
        let start = Instant::now();
        let result = self.fetch_to_file(&url, &target).await;

        self.finish(url, ItemKind::ApiCall, target, start, result)
    }

    async fn download_resource(&self, resource: ResourceRef, page: &Url) -> Download {
        let ResourceRef { url, kind } = resource;
        info!("Downloading: {}", url);
        debug!("{} came from {:?}", url, kind);
        self.emit(SpiderEvent::ItemStarted {
            kind: ItemKind::Resource,
            url: url.to_string(),
        });

        let target = local_path(&self.output_dir, &url, page);
        let start = Instant::now();
        let body = self.fetch_bytes(&url).await;

        Download {
            url,
            target,
            start,
            body,
        }
    }

    async fn store_resource(
        &self,
        download: Download,
        written: &mut HashMap<PathBuf, String>,
    ) -> ItemOutcome {
        let Download {
            url,
            target,
            start,
            body,
        } = download;

        let result = match body {
            Ok((status_code, body)) => write_body(&target, &body)
                .await
                .map(|bytes| (status_code, bytes)),
            Err(e) => Err(e),
        };

        let replaces = if result.is_ok() {
            written.insert(target.clone(), url.to_string())
        } else {
            None
        };
        if let Some(ref previous) = replaces {
            warn!("{} overwrote {} at {}", url, previous, target.display());
        }

        let mut outcome = self.outcome(url, ItemKind::Resource, target, result);
        outcome.response_time = start.elapsed();
        outcome.replaces = replaces;

        self.emit(SpiderEvent::ItemFinished(outcome.clone()));
        outcome
    }

    /// Try `file` at the origin root of `page`. A non-success answer is
    /// recorded as missing rather than failed.
    pub async fn pull_well_known(&self, page: &Url, file: &str) -> ItemOutcome {
        let url = match well_known_url(page, file) {
            Ok(url) => url,
            Err(e) => {
                warn!("Failed to download {}: {}", file, e);
                let outcome = ItemOutcome::with_error(file.to_string(), ItemKind::WellKnown, e.to_string());
                self.emit(SpiderEvent::ItemFinished(outcome.clone()));
                return outcome;
            }
        };

        info!("Checking for {} at: {}", file, url);
        self.emit(SpiderEvent::ItemStarted {
            kind: ItemKind::WellKnown,
            url: url.to_string(),
        });

        let target = self.output_dir.join(file);
        let start = Instant::now();

        let mut outcome = match self.fetch_well_known(&url, &target).await {
            Ok(WellKnownFetch::Saved { status_code, bytes }) => {
                info!("{} saved to: {}", file, target.display());
                let mut outcome = ItemOutcome::saved(url.to_string(), ItemKind::WellKnown, target, bytes);
                outcome.status_code = Some(status_code);
                outcome
            }
            Ok(WellKnownFetch::Missing { status_code }) => {
                info!("No {} file found ({})", file, status_code);
                ItemOutcome::missing(url.to_string(), ItemKind::WellKnown, status_code)
            }
            Err(e) => {
                warn!("Failed to download {}: {}", file, e);
                ItemOutcome::with_error(url.to_string(), ItemKind::WellKnown, e.to_string())
            }
        };
        outcome.response_time = start.elapsed();

        self.emit(SpiderEvent::ItemFinished(outcome.clone()));
        outcome
    }

    fn finish(
        &self,
        url: Url,
        kind: ItemKind,
        target: PathBuf,
        start: Instant,
        result: Result<(u16, u64)>,
    ) -> ItemOutcome {
        let mut outcome = self.outcome(url, kind, target, result);
        outcome.response_time = start.elapsed();

        self.emit(SpiderEvent::ItemFinished(outcome.clone()));
        outcome
    }

    fn outcome(
        &self,
        url: Url,
        kind: ItemKind,
        target: PathBuf,
        result: Result<(u16, u64)>,
    ) -> ItemOutcome {
        match result {
            Ok((status_code, bytes)) => {
                info!("Saved to: {}", target.display());
                let mut outcome = ItemOutcome::saved(url.to_string(), kind, target, bytes);
                outcome.status_code = Some(status_code);
                outcome
            }
            Err(e) => {
                warn!("Failed to process {}: {}", url, e);
                let status_code = match &e {
                    ScanError::HttpError(http) => http.status().map(|s| s.as_u16()),
                    _ => None,
                };
                let mut outcome = ItemOutcome::with_error(url.to_string(), kind, e.to_string());
                outcome.status_code = status_code;
                outcome
            }
        }
    }

    async fn get_text(&self, url: &Url) -> reqwest::Result<String> {
        debug!("Fetching {}", url);
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        response.text().await
    }

    async fn fetch_to_file(&self, url: &Url, target: &Path) -> Result<(u16, u64)> {
        let (status_code, body) = self.fetch_bytes(url).await?;
        let bytes = write_body(target, &body).await?;
        Ok((status_code, bytes))
    }

    /// GET `url` for its raw body. Non-success statuses are errors.
    async fn fetch_bytes(&self, url: &Url) -> Result<(u16, Vec<u8>)> {
        debug!("Fetching {}", url);
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        let status_code = response.status().as_u16();
        let body = response.bytes().await?;
        Ok((status_code, body.to_vec()))
    }

    async fn fetch_well_known(&self, url: &Url, target: &Path) -> Result<WellKnownFetch> {
        debug!("Fetching {}", url);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Ok(WellKnownFetch::Missing {
                status_code: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        fs::write(target, &body).await?;

        Ok(WellKnownFetch::Saved {
            status_code: status.as_u16(),
            bytes: body.len() as u64,
        })
    }

    fn emit(&self, event: SpiderEvent) {
        if let Some(ref callback) = self.progress_callback {
            callback(event);
        }
    }
}

/// Write `body` to `target`, creating parent directories first.
async fn write_body(target: &Path, body: &[u8]) -> Result<u64> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(target, body).await?;
    Ok(body.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ItemStatus;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];

    async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(response)
            .mount(server)
            .await;
    }

    fn html(body: String) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/html")
            .set_body_string(body)
    }

    fn json_files(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| p.extension().is_some_and(|e| e == "json"))
            .collect()
    }

    /// Page at /index with an image, a same-origin link, a cross-origin
    /// link and one inline API call.
    #[tokio::test]
    async fn test_end_to_end_single_page() {
        let mock_server = MockServer::start().await;
        let page_html = format!(
            r#"<html><head>
                <script>self.fetchTextDataAsync(`/api/data`, (text) => render(text));</script>
            </head><body>
                <img src="/img/a.png">
                <a href="{}/about">About</a>
                <a href="https://other.com/x">Elsewhere</a>
            </body></html>"#,
            mock_server.uri()
        );

        mount(&mock_server, "/index", html(page_html)).await;
        mount(&mock_server, "/img/a.png", ResponseTemplate::new(200).set_body_bytes(PNG_BYTES)).await;
        mount(&mock_server, "/about", html("<html><body>About us</body></html>".to_string())).await;
        mount(&mock_server, "/api/data", ResponseTemplate::new(200).set_body_string(r#"{"items":[1,2,3]}"#)).await;
        mount(&mock_server, "/robots.txt", ResponseTemplate::new(200).set_body_string("User-agent: *\n")).await;

        let temp = TempDir::new().unwrap();
        let out = temp.path().join("DownloadedResources");
        let spider = Spider::new(&out).unwrap();
        let page = Url::parse(&format!("{}/index", mock_server.uri())).unwrap();

        let report = spider.spider(&page).await.unwrap();

        assert_eq!(std::fs::read(out.join("img/a.png")).unwrap(), PNG_BYTES);
        assert_eq!(
            std::fs::read_to_string(out.join("about.html")).unwrap(),
            "<html><body>About us</body></html>"
        );

        let json = json_files(&out);
        assert_eq!(json.len(), 1, "expected exactly one API response file");
        assert_eq!(std::fs::read_to_string(&json[0]).unwrap(), r#"{"items":[1,2,3]}"#);

        assert_eq!(std::fs::read_to_string(out.join("robots.txt")).unwrap(), "User-agent: *\n");
        assert!(!out.join("sitemap.xml").exists());
        assert!(!out.join("favicon.ico").exists());

        assert_eq!(report.resources.len(), 2);
        assert!(report.resources.iter().all(|o| !o.url.contains("other.com")));
        assert_eq!(report.count(ItemKind::Resource, ItemStatus::Saved), 2);
        assert_eq!(report.count(ItemKind::ApiCall, ItemStatus::Saved), 1);
        assert_eq!(report.count(ItemKind::WellKnown, ItemStatus::Saved), 1);
        assert_eq!(report.count(ItemKind::WellKnown, ItemStatus::Missing), 3);
        assert!(!report.has_failures());
    }

    #[tokio::test]
    async fn test_page_failure_short_circuits_everything() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "/index", ResponseTemplate::new(500)).await;

        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        let spider = Spider::new(&out).unwrap();
        let page = Url::parse(&format!("{}/index", mock_server.uri())).unwrap();

        let result = spider.spider(&page).await;
        assert!(matches!(result, Err(ScanError::PageFetch { .. })));

        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);

        // Only the page itself was requested, no well-known files
        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.path(), "/index");
    }

    #[tokio::test]
    async fn test_unreachable_page_is_fatal() {
        let temp = TempDir::new().unwrap();
        let spider = Spider::with_timeout(temp.path(), Some(Duration::from_secs(5))).unwrap();
        let page = Url::parse("http://127.0.0.1:1/index").unwrap();

        let err = spider.spider(&page).await.unwrap_err();
        assert!(err.to_string().contains("http://127.0.0.1:1/index"));
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_one_failing_item_does_not_stop_the_batch() {
        let mock_server = MockServer::start().await;
        let page_html = r#"<html><body>
                <script>self.fetchTextDataAsync(`/api/broken`, cb);</script>
                <script>self.fetchTextDataAsync(`/api/ok`, cb);</script>
                <img src="/one.png"><img src="/two.png"><img src="/three.png">
            </body></html>"#;

        mount(&mock_server, "/", html(page_html.to_string())).await;
        mount(&mock_server, "/api/broken", ResponseTemplate::new(503)).await;
        mount(&mock_server, "/api/ok", ResponseTemplate::new(200).set_body_string("[]")).await;
        mount(&mock_server, "/one.png", ResponseTemplate::new(200).set_body_bytes(PNG_BYTES)).await;
        mount(&mock_server, "/two.png", ResponseTemplate::new(500)).await;
        mount(&mock_server, "/three.png", ResponseTemplate::new(200).set_body_bytes(PNG_BYTES)).await;
        mount(&mock_server, "/favicon.ico", ResponseTemplate::new(200).set_body_bytes(PNG_BYTES)).await;

        let temp = TempDir::new().unwrap();
        let spider = Spider::new(temp.path()).unwrap();
        let page = Url::parse(&mock_server.uri()).unwrap();

        let report = spider.spider(&page).await.unwrap();

        let statuses: Vec<ItemStatus> = report.resources.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![ItemStatus::Saved, ItemStatus::Failed, ItemStatus::Saved]
        );
        assert_eq!(report.resources[1].status_code, Some(500));
        assert!(report.resources[1].error.is_some());
        assert!(!temp.path().join("two.png").exists());
        assert!(temp.path().join("three.png").exists());

        assert_eq!(report.api_calls[0].status, ItemStatus::Failed);
        assert_eq!(report.api_calls[0].status_code, Some(503));
        assert_eq!(report.api_calls[1].status, ItemStatus::Saved);
        assert_eq!(json_files(temp.path()).len(), 1);

        assert_eq!(report.well_known.len(), 4);
        assert_eq!(report.well_known[3].status, ItemStatus::Saved);
        assert!(temp.path().join("favicon.ico").exists());
        assert_eq!(report.failed_count(), 2);
    }

    #[tokio::test]
    async fn test_well_known_files_use_origin_root() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "/blog/2024/post", html("<html></html>".to_string())).await;
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<urlset/>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let spider = Spider::new(temp.path()).unwrap();
        let page = Url::parse(&format!("{}/blog/2024/post", mock_server.uri())).unwrap();

        let report = spider.spider(&page).await.unwrap();

        let sitemap = &report.well_known[1];
        assert_eq!(sitemap.url, format!("{}/sitemap.xml", mock_server.uri()));
        assert_eq!(sitemap.status, ItemStatus::Saved);
        assert_eq!(sitemap.local_path.as_deref(), Some(temp.path().join("sitemap.xml").as_path()));

        let requests = mock_server.received_requests().await.unwrap();
        let well_known_paths: Vec<&str> = requests
            .iter()
            .map(|r| r.url.path())
            .filter(|p| *p != "/blog/2024/post")
            .collect();
        assert_eq!(
            well_known_paths,
            vec!["/robots.txt", "/sitemap.xml", "/site.webmanifest", "/favicon.ico"]
        );
    }

    #[tokio::test]
    async fn test_parallel_workers_keep_discovery_order() {
        let mock_server = MockServer::start().await;
        let mut page_html = String::from("<html><body>");
        for i in 1..=8 {
            page_html.push_str(&format!(r#"<img src="/img/{}.png">"#, i));
        }
        page_html.push_str("</body></html>");
        mount(&mock_server, "/", html(page_html)).await;

        for i in 1..=8 {
            let delay = Duration::from_millis(((8 - i) * 5) as u64);
            mount(
                &mock_server,
                &format!("/img/{}.png", i),
                ResponseTemplate::new(200)
                    .set_body_string(format!("image {}", i))
                    .set_delay(delay),
            )
            .await;
        }

        let temp = TempDir::new().unwrap();
        let spider = Spider::new(temp.path()).unwrap().with_workers(4);
        let page = Url::parse(&mock_server.uri()).unwrap();

        let report = spider.spider(&page).await.unwrap();

        assert_eq!(report.resources.len(), 8);
        for (i, outcome) in report.resources.iter().enumerate() {
            assert!(outcome.url.ends_with(&format!("/img/{}.png", i + 1)));
            assert_eq!(outcome.status, ItemStatus::Saved);
            let saved = std::fs::read_to_string(temp.path().join(format!("img/{}.png", i + 1))).unwrap();
            assert_eq!(saved, format!("image {}", i + 1));
        }
    }

    #[tokio::test]
    async fn test_progress_callback_sees_every_item() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "/",
            html(r#"<a href="/a">a</a><a href="/b">b</a>"#.to_string()),
        )
        .await;
        mount(&mock_server, "/a", html("a".to_string())).await;

        let events: Arc<Mutex<Vec<SpiderEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();

        let temp = TempDir::new().unwrap();
        let spider = Spider::new(temp.path())
            .unwrap()
            .with_progress_callback(Arc::new(move |event| {
                events_clone.lock().unwrap().push(event);
            }));
        let page = Url::parse(&mock_server.uri()).unwrap();

        spider.spider(&page).await.unwrap();

        let events = events.lock().unwrap();
        assert!(matches!(events[0], SpiderEvent::PageFetched { .. }));
        assert!(matches!(
            events[1],
            SpiderEvent::Discovered {
                resources: 2,
                api_calls: 0
            }
        ));
        let finished = events
            .iter()
            .filter(|e| matches!(e, SpiderEvent::ItemFinished(_)))
            .count();
        // two anchors plus four well-known files
        assert_eq!(finished, 6);
    }

    #[tokio::test]
    async fn test_colliding_paths_keep_the_later_resource() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "/docs/",
            html(r#"<img src="/img/a.png"><img src="img/a.png">"#.to_string()),
        )
        .await;
        mount(
            &mock_server,
            "/img/a.png",
            ResponseTemplate::new(200)
                .set_body_string("root image")
                .set_delay(Duration::from_millis(100)),
        )
        .await;
        mount(
            &mock_server,
            "/docs/img/a.png",
            ResponseTemplate::new(200).set_body_string("docs image"),
        )
        .await;

        let temp = TempDir::new().unwrap();
        let spider = Spider::new(temp.path()).unwrap().with_workers(2);
        let page = Url::parse(&format!("{}/docs/", mock_server.uri())).unwrap();

        let report = spider.spider(&page).await.unwrap();

        let root_url = format!("{}/img/a.png", mock_server.uri());
        let docs_url = format!("{}/docs/img/a.png", mock_server.uri());
        assert_eq!(report.resources[0].url, root_url);
        assert_eq!(report.resources[1].url, docs_url);
        assert!(report.resources.iter().all(|o| o.status == ItemStatus::Saved));

        // The first download finishes last but is still written first
        assert_eq!(
            std::fs::read_to_string(temp.path().join("img/a.png")).unwrap(),
            "docs image"
        );
        assert_eq!(report.resources[0].replaces, None);
        assert_eq!(report.resources[1].replaces.as_deref(), Some(root_url.as_str()));
        assert_eq!(report.overwrites().count(), 1);
    }

    #[tokio::test]
    async fn test_directory_creation_failure_is_per_item() {
        let mock_server = MockServer::start().await;
        let page_html = r#"<html><body>
                <img src="/a.png">
                <link rel="stylesheet" href="/a.png/b.css">
                <img src="/c.png">
            </body></html>"#;
        mount(&mock_server, "/", html(page_html.to_string())).await;
        mount(&mock_server, "/a.png", ResponseTemplate::new(200).set_body_bytes(PNG_BYTES)).await;
        mount(&mock_server, "/a.png/b.css", ResponseTemplate::new(200).set_body_string("body {}")).await;
        mount(&mock_server, "/c.png", ResponseTemplate::new(200).set_body_bytes(PNG_BYTES)).await;

        let temp = TempDir::new().unwrap();
        let spider = Spider::new(temp.path()).unwrap().with_workers(3);
        let page = Url::parse(&mock_server.uri()).unwrap();

        let report = spider.spider(&page).await.unwrap();

        // a.png is written as a file first, so b.css has no directory to go in
        let order: Vec<&str> = report
            .resources
            .iter()
            .map(|o| o.url.rsplit_once('/').map(|(_, name)| name).unwrap_or_default())
            .collect();
        assert_eq!(order, vec!["a.png", "b.css", "c.png"]);

        let statuses: Vec<ItemStatus> = report.resources.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![ItemStatus::Saved, ItemStatus::Failed, ItemStatus::Saved]
        );
        let failed = &report.resources[1];
        assert!(failed.error.as_deref().unwrap().starts_with("IO error"));
        assert_eq!(failed.status_code, None);

        assert!(temp.path().join("a.png").is_file());
        assert!(temp.path().join("c.png").is_file());
        assert_eq!(report.well_known.len(), 4);
        assert_eq!(report.failed_count(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_well_known_file_is_failed() {
        let temp = TempDir::new().unwrap();
        let spider = Spider::with_timeout(temp.path(), Some(Duration::from_secs(5))).unwrap();
        let page = Url::parse("http://127.0.0.1:1/deep/page").unwrap();

        let outcome = spider.pull_well_known(&page, "robots.txt").await;

        assert_eq!(outcome.url, "http://127.0.0.1:1/robots.txt");
        assert_eq!(outcome.status, ItemStatus::Failed);
        assert_eq!(outcome.status_code, None);
        assert!(outcome.error.is_some());
        assert!(!temp.path().join("robots.txt").exists());
    }

    #[tokio::test]
    async fn test_well_known_timeout_does_not_stop_the_rest() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "/", html("<html></html>".to_string())).await;
        mount(
            &mock_server,
            "/robots.txt",
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\n")
                .set_delay(Duration::from_secs(3)),
        )
        .await;
        mount(&mock_server, "/favicon.ico", ResponseTemplate::new(200).set_body_bytes(PNG_BYTES)).await;

        let temp = TempDir::new().unwrap();
        let spider = Spider::with_timeout(temp.path(), Some(Duration::from_millis(500))).unwrap();
        let page = Url::parse(&mock_server.uri()).unwrap();

        let report = spider.spider(&page).await.unwrap();

        let statuses: Vec<ItemStatus> = report.well_known.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![
                ItemStatus::Failed,
                ItemStatus::Missing,
                ItemStatus::Missing,
                ItemStatus::Saved
            ]
        );
        assert!(!temp.path().join("robots.txt").exists());
        assert!(temp.path().join("favicon.ico").exists());
        assert!(report.has_failures());
    }
}
