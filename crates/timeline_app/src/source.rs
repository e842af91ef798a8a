use std::fs;
use std::sync::Arc;

use anyhow::{bail, Context};
use engine_logging::engine_info;
use timeline_engine::{Host, StaticPage};

use crate::cli::{Cli, DetailPage};

/// The document the collector works on, plus whatever keeps it alive.
pub(crate) struct OpenedHost {
    pub host: Arc<dyn Host>,
    #[cfg(feature = "browser")]
    _runtime: Option<tokio::runtime::Runtime>,
}

pub(crate) fn open(cli: &Cli) -> anyhow::Result<OpenedHost> {
    if let Some(url) = &cli.url {
        return open_live(url, !cli.headed);
    }
    let Some(page) = &cli.page else {
        bail!("either --page or --url is required");
    };

    let mut host = StaticPage::from_file(page)
        .with_context(|| format!("reading timeline page {}", page.display()))?;
    for detail in &cli.details {
        host = add_detail(host, detail)?;
    }
    engine_info!(
        "Opened saved timeline {:?} with {} detail pages",
        page,
        cli.details.len()
    );
    Ok(OpenedHost {
        host: Arc::new(host),
        #[cfg(feature = "browser")]
        _runtime: None,
    })
}

fn add_detail(host: StaticPage, detail: &DetailPage) -> anyhow::Result<StaticPage> {
    let context = || format!("reading detail page {}", detail.path.display());
    match &detail.url {
        Some(url) => {
            let html = fs::read_to_string(&detail.path).with_context(context)?;
            Ok(host.with_page(url.clone(), html))
        }
        None => host.with_file(&detail.path).with_context(context),
    }
}

#[cfg(feature = "browser")]
fn open_live(url: &str, headless: bool) -> anyhow::Result<OpenedHost> {
    // The CDP handler task must keep running between collections.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting browser runtime")?;
    let host = runtime
        .block_on(timeline_engine::BrowserHost::launch(url, headless))
        .with_context(|| format!("opening {url}"))?;
    Ok(OpenedHost {
        host: Arc::new(host),
        _runtime: Some(runtime),
    })
}

#[cfg(not(feature = "browser"))]
fn open_live(url: &str, _headless: bool) -> anyhow::Result<OpenedHost> {
    bail!("cannot open {url}: live pages need the `browser` feature")
}
