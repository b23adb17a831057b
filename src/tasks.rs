use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::detail::DetailRequest;
use crate::error::CatalogError;
use crate::listing::PageRequest;
use crate::models::{Paged, TitleDetail, TitleSummary, VideosResponse};
use crate::search::SearchRequest;
use crate::tmdb::CatalogClient;

/// Work the UI wants done off the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Page(PageRequest),
    Search(SearchRequest),
    Detail(DetailRequest),
    Videos(DetailRequest),
}

/// Completions sent from fetch tasks back to the UI loop
#[derive(Debug)]
pub enum Msg {
    PageLoaded {
        request: PageRequest,
        result: Result<Paged<TitleSummary>, CatalogError>,
    },
    SearchLoaded {
        request: SearchRequest,
        result: Result<Paged<TitleSummary>, CatalogError>,
    },
    DetailLoaded {
        request: DetailRequest,
        result: Result<TitleDetail, CatalogError>,
    },
    VideosLoaded {
        request: DetailRequest,
        result: Result<VideosResponse, CatalogError>,
    },
}

/// Spawns one tokio task per job; each task reports back over the channel.
#[derive(Clone)]
pub struct Spawner {
    client: CatalogClient,
    tx: UnboundedSender<Msg>,
}

impl Spawner {
    pub fn new(client: CatalogClient) -> (Self, UnboundedReceiver<Msg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { client, tx }, rx)
    }

    pub fn spawn(&self, job: Job) {
        debug!(?job, "spawning fetch");
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let msg = run(&client, job).await;
            // The receiver is gone once the UI loop has exited.
            let _ = tx.send(msg);
        });
    }
}

/// Perform a job against the catalog.
pub async fn run(client: &CatalogClient, job: Job) -> Msg {
    match job {
        Job::Page(request) => Msg::PageLoaded {
            request,
            result: client.feed(request.category.feed(), request.page).await,
        },
        Job::Search(request) => {
            let result = client.search(&request.query, 1).await;
            Msg::SearchLoaded { request, result }
        }
        Job::Detail(request) => Msg::DetailLoaded {
            request,
            result: client.details(request.id).await,
        },
        Job::Videos(request) => Msg::VideosLoaded {
            request,
            result: client.videos(request.id).await,
        },
    }
}
