use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::data::FootballSource;
use crate::error::FetchError;
use crate::pages::{self, Dashboard, TeamPage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `fresh` skips reused responses.
    Dashboard { fresh: bool },
    Team(u64),
    Crest { team_id: u64, url: String },
}

#[derive(Debug)]
pub enum Update {
    Dashboard(Result<Dashboard, FetchError>),
    Team(u64, Result<TeamPage, FetchError>),
    Crest(u64, DynamicImage),
}

/// Serves UI requests until the UI side hangs up. The dashboard is also
/// reloaded from the network every `refresh`.
pub async fn run<S>(
    source: Arc<S>,
    mut requests: mpsc::UnboundedReceiver<Request>,
    updates: mpsc::Sender<Update>,
    refresh: Duration,
) where
    S: FootballSource + 'static,
{
    let mut fetched_crests: HashSet<u64> = HashSet::new();
    let mut interval = tokio::time::interval(refresh);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The UI asks for its first page itself.
    interval.tick().await;

    loop {
        let request = tokio::select! {
            req = requests.recv() => match req {
                Some(req) => req,
                None => break,
            },
            _ = interval.tick() => {
                debug!("scheduled dashboard refresh");
                Request::Dashboard { fresh: true }
            }
        };

        if let Request::Crest { team_id, .. } = &request {
            if !fetched_crests.insert(*team_id) {
                continue;
            }
        }

        tokio::spawn(handle(source.clone(), request, updates.clone()));
    }
    info!("request channel closed, worker exiting");
}

async fn handle<S>(source: Arc<S>, request: Request, updates: mpsc::Sender<Update>)
where
    S: FootballSource + 'static,
{
    let update = match request {
        Request::Dashboard { fresh } => {
            if fresh {
                source.expire();
            }
            let result = pages::load_dashboard(source.as_ref()).await;
            if let Err(e) = &result {
                error!(status = ?e.status_code(), error = %e, "dashboard failed to load");
            }
            Update::Dashboard(result)
        }
        Request::Team(team_id) => {
            let result = pages::load_team_page(source.as_ref(), team_id).await;
            if let Err(e) = &result {
                error!(team_id, status = ?e.status_code(), error = %e, "team page failed to load");
            }
            Update::Team(team_id, result)
        }
        Request::Crest { team_id, url } => match source.crest(&url).await {
            Ok(img) => Update::Crest(team_id, img),
            Err(e) => {
                // Some crests are SVG, which the image decoder does not read.
                warn!(team_id, %url, error = %e, "crest unavailable");
                return;
            }
        },
    };
    // The UI may already be gone; nothing to do then.
    let _ = updates.send(update).await;
}
