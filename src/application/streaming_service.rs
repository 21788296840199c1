// Streaming dashboard service - progressive loading of every panel for one city
use crate::application::panel_service::PanelService;
use crate::application::session::{DashboardSession, PanelSkeleton, PanelUpdate};
use crate::infrastructure::config::PanelConfig;
use serde::Serialize;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const STREAM_BUFFER: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    Skeleton {
        city: String,
        panels: Vec<PanelSkeleton>,
    },
    PanelUpdate(PanelUpdate),
    Complete {
        total_panels: usize,
        duration_ms: u64,
    },
}

#[derive(Clone)]
pub struct StreamingDashboardService {
    panel_service: PanelService,
    panels: Vec<PanelConfig>,
    view_timeout: Duration,
}

impl StreamingDashboardService {
    pub fn new(panel_service: PanelService, panels: Vec<PanelConfig>, view_timeout: Duration) -> Self {
        Self {
            panel_service,
            panels,
            view_timeout,
        }
    }

    pub fn panels(&self) -> &[PanelConfig] {
        &self.panels
    }

    pub fn view_timeout(&self) -> Duration {
        self.view_timeout
    }

    /// Skeleton first, then one update per panel state change, then a
    /// completion event once every panel has settled. The session lives as
    /// long as the receiver does; dropping it cancels outstanding requests.
    pub async fn stream_dashboard(&self, city: &str) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let start_time = Instant::now();

        let (mut session, mut updates) =
            DashboardSession::new(self.panel_service.clone(), &self.panels, self.view_timeout);
        let total_panels = session.panel_count();

        let skeleton = StreamMessage::Skeleton {
            city: city.to_string(),
            panels: session.skeleton(),
        };
        if tx.send(skeleton).await.is_err() {
            return rx;
        }

        session.select_city(city);
        let city = city.to_string();

        tokio::spawn(async move {
            let mut settled: HashSet<String> = HashSet::new();

            while settled.len() < total_panels {
                let Some(update) = updates.recv().await else {
                    break;
                };
                if update.state.is_settled() {
                    settled.insert(update.panel_id.clone());
                }
                if tx.send(StreamMessage::PanelUpdate(update)).await.is_err() {
                    tracing::debug!(%city, "Dashboard client went away, cancelling panels");
                    return;
                }
            }

            let duration_ms = start_time.elapsed().as_millis() as u64;
            tracing::debug!(%city, total_panels, duration_ms, "Dashboard stream complete");
            let _ = tx
                .send(StreamMessage::Complete {
                    total_panels,
                    duration_ms,
                })
                .await;
            drop(session);
        });

        rx
    }
}
