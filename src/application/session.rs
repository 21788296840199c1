// Dashboard session - one fetch view per configured panel, driven by city selection
use crate::application::fetch_view::{FetchState, FetchView};
use crate::application::panel_service::PanelService;
use crate::domain::panel::PanelBody;
use crate::infrastructure::config::{PanelConfig, PanelKind, PanelStyle};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;

const UPDATE_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelUpdate {
    pub panel_id: String,
    pub state: FetchState<PanelBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSkeleton {
    pub id: String,
    pub title: String,
    pub kind: PanelKind,
    pub style: PanelStyle,
    pub icon: &'static str,
}

struct SessionPanel {
    config: PanelConfig,
    view: FetchView<PanelBody>,
}

/// Owns the panels of one dashboard viewer. Dropping the session aborts every
/// request still in flight and ends the update stream.
pub struct DashboardSession {
    service: PanelService,
    panels: Vec<SessionPanel>,
    city: Option<String>,
    forwarders: Vec<JoinHandle<()>>,
}

impl DashboardSession {
    pub fn new(
        service: PanelService,
        panels: &[PanelConfig],
        view_timeout: Duration,
    ) -> (Self, mpsc::Receiver<PanelUpdate>) {
        let (tx, rx) = mpsc::channel(UPDATE_BUFFER);

        let panels: Vec<SessionPanel> = panels
            .iter()
            .map(|config| SessionPanel {
                config: config.clone(),
                view: FetchView::new(view_timeout),
            })
            .collect();

        let forwarders = panels
            .iter()
            .map(|panel| {
                let tx = tx.clone();
                let panel_id = panel.config.id.clone();
                let mut changes = WatchStream::from_changes(panel.view.subscribe());
                tokio::spawn(async move {
                    while let Some(state) = changes.next().await {
                        let update = PanelUpdate {
                            panel_id: panel_id.clone(),
                            state,
                        };
                        if tx.send(update).await.is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();

        let session = Self {
            service,
            panels,
            city: None,
            forwarders,
        };
        (session, rx)
    }

    pub fn skeleton(&self) -> Vec<PanelSkeleton> {
        self.panels
            .iter()
            .map(|panel| PanelSkeleton {
                id: panel.config.id.clone(),
                title: panel.config.title.clone(),
                kind: panel.config.kind,
                style: panel.config.style(),
                icon: panel.config.kind.icon(),
            })
            .collect()
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// Switch every panel to `city`; loads still running for the previous
    /// city are superseded
    pub fn select_city(&mut self, city: &str) {
        tracing::debug!(city, "Selecting city");
        self.city = Some(city.to_string());
        self.reload();
    }

    pub fn refresh(&mut self) {
        self.reload();
    }

    pub fn state_of(&self, panel_id: &str) -> Option<FetchState<PanelBody>> {
        self.panels
            .iter()
            .find(|p| p.config.id == panel_id)
            .map(|p| p.view.state())
    }

    fn reload(&mut self) {
        for panel in &self.panels {
            let service = self.service.clone();
            let config = panel.config.clone();
            let city = self.city.clone();
            panel
                .view
                .load(async move { service.load(&config, city.as_deref()).await });
        }
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        for forwarder in &self.forwarders {
            forwarder.abort();
        }
    }
}
