//! Run-once orchestration and the transition decision logic.

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::MonitorConfig;
use crate::fetch::Fetcher;
use crate::notifications::{NotificationError, NotificationService};
use crate::state::{MonitorState, StateError, StateStore};
use crate::status::{Classification, StatusReport, classify, extract::extract};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Notification delivery failed: {0}")]
    Notification(#[from] NotificationError),
    #[error("State persistence failed: {0}")]
    State(#[from] StateError),
}

/// A message the planner decided to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    ProblemAlert(String),
    ResolvedAlert(String),
    Heartbeat(String),
}

impl OutboundMessage {
    pub fn text(&self) -> &str {
        match self {
            OutboundMessage::ProblemAlert(text)
            | OutboundMessage::ResolvedAlert(text)
            | OutboundMessage::Heartbeat(text) => text,
        }
    }
}

/// Decides which messages a new observation warrants and how the stored
/// state advances.
///
/// `Unknown` never counts as a transition: a failed extraction leaves the
/// previous status on record, so the next good observation is compared
/// against something real. The heartbeat rides on any observation, at most
/// once per calendar day, independent of whether a transition fired.
pub fn plan(
    report: Option<&StatusReport>,
    classification: Classification,
    state: &MonitorState,
    today: NaiveDate,
    line_code: &str,
    source_url: &str,
) -> (Vec<OutboundMessage>, MonitorState) {
    let mut messages = Vec::new();
    let mut next = state.clone();

    if classification != Classification::Unknown && classification != state.last_status {
        let situation = report.map(|r| r.situation.as_str()).unwrap_or("");
        let message = if classification == Classification::Problem {
            let description = report
                .map(|r| r.description.as_str())
                .filter(|d| !d.is_empty())
                .unwrap_or("-");
            OutboundMessage::ProblemAlert(format!(
                "⚠️ ALERTA – Linha {line_code} com problema\n\
                 Situação: {situation}\n\
                 Descrição: {description}\n\
                 Fonte: {source_url}"
            ))
        } else {
            OutboundMessage::ResolvedAlert(format!(
                "✅ Linha {line_code} normalizada\n\
                 Situação: {situation}\n\
                 Fonte: {source_url}"
            ))
        };
        messages.push(message);
        next.last_status = classification;
    }

    if state.last_heartbeat_date != Some(today) {
        let situation = report
            .map(|r| r.situation.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("N/A");
        messages.push(OutboundMessage::Heartbeat(format!(
            "🟢 Monitor ativo – Linha {line_code} – Situação: {situation}"
        )));
        next.last_heartbeat_date = Some(today);
    }

    (messages, next)
}

/// Wires one full pass: fetch → extract → classify → plan → send → persist.
pub struct Monitor<S: StateStore> {
    config: MonitorConfig,
    fetcher: Box<dyn Fetcher>,
    notifier: NotificationService,
    store: S,
}

impl<S: StateStore> Monitor<S> {
    pub fn new(
        config: MonitorConfig,
        fetcher: Box<dyn Fetcher>,
        notifier: NotificationService,
        store: S,
    ) -> Self {
        Self {
            config,
            fetcher,
            notifier,
            store,
        }
    }

    /// One complete monitoring pass. "No observation" is a clean no-op; a
    /// message that cannot be delivered aborts the run before the state
    /// write, so the next invocation alerts again.
    pub async fn run_once(&self) -> Result<(), MonitorError> {
        self.run_at(Utc::now().date_naive()).await
    }

    pub async fn run_at(&self, today: NaiveDate) -> Result<(), MonitorError> {
        let state = self.store.load();
        info!(
            last_status = %state.last_status,
            last_heartbeat_date = ?state.last_heartbeat_date,
            "Loaded monitor state."
        );

        let raw = match self.fetcher.fetch().await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("Source returned no usable content. Nothing to do.");
                return Ok(());
            }
            Err(e) => {
                warn!(error = %e, "Fetch failed. Nothing to do.");
                return Ok(());
            }
        };

        let report = extract(&raw, &self.config.line_code);
        match &report {
            Some(r) => info!(
                line = %r.line,
                situation = %r.situation,
                description = %r.description,
                "Extracted status report."
            ),
            None => info!("No status record found in the observation."),
        }

        let classification = report
            .as_ref()
            .map(|r| classify(&r.situation))
            .unwrap_or(Classification::Unknown);
        info!(classification = %classification, "Classified current status.");

        let (messages, next_state) = plan(
            report.as_ref(),
            classification,
            &state,
            today,
            &self.config.line_code,
            &self.config.endpoint,
        );

        if messages.is_empty() {
            info!("No notification warranted by this observation.");
        }
        for message in &messages {
            self.notifier.send(message.text()).await?;
        }

        self.store.save(&next_state)?;
        info!(
            last_status = %next_state.last_status,
            messages_sent = messages.len(),
            "Run finished. State persisted."
        );
        Ok(())
    }
}
