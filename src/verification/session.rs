//! Mount/teardown lifecycle for one residency verification view.
//!
//! Mounting seeds the store from props and the cached profile, issues one
//! live profile fetch, arms the loading fallback and starts the polling loop.
//! The loop repeats the live fetch until some reading has been accepted.
//! Tearing down releases all of it; readings that land afterwards are
//! dropped by the store.

use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};

use super::gate::Notifier;
use super::poller::{poll_once, PollHandle, PollingLoop};
use super::store::{MergeOutcome, StatusStore, StoreSnapshot};
use super::types::{ReadingSource, StatusReading};
use super::upload::{load_document, submit_upload, UploadError};
use super::view::{dispatch, View, ViewContext};
use crate::api::{ApiError, DocumentUpload, ProfilePayload, VerificationApi};
use crate::config::PollingConfig;
use crate::observability::poll_metrics;
use crate::telemetry::{create_verification_span, generate_correlation_id};

/// Readings available at mount time, before any network round trip
#[derive(Debug, Clone, Default)]
pub struct SessionSeed {
    /// Values passed explicitly to the view; highest priority
    pub props: Option<ProfilePayload>,
    /// Profile cached by the auth/session provider
    pub cached_profile: Option<ProfilePayload>,
}

pub struct VerificationSession<A: ?Sized> {
    api: Arc<A>,
    store: StatusStore,
    polling: PollingConfig,
    poller: Option<PollHandle>,
    background: Vec<JoinHandle<()>>,
    upload_error: Option<String>,
    span: tracing::Span,
}

impl<A> VerificationSession<A>
where
    A: VerificationApi + ?Sized + 'static,
{
    pub fn new(api: Arc<A>, notifier: Arc<dyn Notifier>, polling: PollingConfig) -> Self {
        let correlation_id = generate_correlation_id();
        Self {
            api,
            store: StatusStore::new(notifier),
            polling,
            poller: None,
            background: Vec::new(),
            upload_error: None,
            span: create_verification_span("session", &correlation_id),
        }
    }

    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.store.subscribe()
    }

    /// Acquire timers and start reconciling. Must run inside a tokio runtime.
    pub fn mount(&mut self, seed: SessionSeed) {
        let _entered = self.span.enter();
        self.store.mount();

        // Last applied wins, so lower-priority sources go first
        if let Some(profile) = &seed.cached_profile {
            self.store.merge(StatusReading::from(profile), ReadingSource::CachedProfile);
        }
        if let Some(props) = &seed.props {
            self.store.merge(StatusReading::from(props), ReadingSource::Props);
        }

        let api = Arc::clone(&self.api);
        let store = self.store.clone();
        self.background.push(tokio::spawn(
            async move {
                match api.fetch_profile().await {
                    Ok(profile) => {
                        store.merge(StatusReading::from(&profile), ReadingSource::Profile);
                    }
                    Err(e) => warn!(error = %e, "Initial profile fetch failed"),
                }
            }
            .in_current_span(),
        ));

        let store = self.store.clone();
        let loading_timeout = self.polling.loading_timeout();
        self.background.push(tokio::spawn(
            async move {
                tokio::time::sleep(loading_timeout).await;
                if store.is_loading() {
                    debug!("Loading timeout reached");
                    store.finish_loading();
                }
            }
            .in_current_span(),
        ));

        if self.poller.as_ref().map_or(true, PollHandle::is_finished) {
            self.poller = Some(
                PollingLoop::new(Arc::clone(&self.api), self.store.clone(), self.polling.interval())
                    .spawn(),
            );
        }
        info!("Verification view mounted");
    }

    /// Release timers and in-flight work.
    pub fn teardown(&mut self) {
        let _entered = self.span.enter();
        self.store.unmount();
        if let Some(mut poller) = self.poller.take() {
            poller.cancel();
        }
        for task in self.background.drain(..) {
            task.abort();
        }
        poll_metrics().log_stats();
        debug!("Verification view torn down");
    }

    /// Logout: tear down and forget all state.
    pub fn logout(&mut self) {
        self.teardown();
        self.store.reset();
        self.upload_error = None;
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|poller| !poller.is_finished())
    }

    /// Immediate poll for the user-facing refresh action
    pub async fn refresh(&self) -> Result<MergeOutcome, ApiError> {
        poll_once(self.api.as_ref(), &self.store)
            .instrument(self.span.clone())
            .await
    }

    pub async fn upload_file(&mut self, path: &Path) -> Result<MergeOutcome, UploadError> {
        match load_document(path).await {
            Ok(document) => self.upload(document).await,
            Err(e) => self.record_upload_result(Err(e)),
        }
    }

    pub async fn upload(&mut self, document: DocumentUpload) -> Result<MergeOutcome, UploadError> {
        let result = submit_upload(self.api.as_ref(), &self.store, document)
            .instrument(self.span.clone())
            .await;
        self.record_upload_result(result)
    }

    fn record_upload_result(
        &mut self,
        result: Result<MergeOutcome, UploadError>,
    ) -> Result<MergeOutcome, UploadError> {
        self.upload_error = result.as_ref().err().map(ToString::to_string);
        result
    }

    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    /// The user closed the approval notice
    pub fn acknowledge_approval(&self) {
        self.store.acknowledge_approval();
    }

    /// Render the current panel
    pub fn view(&self, storage_url: &str) -> View {
        let ctx = ViewContext {
            upload_error: self.upload_error.as_deref(),
            ..ViewContext::new(storage_url)
        };
        dispatch(&self.store.snapshot(), &ctx)
    }
}

impl<A: ?Sized> Drop for VerificationSession<A> {
    fn drop(&mut self) {
        self.store.unmount();
        for task in self.background.drain(..) {
            task.abort();
        }
    }
}
