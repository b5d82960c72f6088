//! Profile aggregation: fans out one GET per profile section, merges the
//! results into a single [`ProfileView`], and tracks loading and error state
//! per section.
//!
//! Failures never escape the fetch operations. A business-logic failure
//! (`status != "success"`) or a transport failure is recorded in
//! [`ErrorState`] and the section keeps its previous value.
//!
//! Each section carries a generation counter. A response is applied only if
//! no newer fetch for the same section was issued after it, so a slow older
//! response cannot overwrite a newer one. Changing the subject bumps every
//! generation, which also retires responses that belong to the previous user.

pub mod sections;


use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api_client::ProfileApi;
use crate::errors::AppError;
use crate::models::profile::{
    ErrorState, LoadingState, ProfileSnapshot, ProfileView, Section, UserId,
};
use crate::store::SharedStore;
use sections::{removal_for, spec_for, Transform, SECTION_TABLE};

/// Query parameter carrying the subject id on every section request.
pub const SUBJECT_PARAM: &str = "user_id";

const NO_PARAMS: &[(String, String)] = &[];

struct AggregatorState {
    subject: Option<UserId>,
    view: ProfileView,
    loading: LoadingState,
    errors: ErrorState,
    generations: HashMap<Section, u64>,
    /// Bumped on every subject change; a batch only settles the global flag for its own epoch.
    epoch: u64,
    batches_in_flight: usize,
}

impl AggregatorState {
    fn new() -> Self {
        Self {
            subject: None,
            view: ProfileView::default(),
            loading: LoadingState::default(),
            errors: ErrorState::default(),
            generations: HashMap::new(),
            epoch: 0,
            batches_in_flight: 0,
        }
    }

    fn reset(&mut self, subject: Option<UserId>) {
        self.subject = subject;
        self.view = ProfileView::default();
        self.loading = LoadingState::default();
        self.errors.clear();
        for section in Section::ALL {
            self.next_generation(section);
        }
        self.epoch += 1;
        self.batches_in_flight = 0;
    }

    fn next_generation(&mut self, section: Section) -> u64 {
        let generation = self.generations.entry(section).or_insert(0);
        *generation += 1;
        *generation
    }

    fn is_current(&self, section: Section, generation: u64) -> bool {
        self.generations.get(&section).copied().unwrap_or(0) == generation
    }
}

/// Clears a section's loading flag when its fetch settles or is dropped mid-flight.
struct InFlight<'a> {
    owner: &'a ProfileAggregator,
    section: Section,
    generation: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.owner.lock();
        if state.is_current(self.section, self.generation) {
            state.loading.set(self.section, false);
        }
    }
}

/// Lowers the global loading flag once the last batch of the current epoch settles.
struct Batch<'a> {
    owner: &'a ProfileAggregator,
    epoch: u64,
}

impl Drop for Batch<'_> {
    fn drop(&mut self) {
        let mut state = self.owner.lock();
        if state.epoch == self.epoch {
            state.batches_in_flight = state.batches_in_flight.saturating_sub(1);
            state.loading.global = state.batches_in_flight > 0;
        }
    }
}

/// Owns the merged profile of one subject plus its loading and error maps.
///
/// All mutation goes through the fetch operations. The lock is never held
/// across an `.await`, so many section fetches can interleave on one task.
pub struct ProfileAggregator {
    api: Arc<dyn ProfileApi>,
    shared: Arc<dyn SharedStore>,
    state: Mutex<AggregatorState>,
}

impl ProfileAggregator {
    /// Creates an idle aggregator with no subject. Nothing is fetched until
    /// [`set_subject`](Self::set_subject) supplies one.
    pub fn new(api: Arc<dyn ProfileApi>, shared: Arc<dyn SharedStore>) -> Self {
        Self {
            api,
            shared,
            state: Mutex::new(AggregatorState::new()),
        }
    }

    /// Creates an aggregator and, if `subject` is present, runs the initial full refresh.
    pub async fn with_subject(
        api: Arc<dyn ProfileApi>,
        shared: Arc<dyn SharedStore>,
        subject: Option<UserId>,
    ) -> Self {
        let aggregator = Self::new(api, shared);
        aggregator.set_subject(subject).await;
        aggregator
    }

    fn lock(&self) -> MutexGuard<'_, AggregatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subject(&self) -> Option<UserId> {
        self.lock().subject
    }

    pub fn profile_detail(&self) -> ProfileView {
        self.lock().view.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading.global
    }

    pub fn loading_states(&self) -> LoadingState {
        self.lock().loading.clone()
    }

    pub fn errors(&self) -> ErrorState {
        self.lock().errors.clone()
    }

    pub fn snapshot(&self) -> ProfileSnapshot {
        let state = self.lock();
        ProfileSnapshot {
            profile_detail: state.view.clone(),
            is_loading: state.loading.global,
            loading_states: state.loading.clone(),
            errors: state.errors.clone(),
        }
    }

    /// Points the aggregator at a new subject.
    ///
    /// An unchanged subject is a no-op. Any change discards the view model,
    /// loading and error state; a present subject then gets exactly one full
    /// refresh. Returns whether the subject changed.
    pub async fn set_subject(&self, subject: Option<UserId>) -> bool {
        {
            let mut state = self.lock();
            if state.subject == subject {
                return false;
            }
            state.reset(subject);
        }

        match subject {
            Some(id) => {
                info!(subject = id, "profile subject changed");
                self.fetch_all_sections().await;
            }
            None => info!("No user id available yet, skipping fetch"),
        }
        true
    }

    /// Applies every subject published on `subject` until the sender goes away.
    /// `on_refresh` runs after each full refresh triggered by a change.
    pub async fn follow_subject<F>(
        &self,
        mut subject: watch::Receiver<Option<UserId>>,
        mut on_refresh: F,
    ) where
        F: FnMut(&Self),
    {
        loop {
            let current = *subject.borrow_and_update();
            if self.set_subject(current).await && current.is_some() {
                on_refresh(self);
            }
            if subject.changed().await.is_err() {
                debug!("subject publisher closed; no longer following");
                break;
            }
        }
    }

    /// Fetches one section and merges it into the view model.
    ///
    /// `extra_params` are sent alongside `user_id` and win on a key clash.
    /// Returns the stored (transformed) value, or `None` when there is no
    /// subject, the call failed, or a newer fetch for the section superseded it.
    pub async fn fetch_section(
        &self,
        section: Section,
        extra_params: &[(String, String)],
        transform: Option<Transform>,
    ) -> Option<Value> {
        let spec = spec_for(section)?;

        let (subject, in_flight) = {
            let mut state = self.lock();
            let subject = state.subject?;
            let generation = state.next_generation(section);
            state.loading.set(section, true);
            (
                subject,
                InFlight {
                    owner: self,
                    section,
                    generation,
                },
            )
        };

        let mut params = Vec::with_capacity(extra_params.len() + 1);
        if !extra_params.iter().any(|(key, _)| key == SUBJECT_PARAM) {
            params.push((SUBJECT_PARAM.to_string(), subject.to_string()));
        }
        params.extend_from_slice(extra_params);

        debug!(%section, subject, "fetching profile section");
        let outcome = self.api.get(spec.endpoint, &params).await;

        let (stored, raw_for_store) = {
            let mut state = self.lock();
            if !state.is_current(section, in_flight.generation) {
                debug!(%section, "discarding superseded response");
                return None;
            }

            match outcome {
                Ok(envelope) if envelope.is_success() => {
                    let raw = envelope.data;
                    let value = match transform {
                        Some(transform) => transform(&raw),
                        None => raw.clone(),
                    };
                    state.view.set(section, value.clone());
                    let publish = matches!(section, Section::PersonalDetail | Section::Employment);
                    (Some(value), publish.then_some(raw))
                }
                Ok(envelope) => {
                    let message = envelope
                        .message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| format!("Failed to fetch {section}"));
                    warn!(%section, "{message}");
                    state.errors.record(section, message);
                    (None, None)
                }
                Err(err) => {
                    warn!(%section, "{section} API Error: {err}");
                    let message = err.to_string();
                    let message = if message.is_empty() {
                        format!("{section} API Error")
                    } else {
                        message
                    };
                    state.errors.record(section, message);
                    (None, None)
                }
            }
        };

        if let Some(raw) = raw_for_store {
            self.publish(section, raw);
        }
        drop(in_flight);
        stored
    }

    /// Hands the untransformed payload of the two sections other screens read to the shared store.
    fn publish(&self, section: Section, raw: Value) {
        match section {
            Section::PersonalDetail => self.shared.set_personal_details(raw),
            Section::Employment => self.shared.set_employment_list(raw),
            _ => {}
        }
    }

    /// Re-fetches every section concurrently and waits for all of them to settle.
    /// One section failing neither cancels nor delays the others.
    pub async fn fetch_all_sections(&self) {
        let (subject, batch) = {
            let mut state = self.lock();
            let Some(subject) = state.subject else {
                return;
            };
            state.batches_in_flight += 1;
            state.loading.global = true;
            state.errors.clear();
            (
                subject,
                Batch {
                    owner: self,
                    epoch: state.epoch,
                },
            )
        };

        info!(subject, "refreshing all profile sections");
        let results = join_all(
            SECTION_TABLE
                .iter()
                .map(|spec| self.fetch_section(spec.section, NO_PARAMS, spec.transform)),
        )
        .await;
        drop(batch);

        let populated = results.iter().filter(|r| r.is_some()).count();
        info!(
            subject,
            populated,
            failed = self.lock().errors.len(),
            "profile refresh settled"
        );
    }

    /// Re-fetches a single section with its configured transform.
    pub async fn refetch_section(&self, section: Section) -> Option<Value> {
        let spec = spec_for(section)?;
        self.fetch_section(section, NO_PARAMS, spec.transform).await
    }

    /// `None` re-fetches everything; a section name re-fetches just that section.
    /// An unrecognised name does nothing and resolves to `None`.
    pub async fn refetch(&self, section: Option<&str>) -> Option<Value> {
        let Some(name) = section else {
            self.fetch_all_sections().await;
            return None;
        };

        match name.parse::<Section>() {
            Ok(section) => self.refetch_section(section).await,
            Err(err) => {
                debug!("refetch ignored: {err}");
                None
            }
        }
    }

    /// Deletes one entry of a list section on the server, then re-fetches that section.
    pub async fn remove_entry(
        &self,
        section: Section,
        entry_id: &str,
    ) -> Result<Option<Value>, AppError> {
        let (endpoint, id_param) = removal_for(section).ok_or(AppError::NotRemovable(section))?;
        if self.subject().is_none() {
            return Err(AppError::NoSubject);
        }

        let envelope = self
            .api
            .delete(endpoint, &[(id_param.to_string(), entry_id.to_string())])
            .await?;
        envelope.into_result(|| format!("Failed to remove {section} entry {entry_id}"))?;
        info!(%section, entry_id, "entry removed");

        Ok(self.refetch_section(section).await)
    }
}
