use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use super::form::LeadFormState;
use crate::crm::{CrmGateway, SaveLeadResponse};
use crate::routing::{SignupHandoff, SIGNUP_PATH};

/// Non-blocking user-visible feedback. Success, logical failure, and
/// transport error are distinguishable conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Failure(String),
    Error(String),
}

/// Collaborator interface for alerts; the workflow only decides which
/// condition occurred, not how it is displayed.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that emits through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::Success(message) => info!("{message}"),
            Notification::Failure(message) => warn!("{message}"),
            Notification::Error(message) => error!("{message}"),
        }
    }
}

/// Where the UI goes after a convert attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertOutcome {
    Navigate {
        path: &'static str,
        state: SignupHandoff,
    },
    Stay,
}

/// Drives save and convert against the CRM gateway. No double-submission
/// guard: overlapping calls issue overlapping requests, matching the form's
/// buttons.
pub struct LeadCaptureService<G, N> {
    gateway: Arc<G>,
    notifier: Arc<N>,
}

impl<G, N> LeadCaptureService<G, N>
where
    G: CrmGateway + 'static,
    N: Notifier + 'static,
{
    pub fn new(gateway: Arc<G>, notifier: Arc<N>) -> Self {
        Self { gateway, notifier }
    }

    /// Submit the current draft. With `for_convert` the raw response is
    /// returned to the caller and feedback is delegated to it; otherwise the
    /// outcome is reported through the notifier. Every failure path leaves
    /// the draft untouched and the form interactive.
    pub async fn save(
        &self,
        form: &LeadFormState,
        for_convert: bool,
    ) -> Option<SaveLeadResponse> {
        let payload = form.create_payload(Utc::now());

        match self.gateway.save_lead(&payload).await {
            Ok(response) => {
                if for_convert {
                    return Some(response);
                }

                if response.done {
                    self.notifier
                        .notify(Notification::Success("Lead saved successfully".to_string()));
                } else {
                    self.notifier
                        .notify(Notification::Failure("Operation did not succeed".to_string()));
                }
                None
            }
            Err(err) => {
                error!(error = %err, "lead submission failed");
                self.notifier.notify(Notification::Error(err.user_detail()));
                None
            }
        }
    }

    /// Save the draft and, when the CRM confirms, hand the returned lead
    /// data to the signup flow. A logical failure is reported and the user
    /// stays put; a transport error was already reported by the save.
    pub async fn convert(&self, form: &LeadFormState) -> ConvertOutcome {
        match self.save(form, true).await {
            Some(response) if response.done => ConvertOutcome::Navigate {
                path: SIGNUP_PATH,
                state: SignupHandoff {
                    lead: response.data,
                },
            },
            Some(_) => {
                self.notifier
                    .notify(Notification::Failure("Operation did not succeed".to_string()));
                ConvertOutcome::Stay
            }
            None => ConvertOutcome::Stay,
        }
    }

    /// Run one autocomplete round: record the keystroke, issue the lookup
    /// when the input qualifies, and apply the response unless a newer
    /// lookup has been issued meanwhile.
    pub async fn lookup_address(&self, form: &mut LeadFormState, text: impl Into<String>) {
        if let Some(query) = form.billing_address_changed(text) {
            let outcome = self.gateway.address_autocomplete(&query.text).await;
            form.apply_suggestions(&query, outcome);
        }
    }
}
