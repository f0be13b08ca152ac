//! Lead capture workflow: the form's draft state machine, its calendar
//! helper math, and the save/convert service that talks to the CRM.

pub mod calendar;
pub mod domain;
mod form;
mod service;

pub use domain::{parse_post_code, Address, Lead, Referral, Services, Tenant};
pub use form::{AutocompleteQuery, LeadFormState, Product, ProductSelection, AUTO_POPULATE};
pub use service::{
    ConvertOutcome, LeadCaptureService, LogNotifier, Notification, Notifier,
};
