//! Client-side lead capture workflow for real-estate CRM onboarding.
//!
//! The crate models the lead form as an explicit state machine
//! ([`workflows::lead_capture::LeadFormState`]) that is hydrated from an
//! existing [`workflows::lead_capture::Lead`], edited cell by cell, and
//! submitted through a thin CRM gateway ([`crm::CrmClient`]). A small route
//! table with a login gate ([`routing::Router`]) covers the navigation
//! surface around the form.

pub mod config;
pub mod crm;
pub mod error;
pub mod routing;
pub mod telemetry;
pub mod workflows;
