use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};
use tracing::warn;

use super::calendar;
use super::domain::{parse_post_code, Address, Lead, Referral, Services, Tenant};
use crate::crm::{AddressSuggestion, CrmError};

/// Placeholder written into structured address fields the geocoder left out
/// of a selected suggestion.
pub const AUTO_POPULATE: &str = "Auto populate";

/// Minimum billing-address length before a lookup is issued.
const MIN_AUTOCOMPLETE_LEN: usize = 3;

/// Products offered on the form. Water and Broadband are displayed but
/// inert in phase one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    Electricity,
    Gas,
    Water,
    Broadband,
}

/// The user-editable subset of [`Services`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductSelection {
    pub gas: bool,
    pub electricity: bool,
}

/// A sequenced autocomplete lookup. The sequence number lets the form drop
/// responses that arrive after a newer lookup was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteQuery {
    pub(crate) seq: u64,
    pub text: String,
}

/// Draft state of the lead capture form. Hydrated once at construction,
/// mutated only by user-input and lookup-completion events, discarded when
/// the form goes away; there is no autosave.
#[derive(Debug, Clone)]
pub struct LeadFormState {
    pub agent_name: String,
    pub agency_name: String,
    pub first_name: String,
    pub second_name: String,
    pub email: String,
    pub mobile: String,
    pub billing_address: String,
    pub street_number: String,
    pub street_address: String,
    pub suburb: String,
    pub postcode: String,
    pub state: String,
    pub products: ProductSelection,
    pub selected_date: NaiveDate,
    pub cursor_month: NaiveDate,
    pub show_calendar: bool,
    pub show_agent_dropdown: bool,
    pub suggestions: Vec<AddressSuggestion>,
    autocomplete_seq: u64,
}

impl LeadFormState {
    /// Blank draft. The lease date starts at today until the calendar says
    /// otherwise.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            agent_name: String::new(),
            agency_name: String::new(),
            first_name: String::new(),
            second_name: String::new(),
            email: String::new(),
            mobile: String::new(),
            billing_address: String::new(),
            street_number: String::new(),
            street_address: String::new(),
            suburb: String::new(),
            postcode: String::new(),
            state: String::new(),
            products: ProductSelection::default(),
            selected_date: today,
            cursor_month: calendar::month_start(today),
            show_calendar: false,
            show_agent_dropdown: false,
            suggestions: Vec::new(),
            autocomplete_seq: 0,
        }
    }

    /// Hydrate the draft from an existing lead record. Absent fields fall
    /// back to empty strings, unticked products, and today's date.
    pub fn from_lead(lead: &Lead, today: NaiveDate) -> Self {
        let mut form = Self::new(today);

        form.agent_name = lead.referring_agent.name.clone();
        form.agency_name = lead.referring_agency.name.clone();
        form.first_name = lead.tenant.first_name.clone();
        form.second_name = lead.tenant.second_name.clone();
        form.email = lead.tenant.email.clone();
        form.mobile = lead.tenant.mobile.clone();
        form.billing_address = lead.address.text.clone();
        form.street_number = lead.address.street_number.clone();
        form.street_address = lead.address.street_name.clone();
        form.suburb = lead.address.locality.clone();
        form.postcode = lead
            .address
            .post_code
            .map(|code| code.to_string())
            .unwrap_or_default();
        form.state = lead.address.state.clone();
        form.products = ProductSelection {
            gas: lead.services.gas,
            electricity: lead.services.electricity,
        };
        form.set_lease_start(
            NaiveDate::parse_from_str(&lead.lease_start_date, "%Y-%m-%d").unwrap_or(today),
        );

        form
    }

    /// Build the submission payload from the current draft. Pure given the
    /// draft and `now`; `submitted` is the only clock-dependent field.
    pub fn create_payload(&self, now: DateTime<Utc>) -> Lead {
        Lead {
            tenant: Tenant {
                first_name: self.first_name.clone(),
                second_name: self.second_name.clone(),
                email: self.email.clone(),
                mobile: self.mobile.clone(),
            },
            address: Address {
                text: self.billing_address.clone(),
                unit: String::new(),
                street_number: self.street_number.clone(),
                street_name: self.street_address.clone(),
                locality: self.suburb.clone(),
                post_code: parse_post_code(&self.postcode),
                state: self.state.clone(),
                city: String::new(),
                country: String::new(),
            },
            referring_agent: Referral {
                name: self.agent_name.clone(),
                ..Referral::default()
            },
            referring_agency: Referral {
                name: self.agency_name.clone(),
                ..Referral::default()
            },
            services: Services {
                gas: self.products.gas,
                electricity: self.products.electricity,
                ..Services::default()
            },
            submitted: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            lease_start_date: self.selected_date.format("%Y-%m-%d").to_string(),
            renewal: false,
        }
    }

    /// Toggle a product button. Water and Broadband are explicit no-ops:
    /// phase one only sells gas and electricity.
    pub fn toggle_product(&mut self, product: Product) {
        match product {
            Product::Electricity => self.products.electricity = !self.products.electricity,
            Product::Gas => self.products.gas = !self.products.gas,
            Product::Water | Product::Broadband => {}
        }
    }

    pub fn toggle_calendar(&mut self) {
        self.show_calendar = !self.show_calendar;
    }

    // Independent of the calendar flag; both panels can be open at once.
    pub fn toggle_agent_dropdown(&mut self) {
        self.show_agent_dropdown = !self.show_agent_dropdown;
    }

    pub fn change_month(&mut self, delta: i32) {
        self.cursor_month = calendar::shift_month(self.cursor_month, delta);
    }

    /// Day grid for the displayed month.
    pub fn month_grid(&self) -> Vec<Option<u32>> {
        calendar::month_grid(self.cursor_month)
    }

    /// Select a day in the displayed month: sets the lease start date and
    /// collapses the calendar.
    pub fn select_day(&mut self, day: u32) {
        if let Some(date) = self.cursor_month.with_day(day) {
            self.selected_date = date;
            self.show_calendar = false;
        }
    }

    /// Whether a grid day matches the selected date, by calendar date only.
    pub fn is_selected(&self, day: u32) -> bool {
        self.cursor_month.with_day(day) == Some(self.selected_date)
    }

    /// Set the lease start date directly and move the calendar cursor to its
    /// month.
    pub fn set_lease_start(&mut self, date: NaiveDate) {
        self.selected_date = date;
        self.cursor_month = calendar::month_start(date);
    }

    /// Record a billing-address keystroke. The draft updates immediately;
    /// inputs of three or more characters yield a sequenced lookup for the
    /// caller to run, shorter inputs just clear the suggestion list.
    pub fn billing_address_changed(&mut self, text: impl Into<String>) -> Option<AutocompleteQuery> {
        let text = text.into();
        self.billing_address = text.clone();

        if text.chars().count() >= MIN_AUTOCOMPLETE_LEN {
            self.autocomplete_seq += 1;
            Some(AutocompleteQuery {
                seq: self.autocomplete_seq,
                text,
            })
        } else {
            self.suggestions.clear();
            None
        }
    }

    /// Apply the outcome of a lookup. Responses for anything but the most
    /// recently issued query are dropped so a slow early response cannot
    /// overwrite fresher suggestions. Lookup failures are non-fatal: log and
    /// clear the list.
    pub fn apply_suggestions(
        &mut self,
        query: &AutocompleteQuery,
        outcome: Result<Vec<AddressSuggestion>, CrmError>,
    ) {
        if query.seq != self.autocomplete_seq {
            return;
        }

        match outcome {
            Ok(items) => self.suggestions = items,
            Err(err) => {
                warn!(error = %err, "address autocomplete failed");
                self.suggestions.clear();
            }
        }
    }

    /// Adopt one suggestion: the display name becomes the billing address and
    /// the structured fields are lifted from the nested address, with the
    /// suburb -> city -> town fallback chain and a placeholder for anything
    /// absent. Clears the suggestion list.
    pub fn select_suggestion(&mut self, suggestion: &AddressSuggestion) {
        let addr = &suggestion.address;

        self.billing_address = suggestion.display_name.clone();
        self.street_address = addr.road.clone().unwrap_or_else(|| AUTO_POPULATE.to_string());
        self.suburb = addr
            .suburb
            .clone()
            .or_else(|| addr.city.clone())
            .or_else(|| addr.town.clone())
            .unwrap_or_else(|| AUTO_POPULATE.to_string());
        self.postcode = addr
            .postcode
            .clone()
            .unwrap_or_else(|| AUTO_POPULATE.to_string());
        self.state = addr.state.clone().unwrap_or_else(|| AUTO_POPULATE.to_string());

        self.suggestions.clear();
    }

    /// Clear every draft cell back to a blank form. Never invoked by a
    /// successful save; the draft survives submission so the user can keep
    /// editing or convert.
    pub fn reset(&mut self, today: NaiveDate) {
        *self = Self::new(today);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::SuggestionAddress;
    use chrono::TimeZone;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).expect("valid date")
    }

    fn sample_lead() -> Lead {
        serde_json::from_str(
            r#"{
                "tenant": {
                    "firstName": "Jane",
                    "secondName": "Doe",
                    "email": "jane@example.com",
                    "mobile": "0400000000"
                },
                "address": {
                    "text": "1 Example St, Carlton VIC 3053",
                    "streetNumber": "1",
                    "streetName": "Example St",
                    "locality": "Carlton",
                    "postCode": 3053,
                    "state": "VIC"
                },
                "referringAgent": { "name": "Sam Agent" },
                "referringAgency": { "name": "Example Realty" },
                "services": { "gas": true, "electricity": false },
                "leaseStartDate": "2024-06-01"
            }"#,
        )
        .expect("sample lead parses")
    }

    fn suggestion(address: SuggestionAddress) -> AddressSuggestion {
        AddressSuggestion {
            display_name: "2 New Rd, Fitzroy VIC 3065".to_string(),
            address,
        }
    }

    #[test]
    fn hydration_copies_nested_fields_into_draft() {
        let form = LeadFormState::from_lead(&sample_lead(), today());

        assert_eq!(form.first_name, "Jane");
        assert_eq!(form.second_name, "Doe");
        assert_eq!(form.email, "jane@example.com");
        assert_eq!(form.mobile, "0400000000");
        assert_eq!(form.billing_address, "1 Example St, Carlton VIC 3053");
        assert_eq!(form.street_number, "1");
        assert_eq!(form.street_address, "Example St");
        assert_eq!(form.suburb, "Carlton");
        assert_eq!(form.postcode, "3053");
        assert_eq!(form.state, "VIC");
        assert_eq!(form.agent_name, "Sam Agent");
        assert_eq!(form.agency_name, "Example Realty");
        assert!(form.products.gas);
        assert!(!form.products.electricity);
        assert_eq!(
            form.selected_date,
            NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
        );
        assert_eq!(
            form.cursor_month,
            NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
        );
    }

    #[test]
    fn hydration_defaults_absent_fields() {
        let lead: Lead = serde_json::from_str(r#"{"tenant": {"firstName": "Alex"}}"#)
            .expect("partial lead parses");
        let form = LeadFormState::from_lead(&lead, today());

        assert_eq!(form.first_name, "Alex");
        assert_eq!(form.second_name, "");
        assert_eq!(form.postcode, "");
        assert!(!form.products.gas);
        assert_eq!(form.selected_date, today());
    }

    #[test]
    fn payload_reflects_draft_and_fixed_now() {
        let mut form = LeadFormState::from_lead(&sample_lead(), today());
        form.postcode = "2000".to_string();
        let now = Utc
            .with_ymd_and_hms(2024, 5, 15, 10, 30, 0)
            .single()
            .expect("valid timestamp");

        let payload = form.create_payload(now);

        assert_eq!(payload.tenant.first_name, "Jane");
        assert_eq!(payload.address.post_code, Some(2000));
        assert_eq!(payload.address.unit, "");
        assert_eq!(payload.address.city, "");
        assert_eq!(payload.referring_agent.name, "Sam Agent");
        assert_eq!(payload.referring_agent.email, "");
        assert!(payload.services.gas);
        assert!(!payload.services.electricity);
        assert!(!payload.services.water);
        assert_eq!(payload.lease_start_date, "2024-06-01");
        assert_eq!(payload.submitted, "2024-05-15T10:30:00.000Z");
        assert!(!payload.renewal);

        // Same draft, same now, same payload.
        assert_eq!(form.create_payload(now), payload);
    }

    #[test]
    fn unparseable_postcode_becomes_null() {
        let mut form = LeadFormState::new(today());
        form.postcode = "abc".to_string();

        let payload = form.create_payload(Utc::now());
        assert_eq!(payload.address.post_code, None);

        let raw = serde_json::to_string(&payload).expect("payload serializes");
        assert!(raw.contains(r#""postCode":null"#));
    }

    #[test]
    fn water_and_broadband_toggles_are_inert() {
        let mut form = LeadFormState::new(today());

        for _ in 0..3 {
            form.toggle_product(Product::Water);
            form.toggle_product(Product::Broadband);
        }
        assert_eq!(form.products, ProductSelection::default());
        assert!(!form.create_payload(Utc::now()).services.water);

        form.toggle_product(Product::Gas);
        assert!(form.products.gas);
        form.toggle_product(Product::Gas);
        assert!(!form.products.gas);
    }

    #[test]
    fn selecting_a_day_sets_date_and_collapses_calendar() {
        let mut form = LeadFormState::new(today());
        form.toggle_calendar();
        assert!(form.show_calendar);

        form.change_month(1);
        form.select_day(3);

        assert!(!form.show_calendar);
        assert_eq!(
            form.selected_date,
            NaiveDate::from_ymd_opt(2024, 6, 3).expect("valid date")
        );
        assert!(form.is_selected(3));
        assert!(!form.is_selected(4));
    }

    #[test]
    fn invalid_day_leaves_selection_untouched() {
        let mut form = LeadFormState::new(today());
        form.toggle_calendar();
        form.select_day(32);

        assert_eq!(form.selected_date, today());
        assert!(form.show_calendar);
    }

    #[test]
    fn calendar_and_agent_dropdown_flags_are_independent() {
        let mut form = LeadFormState::new(today());
        form.toggle_calendar();
        form.toggle_agent_dropdown();
        assert!(form.show_calendar);
        assert!(form.show_agent_dropdown);

        form.toggle_calendar();
        assert!(!form.show_calendar);
        assert!(form.show_agent_dropdown);
    }

    #[test]
    fn short_input_clears_suggestions_without_query() {
        let mut form = LeadFormState::new(today());
        form.suggestions = vec![suggestion(SuggestionAddress::default())];

        let query = form.billing_address_changed("ab");
        assert!(query.is_none());
        assert!(form.suggestions.is_empty());
        assert_eq!(form.billing_address, "ab");
    }

    #[test]
    fn three_characters_issue_a_query() {
        let mut form = LeadFormState::new(today());
        let query = form.billing_address_changed("abc").expect("query issued");
        assert_eq!(query.text, "abc");
    }

    #[test]
    fn stale_responses_are_dropped() {
        let mut form = LeadFormState::new(today());
        let first = form.billing_address_changed("100 Qu").expect("first query");
        let second = form.billing_address_changed("100 Que").expect("second query");

        form.apply_suggestions(&second, Ok(vec![suggestion(SuggestionAddress::default())]));
        assert_eq!(form.suggestions.len(), 1);

        // The older lookup finishing late must not clobber the newer result.
        form.apply_suggestions(&first, Ok(vec![]));
        assert_eq!(form.suggestions.len(), 1);
    }

    #[test]
    fn failed_lookup_clears_suggestions() {
        let mut form = LeadFormState::new(today());
        form.suggestions = vec![suggestion(SuggestionAddress::default())];
        let query = form.billing_address_changed("100 Queen St").expect("query issued");

        form.apply_suggestions(
            &query,
            Err(CrmError::Rejected {
                status: 503,
                body: "unavailable".to_string(),
            }),
        );
        assert!(form.suggestions.is_empty());
    }

    #[test]
    fn selecting_a_suggestion_fills_fields_with_fallbacks() {
        let mut form = LeadFormState::new(today());
        let picked = suggestion(SuggestionAddress {
            road: Some("New Rd".to_string()),
            suburb: None,
            city: None,
            town: Some("Fitzroy".to_string()),
            postcode: None,
            state: Some("VIC".to_string()),
        });
        form.suggestions = vec![picked.clone()];

        form.select_suggestion(&picked);

        assert_eq!(form.billing_address, "2 New Rd, Fitzroy VIC 3065");
        assert_eq!(form.street_address, "New Rd");
        assert_eq!(form.suburb, "Fitzroy");
        assert_eq!(form.postcode, AUTO_POPULATE);
        assert_eq!(form.state, "VIC");
        assert!(form.suggestions.is_empty());
    }

    #[test]
    fn suburb_takes_priority_over_city_and_town() {
        let mut form = LeadFormState::new(today());
        let picked = suggestion(SuggestionAddress {
            suburb: Some("Carlton".to_string()),
            city: Some("Melbourne".to_string()),
            town: Some("Elsewhere".to_string()),
            ..SuggestionAddress::default()
        });

        form.select_suggestion(&picked);
        assert_eq!(form.suburb, "Carlton");
    }

    #[test]
    fn reset_returns_to_blank_draft() {
        let mut form = LeadFormState::from_lead(&sample_lead(), today());
        form.toggle_calendar();

        form.reset(today());

        assert_eq!(form.first_name, "");
        assert_eq!(form.postcode, "");
        assert_eq!(form.products, ProductSelection::default());
        assert_eq!(form.selected_date, today());
        assert!(!form.show_calendar);
    }
}
