use serde::{Deserialize, Serialize};

/// Tenant contact details captured in step one of the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tenant {
    pub first_name: String,
    pub second_name: String,
    pub email: String,
    pub mobile: String,
}

/// Move-in address. `post_code` is an integer or JSON `null`; unparseable
/// form input is passed through as `null` without raising a validation error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    pub text: String,
    pub unit: String,
    pub street_number: String,
    pub street_name: String,
    pub locality: String,
    pub post_code: Option<i64>,
    pub state: String,
    pub city: String,
    pub country: String,
}

/// Referring agent or agency. Only `name` is populated by the current form;
/// `email` and `partner_code` are reserved for later phases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Referral {
    pub name: String,
    pub email: String,
    pub partner_code: String,
}

/// Fixed set of service flags exchanged with the CRM. Only gas and
/// electricity are user-editable in phase one; the rest stay false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Services {
    pub gas: bool,
    pub electricity: bool,
    pub internet: bool,
    pub telephone: bool,
    #[serde(rename = "payTV")]
    pub pay_tv: bool,
    pub cleaning: bool,
    pub removalist: bool,
    pub moving_boxes: bool,
    pub vehicle_hire: bool,
    pub water: bool,
}

/// The lead record exchanged with the CRM. Every field defaults so a partial
/// record (for example navigation state from an earlier screen) still
/// hydrates the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Lead {
    pub tenant: Tenant,
    pub address: Address,
    pub referring_agent: Referral,
    pub referring_agency: Referral,
    pub services: Services,
    pub submitted: String,
    pub lease_start_date: String,
    pub renewal: bool,
}

/// Base-10 integer-prefix parse of the postcode draft field: optional sign,
/// then leading digits. Non-numeric input yields `None`, which serializes as
/// `null` in the payload.
pub fn parse_post_code(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let value = digits.parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}
