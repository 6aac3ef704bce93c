//! Core record types for bloodbank.
//!
//! This module defines the donor and message records as they are persisted,
//! the payloads used to create or patch them, and the input validation the
//! front end runs before handing payloads to the directory.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Format of `lastDonationDate` values.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Basic `local@domain.tld` shape.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

const MIN_NAME_CHARS: usize = 2;
const MIN_CITY_CHARS: usize = 2;
const MIN_MESSAGE_CHARS: usize = 10;
const MAX_NOTES_CHARS: usize = 200;
const PHONE_DIGITS: usize = 10;

/// Youngest accepted donor age.
pub const MIN_AGE: u8 = 18;
/// Oldest accepted donor age.
pub const MAX_AGE: u8 = 65;

/// ABO/Rh blood group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    /// O positive.
    #[serde(rename = "O+")]
    OPositive,
    /// O negative.
    #[serde(rename = "O-")]
    ONegative,
    /// A positive.
    #[serde(rename = "A+")]
    APositive,
    /// A negative.
    #[serde(rename = "A-")]
    ANegative,
    /// B positive.
    #[serde(rename = "B+")]
    BPositive,
    /// B negative.
    #[serde(rename = "B-")]
    BNegative,
    /// AB positive.
    #[serde(rename = "AB+")]
    AbPositive,
    /// AB negative.
    #[serde(rename = "AB-")]
    AbNegative,
}

impl BloodGroup {
    /// The conventional label, e.g. `AB-`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OPositive => "O+",
            Self::ONegative => "O-",
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
        }
    }
}

impl std::fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Donor gender as recorded at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Other or undisclosed.
    Other,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "Male"),
            Self::Female => write!(f, "Female"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// A registered donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    /// Unique identifier, assigned at registration and never changed.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: u8,
    /// Gender.
    pub gender: Gender,
    /// Blood group.
    pub blood_group: BloodGroup,
    /// Ten-digit phone number.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// City of residence.
    pub city: String,
    /// Date of the most recent donation, if known.
    #[serde(default, deserialize_with = "deserialize_date")]
    pub last_donation_date: Option<NaiveDate>,
    /// Whether the donor can currently be contacted for a donation.
    #[serde(default = "default_available")]
    pub available: bool,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Registration payload: a donor without an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonor {
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: u8,
    /// Gender.
    pub gender: Gender,
    /// Blood group.
    pub blood_group: BloodGroup,
    /// Ten-digit phone number.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// City of residence.
    pub city: String,
    /// Date of the most recent donation, if known.
    #[serde(default, deserialize_with = "deserialize_date")]
    pub last_donation_date: Option<NaiveDate>,
    /// Whether the donor can currently be contacted.
    #[serde(default = "default_available")]
    pub available: bool,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewDonor {
    /// Attach an id, producing the stored record.
    #[must_use]
    pub fn into_donor(self, id: String) -> Donor {
        Donor {
            id,
            name: self.name,
            age: self.age,
            gender: self.gender,
            blood_group: self.blood_group,
            phone: self.phone,
            email: self.email,
            city: self.city,
            last_donation_date: self.last_donation_date,
            available: self.available,
            notes: self.notes,
        }
    }

    /// Check every field against the registration rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first field that fails.
    pub fn validate(&self) -> Result<()> {
        check_min_chars("name", &self.name, MIN_NAME_CHARS)?;
        check_age(self.age)?;
        check_phone(&self.phone)?;
        check_email(&self.email)?;
        check_min_chars("city", &self.city, MIN_CITY_CHARS)?;
        if let Some(notes) = &self.notes {
            check_notes(notes)?;
        }
        Ok(())
    }
}

/// A partial update to a donor.
///
/// Absent fields leave the donor untouched. For the nullable fields the outer
/// `Option` is presence and the inner one is the new value, so
/// `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DonorPatch {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New age.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    /// New gender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// New blood group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<BloodGroup>,
    /// New phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// New email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New city.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// New last donation date, or `Some(None)` to clear it.
    #[serde(
        deserialize_with = "deserialize_patch_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_donation_date: Option<Option<NaiveDate>>,
    /// New availability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    /// New notes, or `Some(None)` to clear them.
    #[serde(
        deserialize_with = "deserialize_patch_notes",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

impl DonorPatch {
    /// Whether the patch carries no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite the fields present in this patch onto `donor`.
    ///
    /// The id is never touched.
    pub fn apply(&self, donor: &mut Donor) {
        if let Some(name) = &self.name {
            donor.name.clone_from(name);
        }
        if let Some(age) = self.age {
            donor.age = age;
        }
        if let Some(gender) = self.gender {
            donor.gender = gender;
        }
        if let Some(blood_group) = self.blood_group {
            donor.blood_group = blood_group;
        }
        if let Some(phone) = &self.phone {
            donor.phone.clone_from(phone);
        }
        if let Some(email) = &self.email {
            donor.email.clone_from(email);
        }
        if let Some(city) = &self.city {
            donor.city.clone_from(city);
        }
        if let Some(date) = self.last_donation_date {
            donor.last_donation_date = date;
        }
        if let Some(available) = self.available {
            donor.available = available;
        }
        if let Some(notes) = &self.notes {
            donor.notes.clone_from(notes);
        }
    }

    /// Check the fields present in this patch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first field that fails.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            check_min_chars("name", name, MIN_NAME_CHARS)?;
        }
        if let Some(age) = self.age {
            check_age(age)?;
        }
        if let Some(phone) = &self.phone {
            check_phone(phone)?;
        }
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        if let Some(city) = &self.city {
            check_min_chars("city", city, MIN_CITY_CHARS)?;
        }
        if let Some(Some(notes)) = &self.notes {
            check_notes(notes)?;
        }
        Ok(())
    }
}

/// A stored contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier.
    pub id: String,
    /// When the message was sent.
    pub at: DateTime<Utc>,
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Message body.
    pub message: String,
}

/// Contact-form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Message body.
    pub message: String,
}

impl NewMessage {
    /// Stamp the payload with an id and send time.
    #[must_use]
    pub fn into_message(self, id: String, at: DateTime<Utc>) -> Message {
        Message {
            id,
            at,
            name: self.name,
            email: self.email,
            message: self.message,
        }
    }

    /// Check the payload against the contact-form rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first field that fails.
    pub fn validate(&self) -> Result<()> {
        check_min_chars("name", &self.name, MIN_NAME_CHARS)?;
        check_email(&self.email)?;
        check_min_chars("message", &self.message, MIN_MESSAGE_CHARS)
    }
}

/// Generate a fresh record identifier.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Parse a `lastDonationDate` value.
///
/// Accepts a plain `YYYY-MM-DD` date or an ISO 8601 timestamp, of which only
/// the calendar date is kept.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the text is neither.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    parse_iso_date(text).ok_or_else(|| {
        Error::validation(
            "lastDonationDate",
            format!("'{text}' is not a YYYY-MM-DD date or ISO timestamp"),
        )
    })
}

fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|at| at.date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|at| at.date())
        })
}

const fn default_available() -> bool {
    true
}

/// Accepts a missing value, `null` or `""` as no date.
///
/// A stored value that is not a date is dropped with a warning so one odd
/// record cannot make the whole collection unreadable.
fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => {
            let date = parse_iso_date(text);
            if date.is_none() {
                tracing::warn!(value = text, "Ignoring unreadable lastDonationDate");
            }
            Ok(date)
        }
    }
}

fn deserialize_patch_date<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_date(deserializer).map(Some)
}

fn deserialize_patch_notes<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn check_min_chars(field: &'static str, value: &str, min: usize) -> Result<()> {
    if value.chars().count() < min {
        return Err(Error::validation(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    Ok(())
}

fn check_age(age: u8) -> Result<()> {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(Error::validation(
            "age",
            format!("must be between {MIN_AGE} and {MAX_AGE}"),
        ));
    }
    Ok(())
}

fn check_phone(phone: &str) -> Result<()> {
    if phone.len() != PHONE_DIGITS || !phone.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::validation(
            "phone",
            format!("must be exactly {PHONE_DIGITS} digits"),
        ));
    }
    Ok(())
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(EMAIL_PATTERN)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn check_email(email: &str) -> Result<()> {
    if !email_regex().is_match(email.trim()) {
        return Err(Error::validation("email", "not a valid email address"));
    }
    Ok(())
}

fn check_notes(notes: &str) -> Result<()> {
    if notes.chars().count() > MAX_NOTES_CHARS {
        return Err(Error::validation(
            "notes",
            format!("must be at most {MAX_NOTES_CHARS} characters"),
        ));
    }
    Ok(())
}
