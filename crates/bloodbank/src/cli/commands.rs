//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands and turns their
//! arguments into directory payloads.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::directory::{Availability, DonorFilter};
use crate::error::{Error, Result};
use crate::model::{parse_date, BloodGroup, DonorPatch, Gender, NewDonor, NewMessage};

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Donor commands.
#[derive(Debug, Subcommand)]
pub enum DonorsCommand {
    /// Search the donor directory
    List(ListDonorsArgs),

    /// Show a single donor
    Show {
        /// Donor id
        id: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Register a new donor
    Register(RegisterArgs),

    /// Edit an existing donor
    Update(UpdateArgs),
}

/// Donor search arguments.
#[derive(Debug, Args)]
pub struct ListDonorsArgs {
    /// Text matched against name, phone, email, city and blood group
    #[arg(short = 's', long, default_value = "")]
    pub query: String,

    /// Only this blood group
    #[arg(short = 'g', long, value_enum)]
    pub blood_group: Option<BloodGroupArg>,

    /// Only cities containing this text
    #[arg(long, default_value = "")]
    pub city: String,

    /// Filter by availability
    #[arg(short, long, value_enum, default_value = "all")]
    pub available: AvailabilityArg,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl ListDonorsArgs {
    /// Build the directory filter.
    #[must_use]
    pub fn filter(&self) -> DonorFilter {
        DonorFilter {
            query: self.query.clone(),
            blood_group: self.blood_group.map(BloodGroup::from),
            city: self.city.clone(),
            availability: self.available.into(),
        }
    }
}

/// Donor registration arguments.
#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Full name
    #[arg(long)]
    pub name: String,

    /// Age in years (18-65)
    #[arg(long)]
    pub age: u8,

    /// Gender
    #[arg(long, value_enum)]
    pub gender: GenderArg,

    /// Blood group
    #[arg(short = 'g', long, value_enum)]
    pub blood_group: BloodGroupArg,

    /// Ten-digit phone number
    #[arg(long)]
    pub phone: String,

    /// Email address
    #[arg(long)]
    pub email: String,

    /// City
    #[arg(long)]
    pub city: String,

    /// Date of last donation (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub last_donation: Option<String>,

    /// Register the donor as currently unavailable
    #[arg(long)]
    pub unavailable: bool,

    /// Notes (at most 200 characters)
    #[arg(long)]
    pub notes: Option<String>,
}

impl RegisterArgs {
    /// Build and validate the registration payload.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first invalid field.
    pub fn into_payload(self) -> Result<NewDonor> {
        let last_donation_date = self.last_donation.as_deref().map(parse_date).transpose()?;
        let payload = NewDonor {
            name: self.name.trim().to_string(),
            age: self.age,
            gender: self.gender.into(),
            blood_group: self.blood_group.into(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            city: self.city.trim().to_string(),
            last_donation_date,
            available: !self.unavailable,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        };
        payload.validate()?;
        Ok(payload)
    }
}

/// Donor edit arguments.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Donor id
    pub id: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New age
    #[arg(long)]
    pub age: Option<u8>,

    /// New gender
    #[arg(long, value_enum)]
    pub gender: Option<GenderArg>,

    /// New blood group
    #[arg(short = 'g', long, value_enum)]
    pub blood_group: Option<BloodGroupArg>,

    /// New phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// New email
    #[arg(long)]
    pub email: Option<String>,

    /// New city
    #[arg(long)]
    pub city: Option<String>,

    /// New date of last donation (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", conflicts_with = "clear_last_donation")]
    pub last_donation: Option<String>,

    /// Remove the last donation date
    #[arg(long)]
    pub clear_last_donation: bool,

    /// Set availability
    #[arg(long, value_name = "BOOL")]
    pub available: Option<bool>,

    /// New notes
    #[arg(long, conflicts_with = "clear_notes")]
    pub notes: Option<String>,

    /// Remove the notes
    #[arg(long)]
    pub clear_notes: bool,
}

impl UpdateArgs {
    /// Build and validate the patch. Returns the donor id alongside it.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first invalid field, or if no
    /// field was given.
    pub fn into_patch(self) -> Result<(String, DonorPatch)> {
        let last_donation_date = if self.clear_last_donation {
            Some(None)
        } else {
            self.last_donation
                .as_deref()
                .map(parse_date)
                .transpose()?
                .map(Some)
        };
        let notes = if self.clear_notes {
            Some(None)
        } else {
            self.notes.map(Some)
        };

        let patch = DonorPatch {
            name: self.name.map(|s| s.trim().to_string()),
            age: self.age,
            gender: self.gender.map(Gender::from),
            blood_group: self.blood_group.map(BloodGroup::from),
            phone: self.phone.map(|s| s.trim().to_string()),
            email: self.email.map(|s| s.trim().to_string()),
            city: self.city.map(|s| s.trim().to_string()),
            last_donation_date,
            available: self.available,
            notes,
        };
        if patch.is_empty() {
            return Err(Error::validation("patch", "no fields to update"));
        }
        patch.validate()?;
        Ok((self.id, patch))
    }
}

/// Contact message commands.
#[derive(Debug, Subcommand)]
pub enum MessagesCommand {
    /// Send a contact message
    Send(SendMessageArgs),

    /// List stored messages, newest first
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Delete a message
    Delete {
        /// Message id
        id: String,
    },

    /// Delete every message
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Contact message arguments.
#[derive(Debug, Args)]
pub struct SendMessageArgs {
    /// Your name
    #[arg(long)]
    pub name: String,

    /// Your email
    #[arg(long)]
    pub email: String,

    /// The message (at least 10 characters)
    #[arg(short, long)]
    pub message: String,
}

impl SendMessageArgs {
    /// Build and validate the message payload.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first invalid field.
    pub fn into_payload(self) -> Result<NewMessage> {
        let payload = NewMessage {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        };
        payload.validate()?;
        Ok(payload)
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Blood group argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BloodGroupArg {
    /// O positive
    #[value(name = "O+")]
    OPositive,
    /// O negative
    #[value(name = "O-")]
    ONegative,
    /// A positive
    #[value(name = "A+")]
    APositive,
    /// A negative
    #[value(name = "A-")]
    ANegative,
    /// B positive
    #[value(name = "B+")]
    BPositive,
    /// B negative
    #[value(name = "B-")]
    BNegative,
    /// AB positive
    #[value(name = "AB+")]
    AbPositive,
    /// AB negative
    #[value(name = "AB-")]
    AbNegative,
}

impl From<BloodGroupArg> for BloodGroup {
    fn from(arg: BloodGroupArg) -> Self {
        match arg {
            BloodGroupArg::OPositive => Self::OPositive,
            BloodGroupArg::ONegative => Self::ONegative,
            BloodGroupArg::APositive => Self::APositive,
            BloodGroupArg::ANegative => Self::ANegative,
            BloodGroupArg::BPositive => Self::BPositive,
            BloodGroupArg::BNegative => Self::BNegative,
            BloodGroupArg::AbPositive => Self::AbPositive,
            BloodGroupArg::AbNegative => Self::AbNegative,
        }
    }
}

/// Gender argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GenderArg {
    /// Male
    Male,
    /// Female
    Female,
    /// Other
    Other,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Self::Male,
            GenderArg::Female => Self::Female,
            GenderArg::Other => Self::Other,
        }
    }
}

/// Availability argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AvailabilityArg {
    /// Every donor
    #[default]
    All,
    /// Available donors only
    Yes,
    /// Unavailable donors only
    No,
}

impl From<AvailabilityArg> for Availability {
    fn from(arg: AvailabilityArg) -> Self {
        match arg {
            AvailabilityArg::All => Self::All,
            AvailabilityArg::Yes => Self::Yes,
            AvailabilityArg::No => Self::No,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_args() -> RegisterArgs {
        RegisterArgs {
            name: " Jane Doe ".to_string(),
            age: 30,
            gender: GenderArg::Female,
            blood_group: BloodGroupArg::AbNegative,
            phone: "9876543210".to_string(),
            email: "jane@example.com".to_string(),
            city: "Pune".to_string(),
            last_donation: Some("2024-02-01".to_string()),
            unavailable: false,
            notes: Some("   ".to_string()),
        }
    }

    fn update_args(id: &str) -> UpdateArgs {
        UpdateArgs {
            id: id.to_string(),
            name: None,
            age: None,
            gender: None,
            blood_group: None,
            phone: None,
            email: None,
            city: None,
            last_donation: None,
            clear_last_donation: false,
            available: None,
            notes: None,
            clear_notes: false,
        }
    }

    #[test]
    fn test_blood_group_arg_conversion() {
        assert_eq!(BloodGroup::from(BloodGroupArg::AbNegative), BloodGroup::AbNegative);
        assert_eq!(BloodGroup::from(BloodGroupArg::OPositive), BloodGroup::OPositive);
    }

    #[test]
    fn test_availability_arg_conversion() {
        assert_eq!(Availability::from(AvailabilityArg::Yes), Availability::Yes);
        assert_eq!(Availability::from(AvailabilityArg::default()), Availability::All);
    }

    #[test]
    fn test_list_args_filter() {
        let args = ListDonorsArgs {
            query: "jane".to_string(),
            blood_group: Some(BloodGroupArg::APositive),
            city: String::new(),
            available: AvailabilityArg::No,
            format: OutputFormat::Table,
        };
        let filter = args.filter();
        assert_eq!(filter.query, "jane");
        assert_eq!(filter.blood_group, Some(BloodGroup::APositive));
        assert_eq!(filter.availability, Availability::No);
    }

    #[test]
    fn test_register_into_payload() {
        let payload = register_args().into_payload().unwrap();
        assert_eq!(payload.name, "Jane Doe");
        assert_eq!(payload.blood_group, BloodGroup::AbNegative);
        assert!(payload.available);
        assert!(payload.notes.is_none());
        assert_eq!(
            payload.last_donation_date.map(|d| d.to_string()),
            Some("2024-02-01".to_string())
        );
    }

    #[test]
    fn test_register_rejects_invalid() {
        let mut args = register_args();
        args.age = 70;
        assert!(args.into_payload().unwrap_err().is_validation_error());

        let mut args = register_args();
        args.last_donation = Some("yesterday".to_string());
        assert!(args.into_payload().is_err());
    }

    #[test]
    fn test_update_requires_a_field() {
        let err = update_args("a").into_patch().unwrap_err();
        assert!(err.to_string().contains("no fields"));
    }

    #[test]
    fn test_update_into_patch() {
        let mut args = update_args("abc");
        args.city = Some(" Goa ".to_string());
        args.available = Some(false);
        args.clear_notes = true;

        let (id, patch) = args.into_patch().unwrap();
        assert_eq!(id, "abc");
        assert_eq!(patch.city.as_deref(), Some("Goa"));
        assert_eq!(patch.available, Some(false));
        assert_eq!(patch.notes, Some(None));
        assert!(patch.last_donation_date.is_none());
    }

    #[test]
    fn test_update_rejects_bad_phone() {
        let mut args = update_args("abc");
        args.phone = Some("12".to_string());
        assert!(args.into_patch().is_err());
    }

    #[test]
    fn test_send_message_payload() {
        let args = SendMessageArgs {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            message: "  short  ".to_string(),
        };
        assert!(args.into_payload().is_err());
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }
}
