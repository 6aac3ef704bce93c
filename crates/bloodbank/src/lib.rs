//! `bloodbank` - a local blood donor directory
//!
//! This library provides a donor directory with search and editing, and a
//! contact-message log, persisted as JSON collections in a local key-value
//! store.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;

pub use config::Config;
pub use directory::{Ack, Directory, DonorFilter, MessageReceipt, Stats};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{BloodGroup, Donor, DonorPatch, Gender, Message, NewDonor, NewMessage};
pub use storage::Storage;
