//! # simreg-appium
//!
//! A minimal Appium/WebDriver client for driving an Android application's
//! UI over HTTP, sized for the needs of the registration prober: session
//! lifecycle, foreground-app control, element location, and keystroke
//! injection.
//!
//! The wire format is W3C WebDriver with the Appium vendor extensions the
//! UiAutomator2 driver understands. Locating an element that does not
//! exist is a normal negative result (`Ok(None)`), never an error; only
//! transport-level and server-reported failures surface as [`Error`].
//!
//! ## Modules
//!
//! - [`config`]: session configuration and capability construction
//! - [`protocol`]: wire types
//! - [`session`]: the live session and its remote commands

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod protocol;
pub mod session;

pub use config::DriverConfig;
pub use error::{Error, Result};
pub use protocol::{Capabilities, ElementRef, Locator, Strategy};
pub use session::{KEYCODE_DEL, Session};
