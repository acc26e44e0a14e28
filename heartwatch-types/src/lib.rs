//! # heartwatch-types
//!
//! Core types for heart-rate monitoring. This crate defines the reading
//! model shared by the HTTP client, the ingestion engine and the terminal
//! front end.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature for JSON support
//! - **Closed window set**: [`TimeWindow`] only admits the values the data service understands
//!
//! ## Features
//!
//! - `std` (default): Standard library support (`std::error::Error` impls)
//! - `serde`: Serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use heartwatch_types::{RawReading, TimeWindow};
//!
//! let raw = RawReading::new("2024-01-01 12:00:00", 72.0);
//! let reading = raw.validate().unwrap();
//! assert_eq!(reading.heart_rate, 72.0);
//!
//! let window: TimeWindow = "10".parse().unwrap();
//! assert_eq!(window.as_query_param(), "10");
//! assert!("15".parse::<TimeWindow>().is_err());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod reading;
mod window;

pub use reading::*;
pub use window::*;
