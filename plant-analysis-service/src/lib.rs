//! Plant photo analysis over Gemini, with PDF reports of the result.
pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod services;
pub mod startup;
