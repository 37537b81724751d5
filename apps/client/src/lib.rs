//! Headless client for the resume builder: validates the form, renders the
//! live preview, submits to the backend and saves the generated files.
//!
//! Everything page-specific goes through the [`view::View`] port.

pub mod backend;
pub mod config;
pub mod controller;
pub mod download;
pub mod errors;
pub mod models;
pub mod notice;
pub mod preview;
pub mod validation;
pub mod view;
