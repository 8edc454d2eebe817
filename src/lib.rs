//! Studio API: backend for a bilingual design studio
//!
//! This crate provides the JSON API behind the studio website:
//! - Course catalog with upcoming sessions and live seat availability
//! - Session registration, cancellation and admin approval
//! - Email/password and Google/GitHub sign-in with cookie sessions
//! - Profiles, gallery and image uploads for the back office

pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod error;
pub mod extract;
pub mod routes;
pub mod services;
pub mod state;
