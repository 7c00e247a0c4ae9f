//! Client core for a token-authenticated remote file-storage service.
//!
//! Components, leaves first: the transport issues authenticated HTTP calls
//! and classifies their outcomes; the session drives the login lifecycle and
//! owns the token; the navigator tracks the current remote directory and its
//! last listing; file operations and the upload traversal act relative to
//! the navigator; the quota poller republishes usage in the background.
//! Rendering is the caller's concern, nothing here touches a screen.

pub mod app_state;
pub mod auth;
pub mod config;
pub mod error;
pub mod navigator;
pub mod operations;
pub mod scheduler;
pub mod storage_service;
pub mod upload;
