//! Headless administration console.
//!
//! Page controllers and the session gate that drive the catalog service
//! over HTTP. Each controller keeps its rows, selection, dialog draft and
//! flags behind a mutex so UI events can call it concurrently; rendering is
//! left to the embedding front end.
//!
//! - [`api`] -- the [`api::CatalogApi`] seam and its query types.
//! - [`http`] -- the `reqwest` implementation of that seam.
//! - [`session`] -- sign-in state for protected views.
//! - [`forms`] -- raw-string drafts and their client-side validation.
//! - [`pages`] -- one controller per administration page.

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod http;
pub mod notices;
pub mod pages;
pub mod session;
