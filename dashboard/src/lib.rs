//! Terminal dashboard for GEO Insights: brand visibility scores across AI
//! platforms, evaluation runs, prompt research and diagnosis reports.

pub mod analytics;
pub mod api;
pub mod app;
pub mod auth;
pub mod collector;
pub mod config;
pub mod error;
pub mod export;
pub mod filters;
pub mod i18n;
pub mod logging;
pub mod model;
pub mod notifications;
pub mod query;
pub mod route;
pub mod storage;
pub mod ui;
