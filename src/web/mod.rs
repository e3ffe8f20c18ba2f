//! HTML pages served by the dashboard

pub mod handlers;
