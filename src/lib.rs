//! Deployment shim for the Food Calorie Prediction app.
//!
//! The real application is a Streamlit ML app that runs in Docker. This
//! crate is the small HTTP surface that stands in front of it on
//! serverless hosting: it answers health probes, serves a deployment
//! instructions page and any exported static assets, and turns every
//! other request into a structured 404. A background pinger can keep
//! the upstream deployments from idling out.

pub mod config;
pub mod handler;
pub mod http;
pub mod keepalive;
pub mod logger;
pub mod server;
