pub mod admin;
pub mod auth;
pub mod config;
pub mod errors;
pub mod fingerprint;
pub mod grading;
pub mod model;
pub mod report;
pub mod sandbox;
pub mod service;
pub mod storage;
