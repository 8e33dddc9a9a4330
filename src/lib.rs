//! Chat transcript analysis: parse an exported chat into message records and
//! reduce them into activity, lexical and sentiment tables.

pub mod analysis;
pub mod config;
pub mod transcript;
pub mod web;
