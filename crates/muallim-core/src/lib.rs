//! Core library for the lesson-plan card generator.
//!
//! Turns a lesson context (level, period, week, subject) plus optional
//! image/PDF attachments into a structured [`plan::LessonPlan`] by way of a
//! hosted generative model, and renders that plan as a printable card.

pub mod client;
pub mod controller;
pub mod form;
pub mod ingest;
pub mod plan;
pub mod render;
