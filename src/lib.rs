//! # DataViz Studio
//!
//! Turns a batch of heterogeneous business files into a self-contained,
//! navigable HTML presentation.
//!
//! Files (spreadsheets, delimited text, PDFs, word-processing documents,
//! slide decks, JSON) are extracted into a uniform [`models::ExtractedDocument`]
//! shape, analyzed into narrative metrics and insights, and synthesized into a
//! single HTML document styled by a named theme and color palette.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────┐   ┌────────────┐
//! │  Adapters   │──▶│ Normalizer  │──▶│ Analyzer │──▶│ Synthesizer│
//! │ xlsx/pdf/.. │   │  (batch)    │   │          │   │   (HTML)   │
//! └─────────────┘   └─────────────┘   └──────────┘   └─────┬──────┘
//!                                                          │
//!                                  ┌───────────────────────┤
//!                                  ▼                       ▼
//!                             ┌──────────┐           ┌──────────┐
//!                             │   CLI    │           │   HTTP   │
//!                             │  (dvz)   │           │  (axum)  │
//!                             └──────────┘           └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! dvz parse report.xlsx notes.pdf        # extracted documents as JSON
//! dvz build ./data --theme dark          # analyze + render in one step
//! dvz render analysis.json -o deck.html  # render existing analysis
//! dvz serve                              # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`extract`] | Per-format adapters |
//! | [`normalize`] | Adapter output → `ExtractedDocument` |
//! | [`ingest`] | Batch ingestion with failure isolation |
//! | [`analysis`] | Heuristic and remote analyzers |
//! | [`commands`] | `dvz` subcommand implementations |
//! | [`theme`] | Theme and palette resolution |
//! | [`render`] | HTML presentation synthesis |
//! | [`navigation`] | Section navigation model |
//! | [`progress`] | Ingestion progress reporting |
//! | [`server`] | HTTP API |

pub mod analysis;
pub mod commands;
pub mod config;
pub mod extract;
pub mod ingest;
pub mod models;
pub mod navigation;
pub mod normalize;
pub mod progress;
pub mod render;
pub mod server;
pub mod theme;
