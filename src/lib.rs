//! # chireader
//!
//! A terminal reader for a French web-novel site: scrape the listing,
//! novel and chapter pages into typed records, cache them, and read
//! chapters in a virtualized terminal view.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Parser → SiteScraper → Library (cache) → Reader → UI
//! ```
//!
//! - [`fetcher`]: HTTP client restricted to the configured site
//! - [`parser`]: HTML → record parsers driven by CSS selectors
//! - [`scraper`]: Fetch + parse with bounded retries
//! - [`cache`]: Bounded LRU caches with in-flight coalescing
//! - [`reader`]: Chapter state machine and virtualized viewport
//! - [`tui`]: Terminal user interface built with ratatui
//!
//! ## Quick Start
//!
//! ```bash
//! # Latest updates
//! chireader latest
//!
//! # A novel's chapter list as JSON
//! chireader novel https://chireads.com/category/translatedtales/some-novel/ --json
//!
//! # Read from a chapter
//! chireader read https://chireads.com/category/translatedtales/some-novel/chapitre-1/
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together config,
/// scraper and library.
pub mod app;

/// In-memory page caches.
///
/// - [`PageCache`](cache::PageCache): LRU with request coalescing
/// - [`Library`](cache::Library): cached chapter/novel access and prefetch
pub mod cache;

/// Command-line interface using clap.
///
/// - `latest`, `home`, `novel <url>`, `chapter <url>` print records (or JSON)
/// - `read <url>` launches the reader
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/chireader/config.toml`: scraper, cache and reader
/// settings, colors and keybindings.
pub mod config;

/// Core domain models.
///
/// - [`CanonicalUrl`](domain::CanonicalUrl) and the ids derived from it
/// - [`Chapter`](domain::Chapter), [`NovelDetail`](domain::NovelDetail),
///   [`NovelSummary`](domain::NovelSummary)
pub mod domain;

/// HTML fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait, the seam for test doubles
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Page parsers for the home, novel and chapter layouts.
pub mod parser;

/// Chapter reader state machine and virtualized viewport.
pub mod reader;

/// Fetch-and-parse orchestration with retries.
pub mod scraper;

/// Terminal user interface.
///
/// A single reading pane plus a status bar. Only the paragraphs in the
/// viewport window are wrapped and rendered.
pub mod tui;
