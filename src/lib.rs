/*!
 * # Udaan - translation broker
 *
 * A Rust library that brokers text-translation requests between callers
 * and a pluggable translation engine.
 *
 * ## Features
 *
 * - Request validation before any engine call (length, language codes, batch size)
 * - Interchangeable engines bound once at startup:
 *   - Mock (deterministic, offline)
 *   - Generative (Anthropic Messages API)
 *   - Provider (LibreTranslate-compatible API)
 * - Bulk translation with bounded concurrency, per-call timeouts,
 *   order preservation and fail-soft partial results
 * - Append-only SQLite audit log of every attempt
 * - Time-windowed usage statistics computed from the audit log
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `validation`: Request validation
 * - `providers`: Translation engines and the `TranslationEngine` trait
 * - `translation`: Request/result types, bulk dispatch and the service facade:
 *   - `translation::core`: `TranslationService`
 *   - `translation::batch`: Bulk dispatch
 * - `database`: Audit log storage
 * - `stats`: Usage statistics
 * - `app_controller`: CLI command execution
 * - `language_utils`: ISO 639-1 language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod database;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod stats;
pub mod translation;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use database::{AuditLog, LogEntry, LogStatus};
pub use errors::{AppError, ConfigError, EngineError, EngineErrorKind, PersistenceError, ValidationError};
pub use providers::{build_engine, TranslationEngine};
pub use stats::StatsWindow;
pub use translation::{BulkItem, BulkResult, TranslationRequest, TranslationResult, TranslationService};
