/*!
 * Translation brokering.
 *
 * - `types`: request and result types
 * - `batch`: bulk dispatch under bounded concurrency
 * - `recorder`: best-effort audit writes
 * - `core`: the `TranslationService` facade
 */

// Re-export main types for easier usage
pub use self::batch::BulkDispatcher;
pub use self::core::{HealthReport, HealthStatus, SupportedLanguage, TranslationService};
pub use self::recorder::AuditRecorder;
pub use self::types::{
    BulkItem, BulkRequest, BulkResult, DetectedLanguage, TranslationFailure, TranslationRequest,
    TranslationResult,
};

// Submodules
pub mod batch;
pub mod core;
pub mod recorder;
pub mod types;
