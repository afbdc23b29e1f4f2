/*!
 * Validation of incoming translation requests.
 *
 * A request that fails validation is rejected before dispatch: no engine
 * call is made and nothing is written to the audit log.
 */

pub mod request;

// Re-export main types
pub use request::RequestValidator;
