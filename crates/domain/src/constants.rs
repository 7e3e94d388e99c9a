//! Transport constants
//!
//! Centralized location for the timeouts, intervals and header values used
//! by the REST transport.

use std::time::Duration;

// Timeouts
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
pub const CALL_DEADLINE: Duration = Duration::from_secs(10);

// Domain pool
pub const DOMAIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

// Retry kernel delay between region attempts (first attempt is never delayed)
pub const REGION_RETRY_DELAY: Duration = Duration::from_millis(500);

// Headers
pub const CONTENT_TYPE_JSON: &str = "application/json;charset=utf-8";
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";
pub const USER_AGENT_PRODUCT: &str = "AgoraRESTClient";

// Logger
pub const LOG_PREFIX: &str = "[AgoraRESTClient] ";
