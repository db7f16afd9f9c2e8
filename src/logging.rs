use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};

use log::LevelFilter;
use reqwest::StatusCode;

/// Name of the dynamic log4rs filter guarding per-request HTTP logging.
pub const HTTP_FILTER: &str = "http";

/// A unique identifier for an outgoing request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct RequestId(pub usize);

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RequestId {
    /// Atomically get the next ID. This wraps around back to zero if you somehow exceed a usize.
    pub fn next() -> RequestId {
        static REQUEST_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);
        RequestId(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Log an outgoing request and hand back its ID.
///
/// Request logging goes to this module's target, which `log4rs.yaml` routes
/// through the [`HTTP_FILTER`] dynamic filter.
pub fn log_request(method: &str, url: &str) -> RequestId {
    let id = RequestId::next();
    info!("->req{id} {method} {url}");
    id
}

/// Log the response to request `id`, at a level matching its status class.
pub fn log_response(id: RequestId, status: StatusCode, url: &str) {
    let log_msg = format!("<-rsp{id} {status} {url}");
    if status.is_server_error() {
        error!("{log_msg}");
    } else if status.is_client_error() {
        warn!("{log_msg}");
    } else {
        info!("{log_msg}");
    }
}

/// Log a request that never got a response.
pub fn log_failure(id: RequestId, url: &str, err: &dyn std::error::Error) {
    error!("<-rsp{id} FAILED {url}: {err}");
}

/// Initialise log4rs from `path`, then silence per-request HTTP logging
/// unless `http_trace` is set.
pub fn init(path: &str, http_trace: bool) -> anyhow::Result<()> {
    log4rs::init_file(path, log4rs_dynamic_filters::default_deserializers())?;
    if !http_trace {
        log4rs_dynamic_filters::DynamicLevelFilter::set(HTTP_FILTER, LevelFilter::Off);
    }
    info!("Initialised logging");
    Ok(())
}
