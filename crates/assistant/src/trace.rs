//! Trace lines describing each search the assistant ran.

/// A search that returned `total` results.
pub fn search_ok(query: &str, total: u64) -> String {
    format!("searchSolutions(\"{query}\") => {total} results")
}

/// A search that failed.
pub fn search_failed(query: &str) -> String {
    format!("searchSolutions(\"{query}\") => error")
}
