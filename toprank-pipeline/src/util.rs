/// Extract a short type name from the full module path.
///
/// Given `"toprank_pipeline::components::TopNSelector"`, returns `"TopNSelector"`.
pub fn short_type_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}
