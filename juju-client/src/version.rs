/// Drop the series and arch fields from a `juju --version` report.
///
/// `2.0-beta7-xenial-amd64` becomes `2.0-beta7`, `1.25.5-trusty-amd64`
/// becomes `1.25.5`. Reports with fewer than three fields come back empty.
pub fn strip_build_suffix(report: &str) -> String {
    let fields: Vec<&str> = report.trim().split('-').collect();
    let keep = fields.len().saturating_sub(2);
    fields[..keep].join("-")
}
