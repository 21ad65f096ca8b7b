use std::path::Path;

/// Longest run of leading `/`-separated components shared by every path.
///
/// ```
/// use tdlb_output::tree::longest_common_ancestor;
///
/// let dirs = [
///     "/media/run/plot_output_np1_gridx44/plot.xzPlane.V5.step_00000020",
///     "/media/run/plot_output_np1_gridx44/plot.xzPlane.V5.step_00000030",
/// ];
/// assert_eq!(longest_common_ancestor(&dirs), "/media/run/plot_output_np1_gridx44");
/// ```
///
/// Note: a single path is returned unchanged, not its parent.  Callers that
/// reduce a set of step directories to their run root must pass at least two.
pub fn longest_common_ancestor<S: AsRef<str>>(paths: &[S]) -> String {
    match paths {
        []    => String::new(),
        [one] => one.as_ref().to_owned(),
        [first, rest @ ..] => {
            let others: Vec<Vec<&str>> = rest.iter().map(|p| p.as_ref().split('/').collect()).collect();
            let mut common = Vec::new();
            for (i, component) in first.as_ref().split('/').enumerate() {
                if others.iter().any(|o| o.get(i) != Some(&component)) {
                    break;
                }
                common.push(component);
            }
            common.join("/")
        }
    }
}

/// `parent/name` of a path, e.g. for display.
pub fn last_two_components(path: &Path) -> String {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    let parent = path
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    format!("{parent}/{name}")
}
