//! # Error Suggestions
//!
//! Errors should tell the operator what went wrong and how to fix it. The
//! helpers here build the command-layer errors that carry `hint:` lines, and
//! the "did you mean" suggestion shown when a closed-choice value is
//! mistyped.

use std::path::Path;

/// Generate an error for a template directory that does not exist.
pub fn template_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Template directory not found: {path}\n\n\
         hint: Run from the template repository root\n\
         hint: Use --template to point to the template directory",
        path = path.display()
    )
}

/// Generate an error for a missing Terraform modules directory.
pub fn terraform_modules_not_found(path: &Path, module: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Terraform module not found: {module} (looked in {path})\n\n\
         hint: Use --terraform-modules-dir to point to the directory holding \
         the '{module}' module",
        path = path.display()
    )
}

/// Generate an error for a `--format` value the command cannot print.
pub fn unknown_format(format: &str, formats: &[&str]) -> anyhow::Error {
    let did_you_mean = did_you_mean(format, formats)
        .map(|s| format!("\nhint: {s}"))
        .unwrap_or_default();
    anyhow::anyhow!(
        "Unknown output format: {format}{did_you_mean}\n\n\
         Valid formats are: {valid}",
        valid = formats.join(", ")
    )
}

/// "Did you mean '...'?" for a value close to one of `candidates`.
pub fn did_you_mean(input: &str, candidates: &[&str]) -> Option<String> {
    find_similar(input, candidates).map(|s| format!("Did you mean '{s}'?"))
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let input = input.trim().to_lowercase();
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(&input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}
