//! Image-pull diff: which images actually moved.

use once_cell::sync::Lazy;
use regex::Regex;

static NEWER_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Downloaded newer image for (.+)").expect("valid pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpdate {
    pub image: String,
    pub old_digest: Option<String>,
    pub new_digest: Option<String>,
    pub updated: bool,
}

/// Parse `pull` output. Only "Downloaded newer image for …" lines count;
/// "Image is up to date" and everything else contribute nothing. Never
/// errors: an empty list means no pulls.
pub fn parse_pull_output(output: &str) -> Vec<ImageUpdate> {
    let mut updates = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if let Some(caps) = NEWER_IMAGE.captures(line) {
            updates.push(ImageUpdate {
                image: caps[1].to_string(),
                old_digest: None,
                new_digest: None,
                updated: true,
            });
        }
    }
    updates
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED_OUTPUT: &str = r#"
Pulling db ... done
Pulling redis ... downloading
kkengine Pulled
Status: Downloaded newer image for mariadb:10.6
Status: Image is up to date for redis:7-alpine
Status: Downloaded newer image for kkauto/kkengine:latest
"#;

    #[test]
    fn test_parses_only_newer_image_lines() {
        let updates = parse_pull_output(MIXED_OUTPUT);
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].image, "mariadb:10.6");
        assert_eq!(updates[1].image, "kkauto/kkengine:latest");
        assert!(updates.iter().all(|u| u.updated));
    }

    #[test]
    fn test_up_to_date_output_yields_empty_list() {
        let output = "Status: Image is up to date for mariadb:10.6\n";
        assert!(parse_pull_output(output).is_empty());
        assert!(parse_pull_output("").is_empty());
    }

    #[test]
    fn test_idempotent_over_same_input() {
        assert_eq!(parse_pull_output(MIXED_OUTPUT), parse_pull_output(MIXED_OUTPUT));
    }
}
