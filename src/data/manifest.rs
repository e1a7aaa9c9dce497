use std::path::{Component, Path};

/// One well-formed manifest line: an image file name and its class label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub image_name: String,
    pub label: String,
}

/// Classification of a single manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLine {
    /// Empty or whitespace-only line
    Blank,
    Entry(ManifestEntry),
    /// Non-blank line that is not exactly `<image_name> <label>`, or whose
    /// fields would escape the output tree
    Malformed(String),
}

/// Parse one manifest line.
///
/// Format: `image_name label`, separated by any run of whitespace.
pub fn parse_manifest_line(line: &str) -> ManifestLine {
    let line = line.trim();
    if line.is_empty() {
        return ManifestLine::Blank;
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [image_name, label] if is_plain_name(image_name) && is_plain_name(label) => {
            ManifestLine::Entry(ManifestEntry {
                image_name: (*image_name).to_string(),
                label: (*label).to_string(),
            })
        }
        _ => ManifestLine::Malformed(line.to_string()),
    }
}

/// Iterate over manifest content, yielding 1-based line numbers.
pub fn parse_manifest(content: &str) -> impl Iterator<Item = (usize, ManifestLine)> + '_ {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, parse_manifest_line(line)))
}

// A name must be a single normal path component so `root/label/image` stays under `root`.
fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(image_name: &str, label: &str) -> ManifestLine {
        ManifestLine::Entry(ManifestEntry {
            image_name: image_name.to_string(),
            label: label.to_string(),
        })
    }

    #[test]
    fn test_parse_well_formed_line() {
        assert_eq!(parse_manifest_line("fish1.jpg crab"), entry("fish1.jpg", "crab"));
        assert_eq!(parse_manifest_line("  fish1.jpg\t\tcrab  "), entry("fish1.jpg", "crab"));
    }

    #[test]
    fn test_parse_blank_lines() {
        assert_eq!(parse_manifest_line(""), ManifestLine::Blank);
        assert_eq!(parse_manifest_line("   \t "), ManifestLine::Blank);
    }

    #[test]
    fn test_parse_wrong_token_count_is_malformed() {
        assert_eq!(
            parse_manifest_line("bad_line"),
            ManifestLine::Malformed("bad_line".to_string())
        );
        assert_eq!(
            parse_manifest_line("a.jpg sea star"),
            ManifestLine::Malformed("a.jpg sea star".to_string())
        );
    }

    #[test]
    fn test_parse_path_escapes_are_malformed() {
        assert!(matches!(parse_manifest_line("../a.jpg crab"), ManifestLine::Malformed(_)));
        assert!(matches!(parse_manifest_line("sub/a.jpg crab"), ManifestLine::Malformed(_)));
        assert!(matches!(parse_manifest_line("a.jpg .."), ManifestLine::Malformed(_)));
        assert!(matches!(parse_manifest_line("a.jpg ."), ManifestLine::Malformed(_)));
    }

    #[test]
    fn test_parse_manifest_numbers_lines() {
        let lines: Vec<_> = parse_manifest("a.jpg crab\n\nbad\n").collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], (1, entry("a.jpg", "crab")));
        assert_eq!(lines[1], (2, ManifestLine::Blank));
        assert_eq!(lines[2], (3, ManifestLine::Malformed("bad".to_string())));
    }
}
