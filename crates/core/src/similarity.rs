//! Normalized string similarity used for release↔torrent appearance matching (§4.10, §9).
//!
//! The design leaves the exact algorithm open ("any Levenshtein-family or token-set ratio with
//! comparable behavior is acceptable; pin a reference implementation in tests"); this pins
//! normalized Levenshtein similarity over a lightly tokenized form of both strings, so that
//! separator characters (`.`, `_`, `-`) that differ between a release title and a downloader's
//! on-disk name don't dominate the distance.

/// Default similarity threshold `θ_sim` from §4.10/§9.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

/// Default appearance window `T_window` from §4.10/§9.
pub const DEFAULT_APPEARANCE_WINDOW_SECS: i64 = 3;

fn normalize(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A normalized token-level similarity ratio in `[0.0, 1.0]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&normalize(a), &normalize(b))
}

/// True if `a` and `b` are similar enough to be considered the same release (§4.10).
pub fn matches(a: &str, b: &str, threshold: f64) -> bool {
    similarity(a, b) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_names_are_fully_similar() {
        assert_eq!(similarity("Blade.Runner.2049", "Blade.Runner.2049"), 1.0);
    }

    #[test]
    fn separator_differences_do_not_dominate() {
        let sim = similarity(
            "Blade.Runner.2049.2160p.BluRay.TrueHD-GRP",
            "Blade Runner 2049 2160p BluRay TrueHD-GRP",
        );
        assert!(sim > DEFAULT_SIMILARITY_THRESHOLD);
    }

    #[test]
    fn unrelated_names_fall_below_threshold() {
        assert!(!matches(
            "Blade Runner 2049",
            "The Lighthouse 2019",
            DEFAULT_SIMILARITY_THRESHOLD
        ));
    }
}
