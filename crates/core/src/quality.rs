//! Release-title quality parsing and scoring (§4.1).
//!
//! Parsing is case-insensitive regex matching of a fixed vocabulary; the first match in each
//! family wins. Scoring sums fixed per-family point tables, weighted so lossless audio
//! dominates, then resolution, source, HDR, codec, with a banded seeder bonus on top. The
//! function is pure: same title and seeder count always produce the same score.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// The quality facets extracted from a release title. Each field is `None` when no vocabulary
/// entry for that family matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityFacets {
    pub resolution: Option<String>,
    pub audio: Option<String>,
    pub hdr: Option<String>,
    pub video_codec: Option<String>,
    pub source: Option<String>,
    pub release_group: Option<String>,
}

struct FacetRule {
    pattern: &'static str,
    label: &'static str,
    score: i64,
}

// Ordered highest score first within a family; the first pattern that matches wins, so more
// specific/valuable vocabulary entries must precede more general ones.
const RESOLUTION_RULES: &[FacetRule] = &[
    FacetRule { pattern: r"2160p|\b4k\b|\buhd\b", label: "2160p", score: 100 },
    FacetRule { pattern: r"1080p", label: "1080p", score: 70 },
    FacetRule { pattern: r"720p", label: "720p", score: 40 },
    FacetRule { pattern: r"480p", label: "480p", score: 10 },
];

const AUDIO_RULES: &[FacetRule] = &[
    FacetRule { pattern: r"true[\s.\-]?hd", label: "TrueHD", score: 100 },
    FacetRule { pattern: r"dts[\s.\-]?hd[\s.\-]?ma", label: "DTS-HD MA", score: 95 },
    FacetRule { pattern: r"atmos", label: "Atmos", score: 95 },
    FacetRule { pattern: r"dts[\s.\-]?x", label: "DTS-X", score: 70 },
    FacetRule { pattern: r"dts[\s.\-]?hd", label: "DTS-HD", score: 90 },
    FacetRule { pattern: r"lpcm", label: "LPCM", score: 85 },
    FacetRule { pattern: r"flac", label: "FLAC", score: 80 },
    FacetRule { pattern: r"dts", label: "DTS", score: 60 },
    FacetRule { pattern: r"dd\+|ddp|eac3", label: "DD+", score: 55 },
    FacetRule { pattern: r"ac3|dd5[\s.\-]?1", label: "DD5.1", score: 50 },
    FacetRule { pattern: r"aac", label: "AAC", score: 40 },
    FacetRule { pattern: r"mp3", label: "MP3", score: 20 },
];

const HDR_RULES: &[FacetRule] = &[
    FacetRule { pattern: r"dolby[\s.\-]?vision|\bdv\b", label: "Dolby Vision", score: 50 },
    FacetRule { pattern: r"hdr10\+|hdr10plus", label: "HDR10+", score: 45 },
    FacetRule { pattern: r"hdr10", label: "HDR10", score: 40 },
    FacetRule { pattern: r"\bhdr\b", label: "HDR", score: 35 },
    FacetRule { pattern: r"\bhlg\b", label: "HLG", score: 30 },
];

const VIDEO_CODEC_RULES: &[FacetRule] = &[
    FacetRule { pattern: r"\bav1\b", label: "AV1", score: 35 },
    FacetRule { pattern: r"x265|hevc|h\.?265", label: "HEVC", score: 30 },
    FacetRule { pattern: r"\bvp9\b", label: "VP9", score: 25 },
    FacetRule { pattern: r"x264|h\.?264|\bavc\b", label: "x264", score: 20 },
    FacetRule { pattern: r"xvid|mpeg4", label: "XviD", score: 5 },
];

const SOURCE_RULES: &[FacetRule] = &[
    FacetRule { pattern: r"remux", label: "Remux", score: 50 },
    FacetRule { pattern: r"blu[\s.\-]?ray|bdrip|brrip", label: "BluRay", score: 45 },
    FacetRule { pattern: r"web[\s.\-]?dl", label: "WEB-DL", score: 30 },
    FacetRule { pattern: r"webrip", label: "WEBRip", score: 25 },
    FacetRule { pattern: r"hdtv", label: "HDTV", score: 20 },
    FacetRule { pattern: r"dvdrip", label: "DVDRip", score: 10 },
    FacetRule { pattern: r"\bcam\b|\bts\b|telesync|telecine|screener", label: "CAM", score: 1 },
];

const RELEASE_GROUP_PATTERN: &str = r"-([A-Za-z0-9]+)(?:\.[a-z0-9]{2,4})?$";

macro_rules! family_matcher {
    ($name:ident, $rules:expr) => {
        fn $name() -> &'static Vec<(Regex, &'static str, i64)> {
            static CELL: OnceLock<Vec<(Regex, &'static str, i64)>> = OnceLock::new();
            CELL.get_or_init(|| {
                $rules
                    .iter()
                    .map(|rule| {
                        (
                            Regex::new(&format!("(?i){}", rule.pattern)).expect("static pattern is valid"),
                            rule.label,
                            rule.score,
                        )
                    })
                    .collect()
            })
        }
    };
}

family_matcher!(resolution_matcher, RESOLUTION_RULES);
family_matcher!(audio_matcher, AUDIO_RULES);
family_matcher!(hdr_matcher, HDR_RULES);
family_matcher!(video_codec_matcher, VIDEO_CODEC_RULES);
family_matcher!(source_matcher, SOURCE_RULES);

fn release_group_matcher() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| Regex::new(RELEASE_GROUP_PATTERN).expect("static pattern is valid"))
}

fn first_match(title: &str, family: &'static Vec<(Regex, &'static str, i64)>) -> Option<(String, i64)> {
    family
        .iter()
        .find(|(re, _, _)| re.is_match(title))
        .map(|(_, label, score)| (label.to_string(), *score))
}

fn seeder_bonus(seeders: i64) -> i64 {
    if seeders >= 100 {
        20
    } else if seeders >= 50 {
        15
    } else if seeders >= 20 {
        10
    } else if seeders >= 5 {
        5
    } else {
        0
    }
}

/// Parse a release title into its quality facets and total score, given the release's
/// current seeder count. Pure and deterministic (§8 property 3).
pub fn score_release(title: &str, seeders: i64) -> (QualityFacets, i64) {
    let mut total = 0i64;

    let resolution = first_match(title, resolution_matcher());
    if let Some((_, s)) = &resolution {
        total += s;
    }
    let audio = first_match(title, audio_matcher());
    if let Some((_, s)) = &audio {
        total += s;
    }
    let hdr = first_match(title, hdr_matcher());
    if let Some((_, s)) = &hdr {
        total += s;
    }
    let video_codec = first_match(title, video_codec_matcher());
    if let Some((_, s)) = &video_codec {
        total += s;
    }
    let source = first_match(title, source_matcher());
    if let Some((_, s)) = &source {
        total += s;
    }

    total += seeder_bonus(seeders);

    let release_group = release_group_matcher()
        .captures(title)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    let facets = QualityFacets {
        resolution: resolution.map(|(label, _)| label),
        audio: audio.map(|(label, _)| label),
        hdr: hdr.map(|(label, _)| label),
        video_codec: video_codec.map(|(label, _)| label),
        source: source.map(|(label, _)| label),
        release_group,
    };

    (facets, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_facet_set_and_release_group() {
        let (facets, _) = score_release("Blade.Runner.2049.2160p.BluRay.TrueHD-GRP", 0);
        assert_eq!(facets.resolution.as_deref(), Some("2160p"));
        assert_eq!(facets.audio.as_deref(), Some("TrueHD"));
        assert_eq!(facets.source.as_deref(), Some("BluRay"));
        assert_eq!(facets.release_group.as_deref(), Some("GRP"));
    }

    #[test]
    fn scores_are_pinned_and_deterministic() {
        let (_, score_a) = score_release("Blade.Runner.2049.2160p.BluRay.TrueHD-GRP", 50);
        let (_, score_b) = score_release("Blade.Runner.2049.2160p.BluRay.TrueHD-GRP", 50);
        assert_eq!(score_a, score_b);
        // 2160p(100) + TrueHD(100) + BluRay(45) + seeder band >=50 (15) = 260
        assert_eq!(score_a, 260);
    }

    #[test]
    fn low_quality_release_scores_far_below_high_quality() {
        let (_, high) = score_release("Blade.Runner.2049.2160p.BluRay.TrueHD-GRP", 50);
        let (_, low) = score_release("Blade.Runner.2049.720p.WEBRip", 4);
        assert!(high > low);
    }

    #[test]
    fn seeder_bonus_bands_match_spec() {
        assert_eq!(seeder_bonus(150), 20);
        assert_eq!(seeder_bonus(60), 15);
        assert_eq!(seeder_bonus(25), 10);
        assert_eq!(seeder_bonus(5), 5);
        assert_eq!(seeder_bonus(4), 0);
    }

    #[test]
    fn missing_vocabulary_leaves_facet_unset() {
        let (facets, score) = score_release("some.random.release.name", 0);
        assert!(facets.resolution.is_none());
        assert!(facets.audio.is_none());
        assert_eq!(score, 0);
    }
}
