//! Candidate scoring and quality-tier selection.
//!
//! Filenames on the network are free text with inconsistent tagging, so
//! after a hard extension/bitrate filter per tier, candidates are ranked
//! by string similarity against the track's match string. Filtering
//! happens before scoring so comparison cost is only paid for files that
//! could actually be accepted.

mod similarity;

pub use similarity::similarity;

use serde::{Deserialize, Serialize};

use crate::slskd::{FileListing, Offer};

/// An (extension, minimum bitrate) acceptance profile.
///
/// Tiers are tried in priority order per track; the first tier that
/// yields an acceptable candidate wins and later tiers are never tried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityTier {
    /// Required container extension, compared case-insensitively.
    pub extension: String,
    /// Minimum bitrate in kbit/s. Zero also accepts listings whose
    /// bitrate the peer did not report.
    #[serde(default)]
    pub min_bitrate: u32,
}

impl QualityTier {
    pub fn new(extension: &str, min_bitrate: u32) -> Self {
        Self {
            extension: extension.to_string(),
            min_bitrate,
        }
    }

    /// Whether a listing passes this tier's extension and bitrate filter.
    pub fn accepts(&self, file: &FileListing) -> bool {
        let extension_matches = file
            .ext()
            .map(|e| e.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false);
        extension_matches && file.bitrate() >= self.min_bitrate
    }
}

/// Default tier ladder: 320 kbit/s mp3, then any flac, then any mp3.
pub fn default_tiers() -> Vec<QualityTier> {
    vec![
        QualityTier::new("mp3", 320),
        QualityTier::new("flac", 0),
        QualityTier::new("mp3", 0),
    ]
}

/// A file listing scored against a track's match string within a tier.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    /// The peer offering the file.
    pub username: String,
    /// The advertised file.
    pub file: FileListing,
    /// Similarity of the filename to the match string, 0-100.
    pub score: u8,
}

/// Score every listing that passes the tier filter.
///
/// Offers with no files are discarded up front. Output order follows
/// input order; ranking is `select_best`'s job.
pub fn score_offers(offers: &[Offer], match_string: &str, tier: &QualityTier) -> Vec<Candidate> {
    let target = match_string.to_lowercase();
    let mut candidates = Vec::new();

    for offer in offers.iter().filter(|o| !o.files.is_empty()) {
        for file in &offer.files {
            if !tier.accepts(file) {
                continue;
            }
            let score = similarity(&file.filename.to_lowercase(), &target);
            candidates.push(Candidate {
                username: offer.username.clone(),
                file: file.clone(),
                score,
            });
        }
    }

    candidates
}

/// Pick the best-of-tier candidate: maximum score, first seen wins ties.
pub fn select_best(candidates: Vec<Candidate>) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for candidate in candidates {
        match &best {
            Some(current) if candidate.score <= current.score => {}
            _ => best = Some(candidate),
        }
    }
    best
}
