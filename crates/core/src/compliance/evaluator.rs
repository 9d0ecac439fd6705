use super::{ComplianceStatus, HitRunPolicy, TriState, UnsatisfiedMode};
use crate::history::{SessionRecord, TorrentSummary};

/// Applies the hit-and-run policy to session records.
#[derive(Debug, Clone)]
pub struct ComplianceEvaluator {
    policy: HitRunPolicy,
}

impl ComplianceEvaluator {
    pub fn new(policy: HitRunPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &HitRunPolicy {
        &self.policy
    }

    /// Mode to filter by for a requested toggle. `None` means the axis is not
    /// applied, either because it is neutral or because hit-and-run
    /// evaluation is disabled.
    pub fn unsatisfied_mode(&self, requested: TriState) -> Option<UnsatisfiedMode> {
        if !self.policy.enabled {
            return None;
        }
        match requested {
            TriState::Include => Some(UnsatisfiedMode::Include),
            TriState::Exclude => Some(UnsatisfiedMode::Exclude),
            TriState::Neutral => None,
        }
    }

    /// Whether a record passes the unsatisfied axis in the given mode.
    ///
    /// The two modes use strict comparisons on both sides, so a record sitting
    /// exactly on a threshold can fail both.
    pub fn matches(
        &self,
        mode: UnsatisfiedMode,
        record: &SessionRecord,
        torrent: &TorrentSummary,
    ) -> bool {
        let seedtime = record.seedtime;
        let threshold = self.policy.seedtime.as_secs();
        let downloaded = record.actual_downloaded as f64;
        let allowance = self.policy.download_allowance(torrent.size);

        match mode {
            UnsatisfiedMode::Exclude => {
                seedtime > threshold || record.immune || downloaded < allowance
            }
            UnsatisfiedMode::Include => {
                seedtime < threshold && !record.immune && downloaded > allowance
            }
        }
    }

    /// Whether the record currently violates the policy; `None` when
    /// evaluation is disabled.
    pub fn is_unsatisfied(&self, record: &SessionRecord, torrent: &TorrentSummary) -> Option<bool> {
        self.policy
            .enabled
            .then(|| self.matches(UnsatisfiedMode::Include, record, torrent))
    }

    /// Summarise a record's standing.
    pub fn classify(&self, record: &SessionRecord, torrent: &TorrentSummary) -> ComplianceStatus {
        if !self.policy.enabled {
            return ComplianceStatus::NotTracked;
        }
        if record.immune {
            ComplianceStatus::Immune
        } else if record.hitrun {
            ComplianceStatus::HitRun
        } else if record.prewarn {
            ComplianceStatus::Prewarned
        } else if self.matches(UnsatisfiedMode::Include, record, torrent) {
            ComplianceStatus::Unsatisfied
        } else {
            ComplianceStatus::Satisfied
        }
    }
}
