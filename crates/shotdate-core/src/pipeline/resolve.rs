//! Picks the single most trustworthy timestamp out of a file's candidates.

use chrono::{Local, NaiveDate, NaiveDateTime, Utc};

use crate::config::ResolverConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::FileInfo;

/// Bounds a candidate must fall within to be considered valid.
///
/// A candidate is valid when it is strictly after `floor` and strictly before
/// *either* `local_now` or `utc_now`. Accepting against either clock absorbs
/// an unknown offset between the machine's clock and a candidate that was
/// recorded as if it were UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub floor: NaiveDateTime,
    pub local_now: NaiveDateTime,
    pub utc_now: NaiveDateTime,
}

impl TimeWindow {
    /// Window ending at the current local and UTC wall clocks.
    pub fn now(floor: NaiveDateTime) -> Self {
        Self {
            floor,
            local_now: Local::now().naive_local(),
            utc_now: Utc::now().naive_utc(),
        }
    }

    pub fn contains(&self, t: NaiveDateTime) -> bool {
        t > self.floor && (t < self.local_now || t < self.utc_now)
    }
}

/// Validates and ranks timestamp candidates. Performs no I/O.
#[derive(Debug, Clone)]
pub struct Resolver {
    floor: NaiveDateTime,
}

impl Resolver {
    /// Create a resolver with the configured floor year.
    ///
    /// An invalid year falls back to 1990; `Config::validate` rejects those
    /// before they get here.
    pub fn new(config: &ResolverConfig) -> Self {
        let floor = NaiveDate::from_ymd_opt(config.floor_year, 1, 1)
            .or_else(|| NaiveDate::from_ymd_opt(1990, 1, 1))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or(NaiveDateTime::MIN);
        Self { floor }
    }

    /// Lower bound of the window; candidates at or before it are invalid.
    pub fn floor(&self) -> NaiveDateTime {
        self.floor
    }

    /// Choose the earliest valid timestamp, validated against the clocks now.
    pub fn choose_best_datetime(&self, info: &FileInfo) -> PipelineResult<NaiveDateTime> {
        self.choose_within(info, &TimeWindow::now(self.floor))
    }

    /// Choose the earliest candidate inside `window`.
    ///
    /// Out-of-window candidates are dropped without error. Fails with
    /// `InsufficientMetadata` when none remain.
    pub fn choose_within(
        &self,
        info: &FileInfo,
        window: &TimeWindow,
    ) -> PipelineResult<NaiveDateTime> {
        info.candidates
            .iter()
            .filter(|c| {
                let valid = window.contains(c.value);
                if !valid {
                    tracing::debug!(
                        "Dropping {} candidate {} for {:?}: outside valid window",
                        c.source,
                        c.value,
                        info.path
                    );
                }
                valid
            })
            .map(|c| c.value)
            .min()
            .ok_or_else(|| PipelineError::InsufficientMetadata {
                path: info.path.clone(),
            })
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(&ResolverConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CandidateSource, ImageFormat};
    use chrono::Duration;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn window(local_now: NaiveDateTime, utc_now: NaiveDateTime) -> TimeWindow {
        TimeWindow {
            floor: dt(1990, 1, 1, 0, 0, 0),
            local_now,
            utc_now,
        }
    }

    fn info(times: &[(CandidateSource, NaiveDateTime)]) -> FileInfo {
        let mut info = FileInfo::new("/shots/a.png", ImageFormat::Png);
        for (source, t) in times {
            info.push(source.clone(), *t);
        }
        info
    }

    #[test]
    fn test_earliest_valid_candidate_wins() {
        let t1 = dt(2019, 8, 15, 7, 34, 4);
        let t2 = dt(2019, 8, 16, 0, 0, 0);
        let t3 = dt(2021, 1, 1, 12, 0, 0);
        let info = info(&[
            (CandidateSource::FilesystemModified, t3),
            (CandidateSource::Custom("ctime".into()), t2),
            (CandidateSource::FilenamePattern, t1),
        ]);
        let now = dt(2024, 1, 1, 0, 0, 0);

        let best = Resolver::default()
            .choose_within(&info, &window(now, now))
            .unwrap();
        assert_eq!(best, t1);
    }

    #[test]
    fn test_pre_floor_only_candidate_is_insufficient() {
        let info = info(&[(CandidateSource::FilenamePattern, dt(1989, 12, 31, 23, 59, 59))]);
        let now = dt(2024, 1, 1, 0, 0, 0);

        let err = Resolver::default()
            .choose_within(&info, &window(now, now))
            .unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientMetadata { .. }));
    }

    #[test]
    fn test_floor_itself_is_excluded() {
        let info = info(&[(CandidateSource::FilenamePattern, dt(1990, 1, 1, 0, 0, 0))]);
        let now = dt(2024, 1, 1, 0, 0, 0);

        assert!(Resolver::default()
            .choose_within(&info, &window(now, now))
            .is_err());
    }

    #[test]
    fn test_invalid_early_candidate_does_not_shadow_valid_one() {
        let valid = dt(2020, 5, 5, 5, 5, 5);
        let info = info(&[
            (CandidateSource::FilenamePattern, dt(1970, 1, 1, 0, 0, 0)),
            (CandidateSource::FilesystemModified, valid),
        ]);
        let now = dt(2024, 1, 1, 0, 0, 0);

        let best = Resolver::default()
            .choose_within(&info, &window(now, now))
            .unwrap();
        assert_eq!(best, valid);
    }

    #[test]
    fn test_future_candidate_is_excluded() {
        let local_now = dt(2024, 1, 1, 12, 0, 0);
        let utc_now = dt(2024, 1, 1, 10, 0, 0);
        let future = dt(2024, 1, 1, 13, 0, 0);
        let mtime = dt(2023, 6, 1, 0, 0, 0);
        let info = info(&[
            (CandidateSource::FilenamePattern, future),
            (CandidateSource::FilesystemModified, mtime),
        ]);

        let best = Resolver::default()
            .choose_within(&info, &window(local_now, utc_now))
            .unwrap();
        assert_eq!(best, mtime);

        let only_future = self::info(&[(CandidateSource::FilenamePattern, future)]);
        assert!(Resolver::default()
            .choose_within(&only_future, &window(local_now, utc_now))
            .is_err());
    }

    #[test]
    fn test_candidate_between_clocks_is_accepted() {
        // Local clock ahead of UTC (e.g. UTC+2): candidate after UTC-now but before local-now.
        let local_now = dt(2024, 1, 1, 12, 0, 0);
        let utc_now = dt(2024, 1, 1, 10, 0, 0);
        let between = dt(2024, 1, 1, 11, 0, 0);
        let info = info(&[(CandidateSource::FilenamePattern, between)]);
        assert_eq!(
            Resolver::default()
                .choose_within(&info, &window(local_now, utc_now))
                .unwrap(),
            between
        );

        // Local clock behind UTC (e.g. UTC-5): the UTC bound accepts it.
        let info_west = self::info(&[(CandidateSource::FilenamePattern, between)]);
        assert_eq!(
            Resolver::default()
                .choose_within(&info_west, &window(utc_now, local_now))
                .unwrap(),
            between
        );
    }

    #[test]
    fn test_no_candidates_is_insufficient() {
        let info = FileInfo::new("/shots/a.png", ImageFormat::Png);
        let err = Resolver::default().choose_best_datetime(&info).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientMetadata { .. }));
    }

    #[test]
    fn test_choose_best_datetime_uses_real_clock() {
        let yesterday = Local::now().naive_local() - Duration::days(1);
        let tomorrow = Local::now().naive_local() + Duration::days(2);
        let info = info(&[
            (CandidateSource::FilesystemModified, yesterday),
            (CandidateSource::FilenamePattern, tomorrow),
        ]);
        assert_eq!(
            Resolver::default().choose_best_datetime(&info).unwrap(),
            yesterday
        );
    }

    #[test]
    fn test_configured_floor() {
        let resolver = Resolver::new(&ResolverConfig { floor_year: 2010 });
        assert_eq!(resolver.floor(), dt(2010, 1, 1, 0, 0, 0));
    }
}
