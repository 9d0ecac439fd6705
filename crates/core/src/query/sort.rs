use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::QueryError;

/// Columns a history table may be sorted by.
///
/// Only these are accepted; anything else is rejected at query-build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    // Session record columns
    Agent,
    Uploaded,
    Downloaded,
    ActualUploaded,
    ActualDownloaded,
    Seedtime,
    Active,
    Seeder,
    Immune,
    Hitrun,
    Prewarn,
    CreatedAt,
    UpdatedAt,
    CompletedAt,
    // Torrent columns
    Name,
    Seeders,
    Leechers,
    TimesCompleted,
    Size,
    Status,
    // Derived columns
    Seeding,
    Leeching,
    Leechtime,
    Ratio,
    ActualRatio,
    SelfUploaded,
}

impl SortField {
    pub const ALL: [SortField; 26] = [
        SortField::Agent,
        SortField::Uploaded,
        SortField::Downloaded,
        SortField::ActualUploaded,
        SortField::ActualDownloaded,
        SortField::Seedtime,
        SortField::Active,
        SortField::Seeder,
        SortField::Immune,
        SortField::Hitrun,
        SortField::Prewarn,
        SortField::CreatedAt,
        SortField::UpdatedAt,
        SortField::CompletedAt,
        SortField::Name,
        SortField::Seeders,
        SortField::Leechers,
        SortField::TimesCompleted,
        SortField::Size,
        SortField::Status,
        SortField::Seeding,
        SortField::Leeching,
        SortField::Leechtime,
        SortField::Ratio,
        SortField::ActualRatio,
        SortField::SelfUploaded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Agent => "agent",
            SortField::Uploaded => "uploaded",
            SortField::Downloaded => "downloaded",
            SortField::ActualUploaded => "actual_uploaded",
            SortField::ActualDownloaded => "actual_downloaded",
            SortField::Seedtime => "seedtime",
            SortField::Active => "active",
            SortField::Seeder => "seeder",
            SortField::Immune => "immune",
            SortField::Hitrun => "hitrun",
            SortField::Prewarn => "prewarn",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::CompletedAt => "completed_at",
            SortField::Name => "name",
            SortField::Seeders => "seeders",
            SortField::Leechers => "leechers",
            SortField::TimesCompleted => "times_completed",
            SortField::Size => "size",
            SortField::Status => "status",
            SortField::Seeding => "seeding",
            SortField::Leeching => "leeching",
            SortField::Leechtime => "leechtime",
            SortField::Ratio => "ratio",
            SortField::ActualRatio => "actual_ratio",
            SortField::SelfUploaded => "self_uploaded",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| QueryError::InvalidSortField(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(QueryError::InvalidSortDirection(other.to_string())),
        }
    }
}

/// Current sort of a history table. Defaults to newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Column header click: the same field flips direction, a new field
    /// starts ascending.
    pub fn sort_by(&mut self, field: SortField) {
        self.direction = if self.field == field {
            self.direction.toggled()
        } else {
            SortDirection::Asc
        };
        self.field = field;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_every_field() {
        for field in SortField::ALL {
            assert_eq!(field.as_str().parse::<SortField>(), Ok(field));
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert_eq!(
            "torrents.id; DROP TABLE history".parse::<SortField>(),
            Err(QueryError::InvalidSortField(
                "torrents.id; DROP TABLE history".to_string()
            ))
        );
        assert!("CreatedAt".parse::<SortField>().is_err());
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("asc".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert_eq!("desc".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert!(matches!(
            "down".parse::<SortDirection>(),
            Err(QueryError::InvalidSortDirection(_))
        ));
    }

    #[test]
    fn test_same_field_toggles() {
        let mut sort = SortState::default();
        assert_eq!(sort, SortState::new(SortField::CreatedAt, SortDirection::Desc));

        sort.sort_by(SortField::CreatedAt);
        assert_eq!(sort, SortState::new(SortField::CreatedAt, SortDirection::Asc));

        sort.sort_by(SortField::CreatedAt);
        assert_eq!(sort, SortState::new(SortField::CreatedAt, SortDirection::Desc));
    }

    #[test]
    fn test_new_field_resets_to_ascending() {
        let mut sort = SortState::default();
        sort.sort_by(SortField::Ratio);
        assert_eq!(sort, SortState::new(SortField::Ratio, SortDirection::Asc));

        sort.sort_by(SortField::Ratio);
        sort.sort_by(SortField::Name);
        assert_eq!(sort, SortState::new(SortField::Name, SortDirection::Asc));
    }
}
