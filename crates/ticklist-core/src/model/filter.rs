use super::item::{Item, ParseEnumError, Status, normalize};
use std::{fmt, str::FromStr};

/// View-level predicate selecting items by status.
///
/// Session state only; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    #[default]
    All,
    Pending,
    Completed,
}

impl Filter {
    const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Parse a filter name, treating anything unrecognized as [`Filter::All`].
    #[must_use]
    pub fn parse_lossy(raw: &str) -> Self {
        raw.parse::<Self>().unwrap_or_else(|err: ParseEnumError| {
            tracing::debug!(got = %err.got, "unrecognized filter, falling back to all");
            Self::All
        })
    }

    /// Whether `item` belongs in a view under this filter.
    #[must_use]
    pub const fn matches(self, item: &Item) -> bool {
        match self {
            Self::All => true,
            Self::Pending => matches!(item.status, Status::Pending),
            Self::Completed => matches!(item.status, Status::Completed),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseEnumError {
                expected: "filter",
                got: s.to_string(),
            }),
        }
    }
}

impl From<Status> for Filter {
    fn from(status: Status) -> Self {
        match status {
            Status::Pending => Self::Pending,
            Status::Completed => Self::Completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Filter;
    use crate::model::{Item, ItemId, Status};

    fn item(status: Status) -> Item {
        Item {
            id: ItemId::new(1),
            text: "x".into(),
            status,
        }
    }

    #[test]
    fn parse_known_names() {
        assert_eq!("all".parse::<Filter>().ok(), Some(Filter::All));
        assert_eq!("PENDING".parse::<Filter>().ok(), Some(Filter::Pending));
        assert_eq!(" completed".parse::<Filter>().ok(), Some(Filter::Completed));
    }

    #[test]
    fn unknown_names_fall_back_to_all() {
        assert!("archived".parse::<Filter>().is_err());
        assert_eq!(Filter::parse_lossy("archived"), Filter::All);
        assert_eq!(Filter::parse_lossy(""), Filter::All);
        assert_eq!(Filter::parse_lossy("completed"), Filter::Completed);
    }

    #[test]
    fn default_is_all() {
        assert_eq!(Filter::default(), Filter::All);
    }

    #[test]
    fn matches_by_status() {
        let pending = item(Status::Pending);
        let done = item(Status::Completed);

        assert!(Filter::All.matches(&pending));
        assert!(Filter::All.matches(&done));
        assert!(Filter::Pending.matches(&pending));
        assert!(!Filter::Pending.matches(&done));
        assert!(Filter::Completed.matches(&done));
        assert!(!Filter::Completed.matches(&pending));
    }
}
