pub type BookId = i32;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Points must be in interval [0:2], got {0}")]
    PointsOutOfRange(i32),
}

/// Rating label assigned to a book. The mapping to points is total,
/// an unrated book is not representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewRating {
    Bad,
    Good,
    Excellent,
}

impl ReviewRating {
    pub fn points(&self) -> i32 {
        match self {
            ReviewRating::Bad => 0,
            ReviewRating::Good => 1,
            ReviewRating::Excellent => 2,
        }
    }
}

/// A persisted book record. Immutable once built, equality is structural.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: BookId,
    title: String,
    points: i32,
}

impl Book {
    pub fn new(id: BookId, title: String, points: i32) -> Result<Self, ValidationError> {
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if !(0..=2).contains(&points) {
            return Err(ValidationError::PointsOutOfRange(points));
        }
        Ok(Self { id, title, points })
    }

    /// Rows read back from the store are trusted and are not re-validated.
    pub(crate) fn from_trusted_row(id: BookId, title: String, points: i32) -> Self {
        Self { id, title, points }
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn points(&self) -> i32 {
        self.points
    }
}
