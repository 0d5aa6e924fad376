//! Record types produced by extraction and written by the sink

/// One user's rating of one movie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingRecord {
    /// Opaque user identifier (`uid` query value)
    pub user_id: String,

    /// Movie identifier (`movieId` query value)
    pub item_id: String,

    /// Grade given by the user
    pub rating: i32,
}

impl RatingRecord {
    /// Creates a new rating row
    pub fn new(user_id: impl Into<String>, item_id: impl Into<String>, rating: i32) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            rating,
        }
    }

    /// Serializes as `userId,itemId,rating`
    pub fn to_csv_line(&self) -> String {
        format!("{},{},{}", self.user_id, self.item_id, self.rating)
    }
}

/// Summary of one movie detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    /// Movie identifier
    pub movie_id: String,

    /// Title with whitespace runs removed
    pub title: String,

    /// Genre, or `"N/A"`
    pub genre: String,

    /// Production country, or `"N/A"`
    pub country: String,

    /// Running time in minutes, or -1 when unknown
    pub running_time: i32,
}

impl MetadataRecord {
    /// Serializes as `movieId,"title","genre","country",runningTime`
    ///
    /// Text fields are quoted verbatim; embedded quotes are not escaped.
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},\"{}\",\"{}\",\"{}\",{}",
            self.movie_id, self.title, self.genre, self.country, self.running_time
        )
    }
}
