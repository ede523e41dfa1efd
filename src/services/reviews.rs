//! Review service backed by the document store
//!
//! Comments have their own lifecycle, independent of the catalog store; the
//! two stores share no transaction. The whole service runs in degraded mode
//! when the store is disabled by configuration or unreachable at startup:
//! every operation then answers `StoreUnavailable` instead of failing the
//! whole server.

use mongodb::{
    bson::{doc, oid::ObjectId, Bson, DateTime as BsonDateTime, Document},
    options::{ClientOptions, FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Client, Collection,
};
use tokio_stream::StreamExt;
use validator::Validate;

use crate::{
    api::stats::{BookRating, MonthlyReviewActivity, ReviewStats},
    config::MongoConfig,
    error::{AppError, AppResult},
    models::comment::{parse_comment_id, Comment, CommentDoc, CommentInput, CommentUpdate},
};

/// Default minimum review count for the top-rated report
pub const DEFAULT_MIN_REVIEWS: i64 = 2;
/// Default row cap for the top-rated report
pub const DEFAULT_TOP_RATED: i64 = 5;
/// Months of history in the comment activity report
const ACTIVITY_MONTHS: i64 = 12;

const COLLECTION: &str = "comments";

/// Round a mean to one decimal for display
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Integer field from an aggregation row; the store answers Int32 or Int64
/// depending on the accumulator, so accept both.
fn bson_i64(doc: &Document, key: &str) -> i64 {
    match doc.get(key) {
        Some(Bson::Int32(v)) => *v as i64,
        Some(Bson::Int64(v)) => *v,
        Some(Bson::Double(v)) => *v as i64,
        _ => 0,
    }
}

/// Float field from an aggregation row
fn bson_f64(doc: &Document, key: &str) -> f64 {
    match doc.get(key) {
        Some(Bson::Double(v)) => *v,
        Some(Bson::Int32(v)) => *v as f64,
        Some(Bson::Int64(v)) => *v as f64,
        _ => 0.0,
    }
}

fn rating_group_stage(id_expr: Bson) -> Document {
    doc! {
        "$group": {
            "_id": id_expr,
            "mean": { "$avg": "$rating" },
            "count": { "$sum": 1 },
            "min": { "$min": "$rating" },
            "max": { "$max": "$rating" },
        }
    }
}

fn rating_per_book_pipeline() -> Vec<Document> {
    vec![
        rating_group_stage(Bson::String("$book_id".to_string())),
        doc! { "$sort": { "mean": -1 } },
    ]
}

fn book_rating_pipeline(book_id: i32) -> Vec<Document> {
    vec![
        doc! { "$match": { "book_id": book_id } },
        rating_group_stage(Bson::String("$book_id".to_string())),
    ]
}

fn global_stats_pipeline() -> Vec<Document> {
    vec![rating_group_stage(Bson::Null)]
}

fn top_rated_pipeline(min_reviews: i64, limit: i64) -> Vec<Document> {
    vec![
        rating_group_stage(Bson::String("$book_id".to_string())),
        doc! { "$match": { "count": { "$gte": min_reviews } } },
        doc! { "$sort": { "mean": -1 } },
        doc! { "$limit": limit },
    ]
}

fn monthly_activity_pipeline() -> Vec<Document> {
    vec![
        doc! {
            "$group": {
                "_id": { "$dateToString": { "format": "%Y-%m", "date": "$created_at" } },
                "count": { "$sum": 1 },
                "mean": { "$avg": "$rating" },
            }
        },
        doc! { "$sort": { "_id": -1 } },
        doc! { "$limit": ACTIVITY_MONTHS },
    ]
}

async fn collect_comments(mut cursor: mongodb::Cursor<CommentDoc>) -> AppResult<Vec<Comment>> {
    let mut comments = Vec::new();
    while let Some(doc) = cursor.next().await {
        comments.push(doc?.into());
    }
    Ok(comments)
}

#[derive(Clone)]
pub struct ReviewsService {
    collection: Option<Collection<CommentDoc>>,
}

impl ReviewsService {
    /// Connect to the review store, pinging it so a dead store fails here
    /// rather than on the first request
    pub async fn connect(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let options = ClientOptions::parse(&config.url).await?;
        let client = Client::with_options(options)?;
        let database = client.database(&config.database);
        database.run_command(doc! { "ping": 1 }, None).await?;

        Ok(Self {
            collection: Some(database.collection::<CommentDoc>(COLLECTION)),
        })
    }

    /// Degraded mode: review features disabled
    pub fn disabled() -> Self {
        Self { collection: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.collection.is_some()
    }

    fn collection(&self) -> AppResult<&Collection<CommentDoc>> {
        self.collection
            .as_ref()
            .ok_or_else(|| AppError::StoreUnavailable("review features are disabled".to_string()))
    }

    // ---- CRUD ----

    /// Add a comment with a server-side creation timestamp
    pub async fn add(&self, input: CommentInput) -> AppResult<Comment> {
        input.validate()?;
        let collection = self.collection()?;

        let doc = CommentDoc {
            id: ObjectId::new(),
            book_id: input.book_id,
            user_id: input.user_id,
            text: input.text,
            rating: input.rating,
            created_at: BsonDateTime::now(),
            updated_at: None,
        };

        collection.insert_one(&doc, None).await?;
        Ok(doc.into())
    }

    /// Update a comment's text/rating, stamping the modification timestamp
    pub async fn update(&self, id: &str, update: CommentUpdate) -> AppResult<Comment> {
        update.validate()?;
        let collection = self.collection()?;
        let oid = parse_comment_id(id)?;

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = collection
            .find_one_and_update(
                doc! { "_id": oid },
                doc! { "$set": {
                    "text": update.text,
                    "rating": update.rating,
                    "updated_at": BsonDateTime::now(),
                } },
                options,
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment with id {} not found", id)))?;

        Ok(updated.into())
    }

    /// Delete one comment by its opaque id
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let collection = self.collection()?;
        let oid = parse_comment_id(id)?;

        let result = collection.delete_one(doc! { "_id": oid }, None).await?;
        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!("Comment with id {} not found", id)));
        }
        Ok(())
    }

    /// Delete every comment on a book. This is an explicit admin operation,
    /// not a cascade: removing a book leaves its comments in place.
    pub async fn delete_for_book(&self, book_id: i32) -> AppResult<u64> {
        let collection = self.collection()?;
        let result = collection.delete_many(doc! { "book_id": book_id }, None).await?;
        Ok(result.deleted_count)
    }

    /// Get one comment by its opaque id
    pub async fn get(&self, id: &str) -> AppResult<Comment> {
        let collection = self.collection()?;
        let oid = parse_comment_id(id)?;

        collection
            .find_one(doc! { "_id": oid }, None)
            .await?
            .map(Comment::from)
            .ok_or_else(|| AppError::NotFound(format!("Comment with id {} not found", id)))
    }

    /// Comments on a book, newest first
    pub async fn for_book(&self, book_id: i32) -> AppResult<Vec<Comment>> {
        let collection = self.collection()?;
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        let cursor = collection.find(doc! { "book_id": book_id }, options).await?;
        collect_comments(cursor).await
    }

    /// Comments by a user, newest first
    pub async fn for_user(&self, user_id: i32) -> AppResult<Vec<Comment>> {
        let collection = self.collection()?;
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        let cursor = collection.find(doc! { "user_id": user_id }, options).await?;
        collect_comments(cursor).await
    }

    /// Latest comments with limit/offset pagination
    pub async fn recent(&self, limit: i64, offset: u64) -> AppResult<Vec<Comment>> {
        let collection = self.collection()?;
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .limit(limit)
            .skip(offset)
            .build();
        let cursor = collection.find(None, options).await?;
        collect_comments(cursor).await
    }

    /// Keyword search over comment text, case-insensitive, newest first
    pub async fn search(&self, keyword: &str) -> AppResult<Vec<Comment>> {
        let collection = self.collection()?;
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        let cursor = collection
            .find(doc! { "text": { "$regex": keyword, "$options": "i" } }, options)
            .await?;
        collect_comments(cursor).await
    }

    // ---- Aggregations ----

    async fn aggregate(&self, pipeline: Vec<Document>) -> AppResult<Vec<Document>> {
        let collection = self.collection()?;
        let mut cursor = collection.aggregate(pipeline, None).await?;
        let mut rows = Vec::new();
        while let Some(doc) = cursor.next().await {
            rows.push(doc?);
        }
        Ok(rows)
    }

    fn book_rating_from(row: &Document) -> BookRating {
        BookRating {
            book_id: bson_i64(row, "_id") as i32,
            mean_rating: round1(bson_f64(row, "mean")),
            review_count: bson_i64(row, "count"),
            min_rating: bson_i64(row, "min") as i32,
            max_rating: bson_i64(row, "max") as i32,
        }
    }

    /// Mean/min/max rating and review count per book, best mean first
    pub async fn rating_per_book(&self) -> AppResult<Vec<BookRating>> {
        let rows = self.aggregate(rating_per_book_pipeline()).await?;
        Ok(rows.iter().map(Self::book_rating_from).collect())
    }

    /// Rating summary for a single book; None when it has no comments
    pub async fn rating_for_book(&self, book_id: i32) -> AppResult<Option<BookRating>> {
        let rows = self.aggregate(book_rating_pipeline(book_id)).await?;
        Ok(rows.first().map(Self::book_rating_from))
    }

    /// Global comment statistics in a single aggregate row
    pub async fn global_stats(&self) -> AppResult<ReviewStats> {
        let rows = self.aggregate(global_stats_pipeline()).await?;
        Ok(rows
            .first()
            .map(|row| ReviewStats {
                total_comments: bson_i64(row, "count"),
                mean_rating: round1(bson_f64(row, "mean")),
                min_rating: bson_i64(row, "min") as i32,
                max_rating: bson_i64(row, "max") as i32,
            })
            .unwrap_or(ReviewStats {
                total_comments: 0,
                mean_rating: 0.0,
                min_rating: 0,
                max_rating: 0,
            }))
    }

    /// Best-rated books among those with enough reviews
    pub async fn top_rated(&self, min_reviews: i64, limit: i64) -> AppResult<Vec<BookRating>> {
        let rows = self.aggregate(top_rated_pipeline(min_reviews, limit)).await?;
        Ok(rows.iter().map(Self::book_rating_from).collect())
    }

    /// Comment counts and mean rating per calendar month, newest first,
    /// capped to 12 rows
    pub async fn monthly_activity(&self) -> AppResult<Vec<MonthlyReviewActivity>> {
        let rows = self.aggregate(monthly_activity_pipeline()).await?;
        Ok(rows
            .iter()
            .map(|row| MonthlyReviewActivity {
                month: row.get_str("_id").unwrap_or_default().to_string(),
                comment_count: bson_i64(row, "count"),
                mean_rating: round1(bson_f64(row, "mean")),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn means_round_to_one_decimal() {
        assert_eq!(round1(4.0), 4.0);
        assert_eq!(round1(3.666_666), 3.7);
        assert_eq!(round1(3.649), 3.6);
    }

    #[test]
    fn aggregation_rows_accept_mixed_numeric_types() {
        let row = doc! { "count": 2_i32, "total": 40_i64, "mean": 4.0 };
        assert_eq!(bson_i64(&row, "count"), 2);
        assert_eq!(bson_i64(&row, "total"), 40);
        assert_eq!(bson_f64(&row, "mean"), 4.0);
        assert_eq!(bson_f64(&row, "count"), 2.0);
        assert_eq!(bson_i64(&row, "missing"), 0);
    }

    #[test]
    fn ratings_of_three_and_five_average_to_four() {
        // the shape promised by the reporting contract
        let mean = round1((3.0 + 5.0) / 2.0);
        assert_eq!(mean, 4.0);
    }

    #[test]
    fn top_rated_pipeline_filters_then_sorts_then_limits() {
        let pipeline = top_rated_pipeline(2, 5);
        assert_eq!(pipeline.len(), 4);
        assert!(pipeline[0].contains_key("$group"));
        assert!(pipeline[1].contains_key("$match"));
        assert!(pipeline[2].contains_key("$sort"));
        assert_eq!(pipeline[3].get_i64("$limit").unwrap(), 5);
    }

    #[test]
    fn monthly_pipeline_is_capped_to_twelve_rows() {
        let pipeline = monthly_activity_pipeline();
        assert_eq!(pipeline.last().unwrap().get_i64("$limit").unwrap(), 12);
    }

    #[test]
    fn disabled_service_reports_store_unavailable() {
        let service = ReviewsService::disabled();
        assert!(!service.is_enabled());
        assert!(matches!(
            service.collection(),
            Err(AppError::StoreUnavailable(_))
        ));
    }
}
