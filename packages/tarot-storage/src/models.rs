use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct MemoryRecord {
	pub memory_id: Uuid,
	pub user_id: String,
	pub consultation_text: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct MemoryMatch {
	pub memory_id: Uuid,
	pub consultation_text: String,
	pub similarity: f64,
}
