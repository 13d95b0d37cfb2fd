//! Append-only consultation memory, one log per user.

use uuid::Uuid;

use crate::{
	Error, Result,
	db::Db,
	models::{MemoryMatch, MemoryRecord},
};

pub async fn insert_memory(
	db: &Db,
	user_id: &str,
	consultation_text: &str,
	embedding: &[f32],
) -> Result<Uuid> {
	let vec_text = vector_to_pg(embedding)?;
	let memory_id = Uuid::new_v4();

	db.timed("insert_memory", async {
		sqlx::query(
			"\
INSERT INTO tarot_memories (memory_id, user_id, consultation_text, embedding)
VALUES ($1, $2, $3, $4::text::vector)",
		)
		.bind(memory_id)
		.bind(user_id)
		.bind(consultation_text)
		.bind(vec_text.as_str())
		.execute(&db.pool)
		.await?;

		Ok::<_, Error>(())
	})
	.await?;

	Ok(memory_id)
}

/// Runs `match_tarot_memories` and keeps the function's ranking.
pub async fn match_memories(
	db: &Db,
	user_id: &str,
	query_embedding: &[f32],
	match_threshold: f32,
	match_count: u32,
) -> Result<Vec<MemoryMatch>> {
	let vec_text = vector_to_pg(query_embedding)?;
	let match_count = i32::try_from(match_count)
		.map_err(|_| Error::InvalidArgument("match_count is too large.".to_string()))?;

	db.timed("match_memories", async {
		let rows = sqlx::query_as::<_, MemoryMatch>(
			"\
SELECT memory_id, consultation_text, similarity
FROM match_tarot_memories($1::text::vector, $2, $3, $4)",
		)
		.bind(vec_text.as_str())
		.bind(user_id)
		.bind(f64::from(match_threshold))
		.bind(match_count)
		.fetch_all(&db.pool)
		.await?;

		Ok::<_, Error>(rows)
	})
	.await
}

pub async fn list_recent(db: &Db, user_id: &str, limit: i64) -> Result<Vec<MemoryRecord>> {
	db.timed("list_recent", async {
		let rows = sqlx::query_as::<_, MemoryRecord>(
			"\
SELECT memory_id, user_id, consultation_text, created_at
FROM tarot_memories
WHERE user_id = $1
ORDER BY created_at DESC
LIMIT $2",
		)
		.bind(user_id)
		.bind(limit)
		.fetch_all(&db.pool)
		.await?;

		Ok::<_, Error>(rows)
	})
	.await
}

pub fn vector_to_pg(vec: &[f32]) -> Result<String> {
	if vec.is_empty() {
		return Err(Error::InvalidArgument("Embedding vector is empty.".to_string()));
	}
	if vec.iter().any(|value| !value.is_finite()) {
		return Err(Error::InvalidArgument("Embedding vector has a non-finite value.".to_string()));
	}

	let mut out = String::with_capacity(vec.len() * 8);

	out.push('[');

	for (i, value) in vec.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	Ok(out)
}
