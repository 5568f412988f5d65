use uuid::Uuid;

use crate::{Result, db::Db};

/// Returns the ids of users who share their library with `user_id` and have timeline
/// sharing enabled. Partners the user shares *to* are not part of the search scope.
pub async fn sharing_partner_ids(db: &Db, user_id: Uuid) -> Result<Vec<Uuid>> {
	let ids: Vec<Uuid> = sqlx::query_scalar(
		"\
SELECT shared_by_id
FROM partners
WHERE shared_with_id = $1
  AND in_timeline",
	)
	.bind(user_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(ids)
}
