//! PostgreSQL implementation of the repositories

use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::{MovieRepository, Store, UserRepository, VoteRepository};
use crate::models::{
    Movie, MovieFilter, MovieSort, NewMovie, NewUser, User, Vote, VoteChange, VoteType,
};

/// Movie columns with like/hate counts aggregated from the votes table.
/// Callers append the WHERE clause, `GROUP BY m.id, u.username` and ordering.
const MOVIE_SELECT: &str = r#"
    SELECT m.id, m.title, m.description, m.created_at, m.owner_id,
           u.username AS owner_username,
           COUNT(v.id) FILTER (WHERE v.type = 'LIKE') AS likes,
           COUNT(v.id) FILTER (WHERE v.type = 'HATE') AS hates
    FROM movies m
    JOIN users u ON u.id = m.owner_id
    LEFT JOIN votes v ON v.movie_id = m.id
"#;

/// PostgreSQL backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store over an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}

fn movie_from_row(row: &PgRow) -> Movie {
    Movie {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        owner_id: row.get("owner_id"),
        owner_username: row.get("owner_username"),
        created_at: row.get("created_at"),
        likes: row.get("likes"),
        hates: row.get("hates"),
    }
}

fn order_clause(sort: MovieSort) -> &'static str {
    match sort {
        MovieSort::Date => "m.created_at DESC, m.id DESC",
        MovieSort::Likes => "likes DESC, m.created_at DESC, m.id DESC",
        MovieSort::Hates => "hates DESC, m.created_at DESC, m.id DESC",
    }
}

impl UserRepository for PgStore {
    async fn create_user(&self, new_user: &NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.username);

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(user_from_row(&row))
    }

    async fn find_user_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(row.as_ref().map(user_from_row))
    }
}

impl MovieRepository for PgStore {
    async fn create_movie(&self, new_movie: &NewMovie) -> DatabaseResult<Movie> {
        let row = sqlx::query(
            r#"
            WITH inserted AS (
                INSERT INTO movies (title, description, created_at, owner_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id, title, description, created_at, owner_id
            )
            SELECT i.id, i.title, i.description, i.created_at, i.owner_id,
                   u.username AS owner_username,
                   0::BIGINT AS likes,
                   0::BIGINT AS hates
            FROM inserted i
            JOIN users u ON u.id = i.owner_id
            "#,
        )
        .bind(&new_movie.title)
        .bind(&new_movie.description)
        .bind(new_movie.created_at)
        .bind(new_movie.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(movie_from_row(&row))
    }

    async fn find_movie_by_id(&self, id: Uuid) -> DatabaseResult<Option<Movie>> {
        let query = format!("{MOVIE_SELECT} WHERE m.id = $1 GROUP BY m.id, u.username");

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(row.as_ref().map(movie_from_row))
    }

    async fn list_movies(&self, filter: &MovieFilter) -> DatabaseResult<(Vec<Movie>, i64)> {
        // The ORDER BY fragment comes from a closed enum, never from user input
        let query = format!(
            "{MOVIE_SELECT} WHERE ($1::TEXT IS NULL OR u.username = $1) \
             GROUP BY m.id, u.username ORDER BY {} LIMIT $2 OFFSET $3",
            order_clause(filter.sort)
        );

        let rows = sqlx::query(&query)
            .bind(filter.owner_username.as_deref())
            .bind(filter.page.limit as i64)
            .bind(filter.page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM movies m
            JOIN users u ON u.id = m.owner_id
            WHERE ($1::TEXT IS NULL OR u.username = $1)
            "#,
        )
        .bind(filter.owner_username.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok((rows.iter().map(movie_from_row).collect(), total))
    }
}

impl VoteRepository for PgStore {
    async fn apply_vote(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
        requested: VoteType,
    ) -> DatabaseResult<VoteChange> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        let existing: Option<VoteType> = sqlx::query_scalar(
            r#"
            SELECT type
            FROM votes
            WHERE user_id = $1 AND movie_id = $2
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::from_query)?;

        let change = VoteChange::plan(existing, requested);

        match change {
            // A concurrent first vote on the same pair lands on the unique
            // constraint; the later writer's type wins.
            VoteChange::Cast(vote_type) => {
                sqlx::query(
                    r#"
                    INSERT INTO votes (movie_id, user_id, type)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (movie_id, user_id)
                    DO UPDATE SET type = EXCLUDED.type, updated_at = NOW()
                    "#,
                )
                .bind(movie_id)
                .bind(user_id)
                .bind(vote_type)
                .execute(&mut *tx)
                .await
                .map_err(DatabaseError::from_query)?;
            }
            VoteChange::Flip { to, .. } => {
                sqlx::query(
                    r#"
                    UPDATE votes
                    SET type = $3, updated_at = NOW()
                    WHERE movie_id = $1 AND user_id = $2
                    "#,
                )
                .bind(movie_id)
                .bind(user_id)
                .bind(to)
                .execute(&mut *tx)
                .await
                .map_err(DatabaseError::from_query)?;
            }
            VoteChange::Retract(_) => {
                sqlx::query("DELETE FROM votes WHERE movie_id = $1 AND user_id = $2")
                    .bind(movie_id)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(DatabaseError::from_query)?;
            }
        }

        tx.commit().await.map_err(DatabaseError::Query)?;

        Ok(change)
    }

    async fn find_votes_by_user(
        &self,
        user_id: Uuid,
        movie_ids: &[Uuid],
    ) -> DatabaseResult<Vec<Vote>> {
        if movie_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, movie_id, user_id, type
            FROM votes
            WHERE user_id = $1 AND movie_id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(movie_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        let votes = rows
            .into_iter()
            .map(|row| Vote {
                id: row.get("id"),
                movie_id: row.get("movie_id"),
                user_id: row.get("user_id"),
                vote_type: row.get("type"),
            })
            .collect();

        Ok(votes)
    }
}

impl Store for PgStore {
    async fn health_check(&self) -> bool {
        common::database::health_check(&self.pool)
            .await
            .unwrap_or(false)
    }
}
