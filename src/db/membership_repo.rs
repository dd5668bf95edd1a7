// src/db/membership_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{db_utils::map_unique, error::AppError},
    models::membership::{Membership, MembershipRequest, MembershipRequestStatus, MembershipStatus},
};

#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  MEMBERSHIPS
    // =========================================================================

    pub async fn find_membership<'e, E>(
        &self,
        executor: E,
        facility_id: i64,
        user_id: i64,
    ) -> Result<Option<Membership>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let membership = sqlx::query_as::<_, Membership>(
            "SELECT * FROM memberships WHERE facility_id = $1 AND user_id = $2",
        )
        .bind(facility_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
        Ok(membership)
    }

    pub async fn find_membership_by_id<'e, E>(
        &self,
        executor: E,
        membership_id: i64,
    ) -> Result<Option<Membership>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let membership = sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE id = $1")
            .bind(membership_id)
            .fetch_optional(executor)
            .await?;
        Ok(membership)
    }

    /// Creates the membership or re-activates the existing one. `started_at` is kept.
    pub async fn upsert_active<'e, E>(
        &self,
        executor: E,
        facility_id: i64,
        user_id: i64,
    ) -> Result<Membership, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (facility_id, user_id, status)
            VALUES ($1, $2, 'ACTIVE')
            ON CONFLICT (facility_id, user_id)
            DO UPDATE SET status = 'ACTIVE'
            RETURNING *
            "#,
        )
        .bind(facility_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;
        Ok(membership)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        membership_id: i64,
        status: MembershipStatus,
    ) -> Result<Membership, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let membership = sqlx::query_as::<_, Membership>(
            "UPDATE memberships SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(membership_id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(membership)
    }

    // =========================================================================
    //  REQUESTS
    // =========================================================================

    pub async fn find_request<'e, E>(
        &self,
        executor: E,
        facility_id: i64,
        user_id: i64,
    ) -> Result<Option<MembershipRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, MembershipRequest>(
            "SELECT * FROM membership_requests WHERE facility_id = $1 AND user_id = $2",
        )
        .bind(facility_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
        Ok(request)
    }

    // Serializes concurrent decisions on the same request
    pub async fn lock_request<'e, E>(
        &self,
        executor: E,
        request_id: i64,
    ) -> Result<Option<MembershipRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, MembershipRequest>(
            "SELECT * FROM membership_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(executor)
        .await?;
        Ok(request)
    }

    pub async fn create_request<'e, E>(
        &self,
        executor: E,
        facility_id: i64,
        user_id: i64,
    ) -> Result<MembershipRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, MembershipRequest>(
            r#"
            INSERT INTO membership_requests (facility_id, user_id, status)
            VALUES ($1, $2, 'PENDING')
            RETURNING *
            "#,
        )
        .bind(facility_id)
        .bind(user_id)
        .fetch_one(executor)
        .await
        // Lost a race against a parallel request from the same user
        .map_err(|e| map_unique(e, AppError::DuplicateRequest))
    }

    pub async fn decide_request<'e, E>(
        &self,
        executor: E,
        request_id: i64,
        status: MembershipRequestStatus,
        decided_by: i64,
    ) -> Result<MembershipRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, MembershipRequest>(
            r#"
            UPDATE membership_requests
            SET status = $2, decided_at = NOW(), decided_by = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(status)
        .bind(decided_by)
        .fetch_one(executor)
        .await?;
        Ok(request)
    }

    /// Pending requests across every facility the owner holds, oldest first.
    pub async fn list_pending_for_owner(&self, owner_user_id: i64) -> Result<Vec<MembershipRequest>, AppError> {
        let requests = sqlx::query_as::<_, MembershipRequest>(
            r#"
            SELECT mr.*
            FROM membership_requests mr
            JOIN facilities f ON f.id = mr.facility_id
            WHERE f.owner_user_id = $1
              AND mr.status = 'PENDING'
            ORDER BY mr.created_at ASC, mr.id ASC
            "#,
        )
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }
}
