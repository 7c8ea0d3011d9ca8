use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use trellis_core::api::USER_HEADER;
use trellis_core::ids::{UserId, WorkspaceId};
use trellis_core::model::Member;
use trellis_store::Store;

use crate::error::ApiError;

/// Caller identity. Session verification happens upstream; this service only
/// checks workspace membership for the forwarded id.
#[derive(Debug, Clone)]
pub struct Principal(pub UserId);

impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A missing principal is indistinguishable from a failed membership
        // check on the wire.
        parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| Principal(UserId::from_str(v)))
            .ok_or_else(ApiError::unauthorized)
    }
}

/// Resolves the caller's membership in `workspace_id`, or rejects with 401.
pub fn ensure_member(
    store: &dyn Store,
    workspace_id: &WorkspaceId,
    principal: &Principal,
) -> Result<Member, ApiError> {
    let member = store.find_member(workspace_id, &principal.0)?;
    member.ok_or_else(ApiError::unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use trellis_core::ids::MemberId;
    use trellis_core::now_ms;
    use trellis_store::InMemoryStore;

    fn parts_for(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[tokio::test]
    async fn missing_user_header_is_rejected() {
        let mut parts = parts_for(Request::builder().uri("/v1/tasks").body(()).unwrap());

        let denied = Principal::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(denied.message(), "Unauthorized");
    }

    #[tokio::test]
    async fn empty_user_header_is_rejected() {
        let mut parts = parts_for(
            Request::builder()
                .uri("/v1/tasks")
                .header(USER_HEADER, "")
                .body(())
                .unwrap(),
        );

        let denied = Principal::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn forwarded_header_becomes_the_principal() {
        let mut parts = parts_for(
            Request::builder()
                .uri("/v1/tasks")
                .header(USER_HEADER, "u1")
                .body(())
                .unwrap(),
        );

        let principal = Principal::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(principal.0.as_str(), "u1");
    }

    #[test]
    fn membership_grants_access_only_in_its_workspace() {
        let store = InMemoryStore::new();
        let now = now_ms();
        store
            .create_member(Member {
                id: MemberId::from_str("m1"),
                workspace_id: WorkspaceId::from_str("w1"),
                user_id: UserId::from_str("u1"),
                name: "Dana".to_string(),
                email: "dana@example.com".to_string(),
                created_at: now,
                updated_at: now,
            })
            .unwrap();

        let principal = Principal(UserId::from_str("u1"));
        assert!(ensure_member(&store, &WorkspaceId::from_str("w1"), &principal).is_ok());

        let denied = ensure_member(&store, &WorkspaceId::from_str("w2"), &principal).unwrap_err();
        assert_eq!(denied.message(), "Unauthorized");
    }
}
