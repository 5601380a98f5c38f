//! Authorization policy.
//!
//! Role-gated handlers ask one question: may this user moderate content?
//! The answer is computed here, once, at the route boundary — handlers never
//! probe user attributes themselves.

use crate::models::User;

/// Whether the user may create, edit, and delete managed content
/// (news, players, schedule entries, tickets) and remove forum posts.
pub fn can_moderate(user: &User) -> bool {
    user.is_admin
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(is_admin: bool) -> User {
        User {
            id: Uuid::now_v7(),
            name: "tester".to_string(),
            is_admin,
            created: Utc::now(),
        }
    }

    #[test]
    fn only_admins_moderate() {
        assert!(can_moderate(&user(true)));
        assert!(!can_moderate(&user(false)));
    }
}
