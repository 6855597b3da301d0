use serde_json::{json, Value};

use crate::users::repo::{Role, User};

/// `{"status":"success","result":N,"data":{"farmers"|"investors":[...]}}`
pub fn list_envelope(role: Role, users: &[User]) -> Value {
    json!({
        "status": "success",
        "result": users.len(),
        "data": { role.plural(): users },
    })
}

/// `{"status":true,"data":{"farmer"|"investor":{...}}}`, with an optional
/// message for mutation responses.
pub fn user_envelope(role: Role, user: &User, message: Option<&str>) -> Value {
    let mut body = json!({
        "status": true,
        "data": { role.as_str(): user },
    });
    if let Some(message) = message {
        body["message"] = json!(message);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn user(role: Role, email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: "$argon2id$fake".into(),
            role,
            full_name: None,
            phone: None,
            image: None,
            profile: serde_json::json!({}),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn list_envelope_counts_and_keys_by_role() {
        let farmers = vec![user(Role::Farmer, "a@x.com"), user(Role::Farmer, "b@x.com")];
        let body = list_envelope(Role::Farmer, &farmers);
        assert_eq!(body["status"], "success");
        assert_eq!(body["result"], 2);
        assert_eq!(body["data"]["farmers"].as_array().unwrap().len(), 2);
        assert!(body["data"]["farmers"][0].get("password_hash").is_none());
    }

    #[test]
    fn empty_list_is_success_with_zero_result() {
        let body = list_envelope(Role::Investor, &[]);
        assert_eq!(body["status"], "success");
        assert_eq!(body["result"], 0);
        assert_eq!(body["data"]["investors"], serde_json::json!([]));
    }

    #[test]
    fn user_envelope_keys_by_singular_role() {
        let inv = user(Role::Investor, "i@x.com");
        let body = user_envelope(Role::Investor, &inv, Some("User profile successfully updated"));
        assert_eq!(body["status"], serde_json::json!(true));
        assert_eq!(body["message"], "User profile successfully updated");
        assert_eq!(body["data"]["investor"]["email"], "i@x.com");
        assert!(body["data"]["investor"].get("password_hash").is_none());
    }

    #[test]
    fn user_envelope_without_message_omits_field() {
        let f = user(Role::Farmer, "f@x.com");
        let body = user_envelope(Role::Farmer, &f, None);
        assert!(body.get("message").is_none());
        assert_eq!(body["data"]["farmer"]["role"], "farmer");
    }
}
