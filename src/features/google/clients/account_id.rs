//! Google service account ids must be 6-30 characters of lowercase letters,
//! digits and hyphens, start with a letter and not end with a hyphen.

const MIN_LEN: usize = 6;
const MAX_LEN: usize = 30;
const MAX_USER_PART_LEN: usize = 20;

fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars().flat_map(char::to_lowercase) {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '-'
        };
        if c == '-' && (out.is_empty() || out.ends_with('-')) {
            continue;
        }
        out.push(c);
    }
    out.trim_end_matches('-').to_string()
}

fn truncate(part: &str, max: usize) -> String {
    part.chars()
        .take(max)
        .collect::<String>()
        .trim_end_matches('-')
        .to_string()
}

/// Deterministic, provider-valid account id for a (client, user) pair
pub fn valid_service_account_id_for_client(client_id: Option<&str>, user_id: &str) -> String {
    let mut user_part = truncate(&sanitize(user_id), MAX_USER_PART_LEN);
    if user_part.is_empty() {
        user_part = "user".to_string();
    }

    let mut client_part = sanitize(client_id.unwrap_or_default());
    if client_part.is_empty() {
        client_part = "user".to_string();
    }
    if !client_part.starts_with(|c: char| c.is_ascii_lowercase()) {
        client_part.insert(0, 'c');
    }

    let room = MAX_LEN - user_part.len() - 1;
    let client_part = truncate(&client_part, room);

    let mut id = format!("{}-{}", client_part, user_part);
    while id.len() < MIN_LEN {
        id.push('0');
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::SERVICE_ACCOUNT_ID_REGEX;

    fn assert_valid(id: &str) {
        assert!(
            SERVICE_ACCOUNT_ID_REGEX.is_match(id) && (MIN_LEN..=MAX_LEN).contains(&id.len()),
            "invalid service account id: {id}"
        );
    }

    #[test]
    fn test_simple_pair() {
        let id = valid_service_account_id_for_client(Some("myclient"), "42");
        assert_eq!(id, "myclient-42");
        assert_valid(&id);
    }

    #[test]
    fn test_long_ids_are_truncated() {
        let id = valid_service_account_id_for_client(
            Some("a-really-long-oauth-client-identifier-string"),
            "0190b1d2-7c1e-7a3b-9f00-5a4c3e2d1b0a",
        );
        assert!(id.len() <= MAX_LEN);
        assert_valid(&id);
    }

    #[test]
    fn test_invalid_characters_are_replaced() {
        let id = valid_service_account_id_for_client(Some("My_Client.App"), "User@Example.com");
        assert_eq!(id, "my-client-app-user-example-com");
        assert_valid(&id);
    }

    #[test]
    fn test_client_starting_with_digit_gets_letter_prefix() {
        let id = valid_service_account_id_for_client(Some("123abc"), "7");
        assert!(id.starts_with('c'));
        assert_valid(&id);
    }

    #[test]
    fn test_short_ids_are_padded() {
        let id = valid_service_account_id_for_client(Some("a"), "1");
        assert_eq!(id.len(), MIN_LEN);
        assert_valid(&id);
    }

    #[test]
    fn test_missing_client_still_valid() {
        assert_valid(&valid_service_account_id_for_client(None, "5"));
        assert_valid(&valid_service_account_id_for_client(Some("---"), "!!!"));
    }

    #[test]
    fn test_deterministic_and_distinct_per_client() {
        let a = valid_service_account_id_for_client(Some("client-a"), "9");
        let b = valid_service_account_id_for_client(Some("client-b"), "9");
        assert_eq!(a, valid_service_account_id_for_client(Some("client-a"), "9"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_identities_always_valid() {
        use fake::faker::internet::en::{SafeEmail, Username};
        use fake::{Fake, Faker};

        for _ in 0..200 {
            let client: String = Username().fake();
            let user: String = SafeEmail().fake();
            assert_valid(&valid_service_account_id_for_client(Some(&client), &user));

            let sub: uuid::Uuid = Faker.fake();
            assert_valid(&valid_service_account_id_for_client(Some(&client), &sub.to_string()));
        }
    }
}
