use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Google service account id (the part before `@`)
    /// Lowercase letters, digits and hyphens, starting with a letter and not ending with a hyphen
    /// - Valid: "myclient-42", "user-5", "a-1000"
    /// - Invalid: "1client", "client-", "Client", "client_id"
    pub static ref SERVICE_ACCOUNT_ID_REGEX: Regex =
        Regex::new(r"^[a-z]([-a-z0-9]*[a-z0-9])$").unwrap();

    /// Access group names
    /// Letters, digits, underscores and hyphens
    /// - Valid: "test_group_2", "new-group", "ALL"
    /// - Invalid: "group name", "group/1", ""
    pub static ref GROUP_NAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}
