//! Utility functions for the wastedesk-login crate.

/// Mask a username or email for logs.
pub fn mask_login(login: &str) -> String {
    match login.split_once('@') {
        Some((user, domain)) => {
            let first: String = user.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        None if login.chars().count() <= 2 => "***".to_string(),
        None => {
            let first: String = login.chars().take(2).collect();
            format!("{first}***")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_login("dispatch@example.com"), "d***@example.com");
    }

    #[test]
    fn test_mask_username() {
        assert_eq!(mask_login("operator7"), "op***");
        assert_eq!(mask_login("ab"), "***");
    }
}
