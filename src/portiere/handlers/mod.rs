pub mod auth;
pub mod health;
pub mod pages;

// common functions for the handlers
use regex::Regex;

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

#[cfg(test)]
mod tests {
    use super::valid_email;

    #[test]
    fn test_valid_email() {
        assert!(valid_email("alice@x.com"));
        assert!(valid_email("bob+admin@example.org"));

        assert!(!valid_email(""));
        assert!(!valid_email("alice"));
        assert!(!valid_email("alice@"));
        assert!(!valid_email("alice@host"));
        assert!(!valid_email("alice @x.com"));
    }
}
