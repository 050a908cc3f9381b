/// Alternative query names for one target hostname
///
/// Authoritative servers compute the NSEC for the name actually queried,
/// and many only hand over the next-owner pointer for a name that does
/// not exist. Each transformation nudges the name just past the target in
/// canonical order; the walker tries them in this order and stops at the
/// first that yields a pertinent NSEC.
pub fn transformations(hostname: &str) -> Vec<String> {
    let (first, rest) = match hostname.split_once('.') {
        Some((first, rest)) => (first, Some(rest)),
        None => (hostname, None),
    };

    let rejoin = |leftmost: String| match rest {
        Some(rest) => format!("{}.{}", leftmost, rest),
        None => leftmost,
    };

    let mut doubled = first.to_string();
    if let Some(last) = first.chars().last() {
        doubled.push(last);
    }

    vec![
        // The name as-is: some servers volunteer the next owner anyway
        hostname.to_string(),
        // A synthetic leftmost label, sorting directly under the target
        format!("0.{}", hostname),
        // Hyphen appended to the leftmost label
        rejoin(format!("{}-", first)),
        // Last character of the leftmost label doubled
        rejoin(doubled),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transformations_order() {
        assert_eq!(
            transformations("example.com"),
            vec![
                "example.com",
                "0.example.com",
                "example-.com",
                "examplee.com",
            ]
        );
    }

    #[test]
    fn test_subdomain_target() {
        assert_eq!(
            transformations("mail.example.com"),
            vec![
                "mail.example.com",
                "0.mail.example.com",
                "mail-.example.com",
                "maill.example.com",
            ]
        );
    }

    #[test]
    fn test_single_label() {
        assert_eq!(transformations("dev"), vec!["dev", "0.dev", "dev-", "devv"]);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(transformations("a.b.c"), transformations("a.b.c"));
    }
}
