//! Enrollment fulfillment: matching a settled order's line items against the course provisioning catalog and
//! rendering the notification that carries the enrollment details.
//!
//! Matching is exact, case-sensitive string equality on item codes. No normalization (case, whitespace) is performed;
//! an item code that differs only in case from its catalog entry will not match. This mirrors how the catalog is
//! maintained upstream and is a known limitation.
use std::collections::HashSet;

use crate::db_types::{EnrollmentNotice, OrderLineItem, ProvisioningEntry, SalesOrder};

pub const ENROLLMENT_SUBJECT: &str = "Course Enrollment";

const NO_LINK_FALLBACK: &str = "No link available";
const NO_KEY_FALLBACK: &str = "No Key available";

/// Returns the catalog entries whose item code appears among the order's line items, in catalog order.
pub fn match_enrollments<'a>(
    items: &[OrderLineItem],
    catalog: &'a [ProvisioningEntry],
) -> Vec<&'a ProvisioningEntry> {
    let codes = items.iter().map(|item| item.item_code.as_str()).collect::<HashSet<_>>();
    catalog.iter().filter(|entry| codes.contains(entry.item_code.as_str())).collect()
}

/// Resolves the notification recipient for an order: the contact email wins over the customer email, first
/// non-empty value taken.
pub fn resolve_recipient(order: &SalesOrder) -> Option<&str> {
    [order.contact_email.as_deref(), order.customer_email.as_deref()]
        .into_iter()
        .flatten()
        .find(|email| !email.is_empty())
}

/// Renders the enrollment notice for the matched catalog entries. Entries without a link or key render a fallback
/// line rather than an empty string.
pub fn render_notice(order: &SalesOrder, recipient: &str, matches: &[&ProvisioningEntry]) -> EnrollmentNotice {
    let mut body =
        format!("Dear {},\n\nPlease find the details for accessing your course below:\n", order.customer_name);
    for entry in matches {
        let link = entry.course_link.as_deref().filter(|s| !s.is_empty()).unwrap_or(NO_LINK_FALLBACK);
        let key = entry.enrollment_key.as_deref().filter(|s| !s.is_empty()).unwrap_or(NO_KEY_FALLBACK);
        body.push_str(&format!("\n- Link: {link}, "));
        body.push_str(&format!("\n- Course enrollment Key: {key} "));
    }
    body.push_str("\n\nThank you for your purchase!");
    EnrollmentNotice { recipient: recipient.to_string(), subject: ENROLLMENT_SUBJECT.to_string(), body }
}

#[cfg(test)]
mod test {
    use super::*;

    fn order(contact: Option<&str>, customer: Option<&str>, codes: &[&str]) -> SalesOrder {
        SalesOrder {
            name: "SO-0001".to_string(),
            customer_name: "Ada Obi".to_string(),
            contact_email: contact.map(String::from),
            customer_email: customer.map(String::from),
            items: codes.iter().map(|code| OrderLineItem { item_code: code.to_string() }).collect(),
        }
    }

    fn entry(code: &str, key: Option<&str>, link: Option<&str>) -> ProvisioningEntry {
        ProvisioningEntry {
            item_code: code.to_string(),
            enrollment_key: key.map(String::from),
            course_link: link.map(String::from),
        }
    }

    #[test]
    fn matches_only_items_present_in_the_order() {
        let catalog =
            vec![entry("COURSE-A", Some("K1"), Some("L1")), entry("COURSE-C", Some("K3"), Some("L3"))];
        let matched = match_enrollments(&order(None, None, &["COURSE-A", "COURSE-B"]).items, &catalog);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].item_code, "COURSE-A");
    }

    #[test]
    fn matching_is_case_sensitive() {
        let catalog = vec![entry("course-a", Some("K1"), Some("L1"))];
        let matched = match_enrollments(&order(None, None, &["COURSE-A"]).items, &catalog);
        assert!(matched.is_empty());
    }

    #[test]
    fn no_catalog_overlap_matches_nothing() {
        let catalog = vec![entry("COURSE-C", None, None)];
        assert!(match_enrollments(&order(None, None, &["COURSE-A"]).items, &catalog).is_empty());
        assert!(match_enrollments(&[], &catalog).is_empty());
    }

    #[test]
    fn contact_email_wins_over_customer_email() {
        let o = order(Some("contact@example.com"), Some("customer@example.com"), &[]);
        assert_eq!(resolve_recipient(&o), Some("contact@example.com"));
    }

    #[test]
    fn empty_contact_email_falls_back_to_customer_email() {
        let o = order(Some(""), Some("customer@example.com"), &[]);
        assert_eq!(resolve_recipient(&o), Some("customer@example.com"));
        assert_eq!(resolve_recipient(&order(None, None, &[])), None);
        assert_eq!(resolve_recipient(&order(Some(""), Some(""), &[])), None);
    }

    #[test]
    fn notice_lists_link_and_key_for_each_match() {
        let catalog = vec![entry("COURSE-A", Some("K1"), Some("https://lms.example.com/a"))];
        let o = order(Some("ada@example.com"), None, &["COURSE-A"]);
        let matched = match_enrollments(&o.items, &catalog);
        let notice = render_notice(&o, "ada@example.com", &matched);
        assert_eq!(notice.subject, ENROLLMENT_SUBJECT);
        assert_eq!(notice.recipient, "ada@example.com");
        assert!(notice.body.starts_with("Dear Ada Obi,"));
        assert!(notice.body.contains("Link: https://lms.example.com/a"));
        assert!(notice.body.contains("Course enrollment Key: K1"));
        assert!(notice.body.ends_with("Thank you for your purchase!"));
    }

    #[test]
    fn missing_link_and_key_render_fallback_text() {
        let catalog = vec![entry("COURSE-A", None, Some(""))];
        let o = order(Some("ada@example.com"), None, &["COURSE-A"]);
        let matched = match_enrollments(&o.items, &catalog);
        let notice = render_notice(&o, "ada@example.com", &matched);
        assert!(notice.body.contains("Link: No link available"));
        assert!(notice.body.contains("Course enrollment Key: No Key available"));
        assert!(!notice.body.contains("Link: ,"));
    }
}
