/// UPI payment-initiation link construction
use uuid::Uuid;

/// Build a `upi://pay` deep link.
///
/// `amount` is in paise; the `am` parameter carries rupees with two decimal
/// places. The same string doubles as the scannable-code payload.
pub fn build_link(
    merchant_vpa: &str,
    merchant_name: &str,
    amount: i64,
    note: &str,
    reference: &str,
) -> String {
    format!(
        "upi://pay?pa={}&pn={}&am={}&tn={}&tr={}&cu=INR",
        urlencoding::encode(merchant_vpa),
        urlencoding::encode(merchant_name),
        format_amount(amount),
        urlencoding::encode(note),
        urlencoding::encode(reference),
    )
}

/// Paise to a rupee string, e.g. 499900 -> "4999.00"
pub fn format_amount(paise: i64) -> String {
    format!("{}.{:02}", paise / 100, paise % 100)
}

/// Generate a collision-resistant external transaction reference
pub fn generate_reference() -> String {
    format!("UPS{}", Uuid::new_v4().simple()).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(499900), "4999.00");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(100), "1.00");
        assert_eq!(format_amount(0), "0.00");
    }

    #[test]
    fn test_link_contains_all_parameters() {
        let link = build_link("shop@upi", "Upskill Academy", 150000, "Rust Course", "UPSABC123");
        assert!(link.starts_with("upi://pay?"));
        assert!(link.contains("pa=shop%40upi"));
        assert!(link.contains("pn=Upskill%20Academy"));
        assert!(link.contains("am=1500.00"));
        assert!(link.contains("tn=Rust%20Course"));
        assert!(link.contains("tr=UPSABC123"));
        assert!(link.contains("cu=INR"));
    }

    #[test]
    fn test_references_are_unique() {
        use std::collections::HashSet;
        let refs: HashSet<String> = (0..100).map(|_| generate_reference()).collect();
        assert_eq!(refs.len(), 100);
        assert!(refs.iter().all(|r| r.starts_with("UPS")));
    }
}
