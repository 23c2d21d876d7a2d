/// Tests for the payment flow contract
///
/// Note: These are unit tests that verify the logic is correct.
/// Integration tests would require a running PostgreSQL instance.

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    const VERIFICATION_WINDOW_SECS: i64 = 300;

    fn window_elapsed(created_at: chrono::DateTime<Utc>, now: chrono::DateTime<Utc>) -> bool {
        now - created_at > Duration::seconds(VERIFICATION_WINDOW_SECS)
    }

    #[test]
    fn test_window_is_five_minutes() {
        assert_eq!(VERIFICATION_WINDOW_SECS, 5 * 60);
    }

    #[test]
    fn test_window_boundary_behavior() {
        let created = Utc::now();
        let window = Duration::seconds(VERIFICATION_WINDOW_SECS);

        // boundary-minus-one-unit: still valid
        assert!(!window_elapsed(created, created + window - Duration::seconds(1)));
        // exactly at the boundary: still valid
        assert!(!window_elapsed(created, created + window));
        // boundary-plus-one-unit: expired
        assert!(window_elapsed(created, created + window + Duration::seconds(1)));
    }

    #[test]
    fn test_upi_link_grammar() {
        // The payment session carries a upi://pay deep link; every mandatory
        // parameter must be present exactly once
        let link = "upi://pay?pa=shop%40upi&pn=Upskill&am=1500.00&tn=Course&tr=UPSREF1&cu=INR";

        assert!(link.starts_with("upi://pay?"));
        let query = &link["upi://pay?".len()..];
        let params: Vec<(&str, &str)> = query
            .split('&')
            .filter_map(|kv| kv.split_once('='))
            .collect();

        for key in ["pa", "pn", "am", "tn", "tr", "cu"] {
            assert_eq!(
                params.iter().filter(|(k, _)| *k == key).count(),
                1,
                "parameter {} must appear exactly once",
                key
            );
        }

        let amount = params.iter().find(|(k, _)| *k == "am").unwrap().1;
        assert!(amount.parse::<f64>().is_ok());
        assert!(amount.contains('.'));
    }

    #[test]
    fn test_amount_paise_formatting() {
        let format_amount = |paise: i64| format!("{}.{:02}", paise / 100, paise % 100);

        assert_eq!(format_amount(150000), "1500.00");
        assert_eq!(format_amount(99), "0.99");
        assert_eq!(format_amount(101), "1.01");
    }

    #[test]
    fn test_payment_references_are_collision_resistant() {
        use std::collections::HashSet;
        use uuid::Uuid;

        let refs: HashSet<String> = (0..1000)
            .map(|_| format!("UPS{}", Uuid::new_v4().simple()).to_uppercase())
            .collect();
        assert_eq!(refs.len(), 1000);
    }
}
