//! Unit tests for handler commands
//!
//! Handler execution needs a database and is covered in tests/.

#[cfg(test)]
mod tests {
    use crate::handlers::{
        is_supported_currency, CreateAccountCommand, TransferCommand, SUPPORTED_CURRENCIES,
    };

    #[test]
    fn test_create_account_command() {
        let cmd = CreateAccountCommand::new("alice".to_string(), "USD".to_string());

        assert_eq!(cmd.owner, "alice");
        assert_eq!(cmd.currency, "USD");
    }

    #[test]
    fn test_transfer_command() {
        let cmd = TransferCommand::new(1, 2, 10, "EUR".to_string());

        assert_eq!(cmd.from_account_id, 1);
        assert_eq!(cmd.to_account_id, 2);
        assert_eq!(cmd.amount, 10);
        assert_eq!(cmd.currency, "EUR");
    }

    #[test]
    fn test_transfer_command_deserialize() {
        let cmd: TransferCommand = serde_json::from_str(
            r#"{"from_account_id": 5, "to_account_id": 6, "amount": 250, "currency": "CAD"}"#,
        )
        .unwrap();

        assert_eq!(cmd.amount, 250);
        assert_eq!(cmd.currency, "CAD");
    }

    #[test]
    fn test_supported_currencies() {
        for currency in SUPPORTED_CURRENCIES {
            assert!(is_supported_currency(currency));
        }
        assert!(!is_supported_currency("usd"));
        assert!(!is_supported_currency(""));
    }
}
