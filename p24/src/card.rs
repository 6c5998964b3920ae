//! Card number validation

use crate::{Error, Result};

/// Card number length accepted by the API
pub const CARD_NUMBER_LEN: usize = 16;

/// Check that `card` is a sixteen digit card number
pub fn check_card_number(card: &str) -> Result<()> {
    if card.chars().count() != CARD_NUMBER_LEN {
        return Err(invalid("should be sixteen length"));
    }
    if !card.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("should contains digits only"));
    }
    Ok(())
}

fn invalid(reason: &str) -> Error {
    Error::InvalidOptions(format!("invalid card number: {}", reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_card_number() {
        let cases = [
            ("11111not1a1card1", Some("should contains digits only")),
            ("111111111111111", Some("should be sixteen length")),
            ("11111111111111111", Some("should be sixteen length")),
            ("not a card", Some("should be sixteen length")),
            ("1111111111111111", None),
        ];

        for (card, expected) in cases {
            match (check_card_number(card), expected) {
                (Ok(()), None) => {}
                (Err(Error::InvalidOptions(msg)), Some(reason)) => {
                    assert_eq!(msg, format!("invalid card number: {}", reason))
                }
                (result, expected) => panic!("{}: got {:?}, want {:?}", card, result, expected),
            }
        }
    }
}
